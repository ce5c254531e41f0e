//! # Claude Usage Monitor
//!
//! Local token-usage tracking for Claude Code and Claude Desktop, computed entirely
//! from the logs both applications leave on disk.
//!
//! ## Overview
//!
//! Each refresh rescans the logs and produces a fresh [`models::UsageSnapshot`]:
//! - Session tokens: the most recently modified Claude Code transcript
//! - Weekly tokens: every log touched since local Monday 00:00, per source
//! - A blended cost estimate and a severity tier against configured limits
//!
//! Nothing is persisted and nothing leaves the machine.
//!
//! ## Features
//!
//! - `colors` (default): Enables terminal color output via owo-colors

/// Command-line argument parsing
pub mod cli;

/// Monitor settings resolved from CLI flags, environment, and defaults
pub mod config;

/// Text and JSON rendering of snapshots
pub mod display;

/// Error types for each failure granularity
pub mod error;

/// Data models for records, files, and snapshots
pub mod models;

/// Decoding of JSONL transcripts and Desktop JSON documents
pub mod parser;

/// Blended cost estimation
pub mod pricing;

/// Background refresh loop
pub mod scheduler;

/// Usage fraction to severity tier classification
pub mod severity;

/// Log file discovery for both sources
pub mod sources;

/// Snapshot building and publication
pub mod usage;

/// Utility functions for paths, formatting, and the browser hand-off
pub mod utils;

/// Modification-time windows and per-file aggregation
pub mod window;
