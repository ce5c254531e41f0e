//! # Config Module
//!
//! Static settings for a monitor process. Values come from CLI flags, which fall back
//! to `CLAUDE_USAGE_*` environment variables and then to the defaults below. Limits
//! are fixed once the config is built.

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Args;
use crate::pricing::{DEFAULT_RATE_PER_MILLION, Pricing};
use crate::utils::{
    USAGE_PAGE_URL, default_primary_root, default_secondary_roots, expand_home, split_list,
};

pub const DEFAULT_REFRESH_SECS: u64 = 30;
pub const DEFAULT_SESSION_LIMIT: u64 = 1_000_000;
pub const DEFAULT_WEEKLY_LIMIT: u64 = 10_000_000;

/// Glob patterns applied under every Claude Desktop root. Overlapping patterns are
/// intentional: each pattern is walked separately.
pub const DEFAULT_SECONDARY_PATTERNS: &[&str] = &[
    "**/*.json",
    "**/*.jsonl",
    "**/logs/*.json",
    "**/usage*.json",
    "**/conversations/*.json",
];

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub refresh_interval: Duration,
    pub session_limit: u64,
    pub weekly_limit: u64,
    pub pricing: Pricing,
    pub primary_root: PathBuf,
    pub secondary_roots: Vec<PathBuf>,
    pub secondary_patterns: Vec<String>,
    pub dedupe_secondary: bool,
    pub usage_url: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            session_limit: DEFAULT_SESSION_LIMIT,
            weekly_limit: DEFAULT_WEEKLY_LIMIT,
            pricing: Pricing::new(DEFAULT_RATE_PER_MILLION),
            primary_root: default_primary_root(),
            secondary_roots: default_secondary_roots(),
            secondary_patterns: DEFAULT_SECONDARY_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            dedupe_secondary: false,
            usage_url: USAGE_PAGE_URL.to_string(),
        }
    }
}

impl MonitorConfig {
    /// Config rooted at explicit directories, default limits and patterns.
    pub fn with_roots(primary_root: impl Into<PathBuf>, secondary_roots: Vec<PathBuf>) -> Self {
        Self {
            primary_root: primary_root.into(),
            secondary_roots,
            ..Self::default()
        }
    }

    pub fn from_args(args: &Args) -> Self {
        let mut cfg = Self::default();
        cfg.refresh_interval = Duration::from_secs(args.interval_secs.max(1));
        cfg.session_limit = args.session_limit.max(1);
        cfg.weekly_limit = args.weekly_limit.max(1);
        cfg.pricing = Pricing::new(args.rate_per_million);
        if let Some(root) = args.primary_root.as_deref().map(str::trim) {
            if !root.is_empty() {
                cfg.primary_root = expand_home(root);
            }
        }
        let roots = split_list(&args.secondary_roots);
        if !roots.is_empty() {
            cfg.secondary_roots = roots.iter().map(|r| expand_home(r)).collect();
        }
        let patterns = split_list(&args.secondary_patterns);
        if !patterns.is_empty() {
            cfg.secondary_patterns = patterns;
        }
        cfg.dedupe_secondary = args.dedupe_secondary;
        if let Some(url) = args.usage_url.as_deref().filter(|u| !u.trim().is_empty()) {
            cfg.usage_url = url.trim().to_string();
        }
        cfg
    }
}
