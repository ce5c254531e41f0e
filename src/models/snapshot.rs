//! Published usage snapshot and per-source summaries.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::severity::SeverityTier;

/// The two applications whose logs are scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Claude Code CLI transcripts under `~/.claude/projects`
    Primary,
    /// Claude Desktop application data
    Secondary,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Primary => "Code",
            Self::Secondary => "Desktop",
        }
    }
}

/// Weekly totals for one source together with what was skipped while scanning it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSnapshot {
    pub source: SourceKind,
    pub total_tokens: u64,
    /// True iff at least one file in the window contributed tokens
    pub present: bool,
    pub files_counted: usize,
    pub files_skipped: usize,
    pub records_skipped: usize,
}

impl SourceSnapshot {
    pub fn empty(source: SourceKind) -> Self {
        Self {
            source,
            total_tokens: 0,
            present: false,
            files_counted: 0,
            files_skipped: 0,
            records_skipped: 0,
        }
    }
}

/// A complete, immutable view of usage at one refresh.
///
/// Snapshots are never mutated after construction; every refresh builds a new one
/// and publishes it in a single swap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSnapshot {
    pub session_tokens: u64,
    pub weekly_primary_tokens: u64,
    pub weekly_secondary_tokens: u64,
    pub weekly_total_tokens: u64,
    pub session_limit: u64,
    pub weekly_limit: u64,
    pub cost_estimate: f64,
    pub week_start: Option<DateTime<Local>>,
    pub last_refreshed: Option<DateTime<Local>>,
    pub sources: [SourceSnapshot; 2],
}

impl UsageSnapshot {
    /// The snapshot visible before the first successful refresh.
    pub fn empty(session_limit: u64, weekly_limit: u64) -> Self {
        Self {
            session_tokens: 0,
            weekly_primary_tokens: 0,
            weekly_secondary_tokens: 0,
            weekly_total_tokens: 0,
            session_limit: session_limit.max(1),
            weekly_limit: weekly_limit.max(1),
            cost_estimate: 0.0,
            week_start: None,
            last_refreshed: None,
            sources: [
                SourceSnapshot::empty(SourceKind::Primary),
                SourceSnapshot::empty(SourceKind::Secondary),
            ],
        }
    }

    pub fn session_fraction(&self) -> f64 {
        self.session_tokens as f64 / self.session_limit.max(1) as f64
    }

    pub fn weekly_fraction(&self) -> f64 {
        self.weekly_total_tokens as f64 / self.weekly_limit.max(1) as f64
    }

    /// The higher of the session and weekly fractions.
    pub fn usage_fraction(&self) -> f64 {
        self.session_fraction().max(self.weekly_fraction())
    }

    pub fn severity(&self) -> SeverityTier {
        SeverityTier::from_fraction(self.usage_fraction())
    }

    /// Sources that contributed tokens this week, primary first.
    pub fn sources_found(&self) -> Vec<SourceKind> {
        self.sources
            .iter()
            .filter(|s| s.present)
            .map(|s| s.source)
            .collect()
    }

    pub fn files_skipped(&self) -> usize {
        self.sources.iter().map(|s| s.files_skipped).sum()
    }

    pub fn records_skipped(&self) -> usize {
        self.sources.iter().map(|s| s.records_skipped).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with(session: u64, weekly: u64) -> UsageSnapshot {
        UsageSnapshot {
            session_tokens: session,
            weekly_primary_tokens: weekly,
            weekly_total_tokens: weekly,
            ..UsageSnapshot::empty(1_000, 10_000)
        }
    }

    #[test]
    fn test_empty_snapshot_is_normal_with_no_sources() {
        let snap = UsageSnapshot::empty(1_000_000, 10_000_000);
        assert_eq!(snap.usage_fraction(), 0.0);
        assert_eq!(snap.severity(), SeverityTier::Normal);
        assert!(snap.sources_found().is_empty());
        assert!(snap.last_refreshed.is_none());
    }

    #[test]
    fn test_zero_limits_are_clamped() {
        let snap = UsageSnapshot {
            session_tokens: 5,
            ..UsageSnapshot::empty(0, 0)
        };
        assert_eq!(snap.session_limit, 1);
        assert_eq!(snap.weekly_limit, 1);
        assert_eq!(snap.session_fraction(), 5.0);
    }

    #[test]
    fn test_usage_fraction_takes_the_larger_window() {
        assert_eq!(snapshot_with(500, 1_000).usage_fraction(), 0.5);
        assert_eq!(snapshot_with(100, 9_000).usage_fraction(), 0.9);
    }

    #[test]
    fn test_usage_fraction_is_monotonic_in_each_input() {
        let mut prev = 0.0;
        for session in (0..=2_000).step_by(100) {
            let f = snapshot_with(session, 3_000).usage_fraction();
            assert!(f >= prev);
            prev = f;
        }
        prev = 0.0;
        for weekly in (0..=20_000).step_by(500) {
            let f = snapshot_with(400, weekly).usage_fraction();
            assert!(f >= prev);
            prev = f;
        }
    }

    #[test]
    fn test_sources_found_lists_present_sources() {
        let mut snap = UsageSnapshot::empty(1, 1);
        snap.sources[1].present = true;
        assert_eq!(snap.sources_found(), vec![SourceKind::Secondary]);
    }
}
