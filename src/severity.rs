//! # Severity Module
//!
//! Maps a usage fraction (0.0 = unused, 1.0 = at the limit) onto the discrete tier
//! that drives emphasis in the text output and the accent color of the bar.

use serde::Serialize;

pub const WARNING_THRESHOLD: f64 = 0.5;
pub const HIGH_THRESHOLD: f64 = 0.75;
pub const CRITICAL_THRESHOLD: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    Normal,
    Warning,
    High,
    Critical,
}

impl SeverityTier {
    /// Half-open thresholds: `[0, 0.5)` normal, `[0.5, 0.75)` warning,
    /// `[0.75, 0.9)` high, `[0.9, ∞)` critical. NaN is treated as normal.
    pub fn from_fraction(fraction: f64) -> Self {
        if fraction >= CRITICAL_THRESHOLD {
            Self::Critical
        } else if fraction >= HIGH_THRESHOLD {
            Self::High
        } else if fraction >= WARNING_THRESHOLD {
            Self::Warning
        } else {
            Self::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Accent color (orange, amber, orange-red, red).
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Self::Normal => (224, 122, 78),
            Self::Warning => (245, 158, 11),
            Self::High => (249, 115, 22),
            Self::Critical => (239, 68, 68),
        }
    }
}

impl std::fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
