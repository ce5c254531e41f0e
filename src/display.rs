use serde_json::json;
use std::env;

#[cfg(feature = "colors")]
use owo_colors::OwoColorize;

// Provide a no-op color shim when "colors" feature is disabled
#[cfg(not(feature = "colors"))]
pub mod color_shim {
    use std::fmt::{self, Display, Formatter};

    #[derive(Clone)]
    pub struct Plain(pub String);

    impl Display for Plain {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    pub trait ColorizeShim {
        fn as_str(&self) -> &str;

        fn bright_black(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn bold(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn dimmed(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn truecolor(&self, _r: u8, _g: u8, _b: u8) -> Plain {
            Plain(self.as_str().to_string())
        }
    }

    impl ColorizeShim for &str {
        fn as_str(&self) -> &str {
            self
        }
    }
    impl ColorizeShim for String {
        fn as_str(&self) -> &str {
            self.as_str()
        }
    }
    impl ColorizeShim for Plain {
        fn as_str(&self) -> &str {
            &self.0
        }
    }
}

#[cfg(not(feature = "colors"))]
use color_shim::ColorizeShim as OwoColorize;

use crate::models::{SourceKind, UsageSnapshot};
use crate::severity::SeverityTier;
use crate::utils::{format_clock, format_currency, format_path, format_percent, format_tokens};

const BAR_WIDTH: usize = 20;

/// Colors are on unless the feature is disabled or NO_COLOR is set.
pub fn colors_enabled() -> bool {
    cfg!(feature = "colors") && env::var_os("NO_COLOR").is_none()
}

fn paint(text: &str, tier: SeverityTier, colored: bool) -> String {
    if !colored {
        return text.to_string();
    }
    let (r, g, b) = tier.rgb();
    if tier >= SeverityTier::High {
        text.truecolor(r, g, b).bold().to_string()
    } else {
        text.truecolor(r, g, b).to_string()
    }
}

fn dim(text: &str, colored: bool) -> String {
    if colored {
        text.bright_black().to_string()
    } else {
        text.to_string()
    }
}

/// Fixed-width meter; fractions above 1.0 render as a full bar.
pub fn usage_bar(fraction: f64, width: usize) -> String {
    let clamped = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = ((clamped * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn bar_line(label: &str, tokens: u64, limit: u64, fraction: f64, colored: bool) -> String {
    let tier = SeverityTier::from_fraction(fraction);
    format!(
        "{:<8} {} {} / {} {}",
        label,
        paint(&usage_bar(fraction, BAR_WIDTH), tier, colored),
        format_tokens(tokens),
        format_tokens(limit),
        paint(&format_percent(fraction), tier, colored),
    )
}

/// Multi-line human summary of a snapshot.
pub fn render_text(snapshot: &UsageSnapshot, debug: bool, colored: bool) -> String {
    let tier = snapshot.severity();
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(
        "{} {}",
        paint(
            &format!("Claude: {}", format_percent(snapshot.usage_fraction())),
            tier,
            colored
        ),
        dim(&format!("[{tier}]"), colored),
    ));
    lines.push(bar_line(
        "Session",
        snapshot.session_tokens,
        snapshot.session_limit,
        snapshot.session_fraction(),
        colored,
    ));
    lines.push(bar_line(
        "Weekly",
        snapshot.weekly_total_tokens,
        snapshot.weekly_limit,
        snapshot.weekly_fraction(),
        colored,
    ));
    lines.push(dim(
        &format!(
            "         {} {} · {} {}",
            SourceKind::Primary.label(),
            format_tokens(snapshot.weekly_primary_tokens),
            SourceKind::Secondary.label(),
            format_tokens(snapshot.weekly_secondary_tokens),
        ),
        colored,
    ));

    let found = snapshot.sources_found();
    let sources = if found.is_empty() {
        "none".to_string()
    } else {
        found
            .iter()
            .map(|s| s.label())
            .collect::<Vec<_>>()
            .join(", ")
    };
    lines.push(format!("{:<8} {}", "Sources", sources));
    lines.push(format!(
        "{:<8} {} this week",
        "Cost",
        format_currency(snapshot.cost_estimate)
    ));
    lines.push(format!(
        "{:<8} {}",
        "Updated",
        format_clock(snapshot.last_refreshed.as_ref())
    ));

    if debug {
        if let Some(ws) = snapshot.week_start.as_ref() {
            lines.push(dim(
                &format!("week start: {}", ws.format("%Y-%m-%d %H:%M %:z")),
                colored,
            ));
        }
        for s in &snapshot.sources {
            lines.push(dim(
                &format!(
                    "{}: files={} skipped_files={} skipped_records={}",
                    s.source.label(),
                    s.files_counted,
                    s.files_skipped,
                    s.records_skipped
                ),
                colored,
            ));
        }
    }
    lines.join("\n")
}

pub fn build_json_output(snapshot: &UsageSnapshot) -> serde_json::Value {
    let fraction = snapshot.usage_fraction();
    json!({
        "session": {
            "tokens": snapshot.session_tokens,
            "limit": snapshot.session_limit,
            "percent": (snapshot.session_fraction() * 1000.0).round() / 10.0,
        },
        "weekly": {
            "tokens": snapshot.weekly_total_tokens,
            "code_tokens": snapshot.weekly_primary_tokens,
            "desktop_tokens": snapshot.weekly_secondary_tokens,
            "limit": snapshot.weekly_limit,
            "percent": (snapshot.weekly_fraction() * 1000.0).round() / 10.0,
            "week_start": snapshot.week_start.map(|d| d.to_rfc3339()),
        },
        "usage_percent": (fraction * 1000.0).round() / 10.0,
        "severity": snapshot.severity(),
        "cost_usd": (snapshot.cost_estimate * 100.0).round() / 100.0,
        "sources_found": snapshot
            .sources_found()
            .iter()
            .map(|s| s.label())
            .collect::<Vec<_>>(),
        "sources": snapshot.sources,
        "last_refreshed": snapshot.last_refreshed.map(|d| d.to_rfc3339()),
    })
}

pub fn print_text_output(snapshot: &UsageSnapshot, debug: bool) {
    println!("{}", render_text(snapshot, debug, colors_enabled()));
}

pub fn print_json_output(snapshot: &UsageSnapshot) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&build_json_output(snapshot))?);
    Ok(())
}

/// One-line description of where logs are read from, for `--debug`.
pub fn describe_roots(config: &crate::config::MonitorConfig) -> String {
    let secondary = config
        .secondary_roots
        .iter()
        .map(|p| format_path(p))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "code: {} | desktop: {}",
        format_path(&config.primary_root),
        if secondary.is_empty() {
            "none".to_string()
        } else {
            secondary
        }
    )
}
