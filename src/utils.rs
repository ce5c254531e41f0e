use chrono::{DateTime, Local};
use directories::BaseDirs;
use once_cell::sync::Lazy;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Where Claude shows account-level usage
pub const USAGE_PAGE_URL: &str = "https://claude.ai/settings/usage";

static BASE_DIRS: Lazy<Option<BaseDirs>> = Lazy::new(BaseDirs::new);

pub fn home_dir() -> PathBuf {
    BASE_DIRS
        .as_ref()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~"))
}

/// `~/.claude/projects`, where Claude Code keeps one JSONL transcript per session.
pub fn default_primary_root() -> PathBuf {
    home_dir().join(".claude").join("projects")
}

/// Candidate Claude Desktop data directories for this platform.
///
/// On Windows these resolve to `%APPDATA%` and `%LOCALAPPDATA%` (plus the Store
/// package directory); elsewhere to the XDG / Application Support equivalents.
/// Roots that resolve to the same path are listed once.
pub fn default_secondary_roots() -> Vec<PathBuf> {
    let Some(b) = BASE_DIRS.as_ref() else {
        return Vec::new();
    };
    let roaming = b.config_dir();
    let local = b.data_local_dir();
    let candidates = [
        roaming.join("Claude"),
        local.join("Claude"),
        roaming.join("claude-desktop"),
        local.join("claude-desktop"),
        local.join("Packages").join("Claude"),
    ];
    let mut roots: Vec<PathBuf> = Vec::with_capacity(candidates.len());
    for c in candidates {
        if !roots.contains(&c) {
            roots.push(c);
        }
    }
    roots
}

/// Split comma-separated list values (as accepted from env vars), dropping empties.
pub fn split_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(p: &str) -> PathBuf {
    if p == "~" {
        return home_dir();
    }
    if let Some(rest) = p.strip_prefix("~/") {
        return home_dir().join(rest);
    }
    PathBuf::from(p)
}

pub fn format_path(p: &Path) -> String {
    let s = p.to_string_lossy();
    if let Some(b) = BASE_DIRS.as_ref() {
        let home_s = b.home_dir().to_string_lossy();
        if s.starts_with(&*home_s) {
            return format!("~{}", &s[home_s.len()..]);
        }
    }
    s.into_owned()
}

pub fn format_currency(v: f64) -> String {
    format!("${v:.2}")
}

pub fn format_tokens(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.1}B", n as f64 / 1e9)
    } else if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1e6)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1e3)
    } else {
        n.to_string()
    }
}

pub fn format_percent(fraction: f64) -> String {
    format!("{:.0}%", (fraction * 100.0).max(0.0))
}

pub fn format_clock(ts: Option<&DateTime<Local>>) -> String {
    ts.map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string())
}

pub(crate) fn parse_bool_env(var: &str) -> bool {
    match env::var(var) {
        Ok(val) => matches!(
            val.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => false,
    }
}

fn open_command(url: &str) -> Command {
    if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", "", url]);
        cmd
    } else if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(url);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(url);
        cmd
    }
}

/// Hand the usage page to the platform's default URL handler.
///
/// `CLAUDE_USAGE_NO_BROWSER=1` suppresses the launch (headless sessions, tests).
pub fn open_usage_page(url: &str) -> anyhow::Result<()> {
    if parse_bool_env("CLAUDE_USAGE_NO_BROWSER") {
        log::info!("browser launch disabled; usage page is {url}");
        return Ok(());
    }
    let status = open_command(url)
        .status()
        .map_err(|e| anyhow::anyhow!("launch browser for {url}: {e}"))?;
    if !status.success() {
        anyhow::bail!("browser launcher exited with {status}");
    }
    Ok(())
}
