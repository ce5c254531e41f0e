#[derive(clap::Parser, Debug)]
#[command(
    name = "claude-usage",
    about = "Weekly and session token usage for Claude Code and Claude Desktop"
)]
pub struct Args {
    /// Emit JSON instead of colored text
    #[arg(long)]
    pub json: bool,

    /// Keep running and refresh periodically (stdin: r=refresh, o=open usage page, q=quit)
    #[arg(long)]
    pub watch: bool,

    /// Open the Claude usage page in the default browser and exit
    #[arg(long)]
    pub open_usage_page: bool,

    /// Seconds between background refreshes in --watch mode
    #[arg(long = "interval", env = "CLAUDE_USAGE_REFRESH_SECS", default_value_t = 30)]
    pub interval_secs: u64,

    /// Token limit for the current session (most recent transcript)
    #[arg(long, env = "CLAUDE_USAGE_SESSION_LIMIT", default_value_t = 1_000_000)]
    pub session_limit: u64,

    /// Token limit for the current week (both sources combined)
    #[arg(long, env = "CLAUDE_USAGE_WEEKLY_LIMIT", default_value_t = 10_000_000)]
    pub weekly_limit: u64,

    /// Blended USD cost per million tokens for the estimate
    #[arg(long, env = "CLAUDE_USAGE_RATE_PER_MILLION", default_value_t = 9.0)]
    pub rate_per_million: f64,

    /// Claude Code transcript directory. Defaults to ~/.claude/projects
    #[arg(long, env = "CLAUDE_USAGE_PRIMARY_ROOT")]
    pub primary_root: Option<String>,

    /// Claude Desktop data directories, repeatable or comma-separated.
    /// Defaults to the platform's application-data locations
    #[arg(long = "secondary-root", env = "CLAUDE_USAGE_SECONDARY_ROOTS")]
    pub secondary_roots: Vec<String>,

    /// Glob patterns matched under each Claude Desktop directory, repeatable or
    /// comma-separated
    #[arg(long = "secondary-pattern", env = "CLAUDE_USAGE_SECONDARY_PATTERNS")]
    pub secondary_patterns: Vec<String>,

    /// Count a Desktop file once even when several patterns match it
    #[arg(long, env = "CLAUDE_USAGE_DEDUPE_SECONDARY")]
    pub dedupe_secondary: bool,

    /// URL opened by --open-usage-page and the `o` command
    #[arg(long, env = "CLAUDE_USAGE_URL")]
    pub usage_url: Option<String>,

    /// Debug mode: verbose logging and skipped-file counts
    #[arg(long, env = "CLAUDE_DEBUG")]
    pub debug: bool,
}

impl Args {
    pub fn parse() -> Self {
        <Args as clap::Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["claude-usage"]).unwrap();
        assert_eq!(args.interval_secs, 30);
        assert_eq!(args.session_limit, 1_000_000);
        assert_eq!(args.weekly_limit, 10_000_000);
        assert_eq!(args.rate_per_million, 9.0);
        assert!(args.secondary_roots.is_empty());
        assert!(!args.watch);
    }

    #[test]
    fn test_repeatable_lists() {
        let args = Args::try_parse_from([
            "claude-usage",
            "--secondary-root",
            "/a",
            "--secondary-root",
            "/b,/c",
            "--secondary-pattern",
            "**/*.json",
        ])
        .unwrap();
        assert_eq!(args.secondary_roots, vec!["/a", "/b,/c"]);
        assert_eq!(args.secondary_patterns, vec!["**/*.json"]);
    }
}
