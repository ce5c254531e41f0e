use anyhow::{Context, Result};
use std::io::BufRead;
use std::sync::Arc;

use claude_usage_monitor::cli::Args;
use claude_usage_monitor::config::MonitorConfig;
use claude_usage_monitor::display::{
    build_json_output, describe_roots, print_json_output, print_text_output,
};
use claude_usage_monitor::models::UsageSnapshot;
use claude_usage_monitor::scheduler::RefreshLoop;
use claude_usage_monitor::usage::{RefreshOutcome, UsageMonitor};
use claude_usage_monitor::utils::open_usage_page;

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(Some(env_logger::fmt::TimestampPrecision::Millis))
        .init();
}

fn render(snapshot: &UsageSnapshot, args: &Args) -> Result<()> {
    if args.json {
        if args.watch {
            // one compact document per refresh so consumers can read line by line
            println!("{}", serde_json::to_string(&build_json_output(snapshot))?);
        } else {
            print_json_output(snapshot)?;
        }
    } else {
        print_text_output(snapshot, args.debug);
    }
    Ok(())
}

fn run_once(monitor: &UsageMonitor, args: &Args) -> Result<()> {
    if let Err(err) = monitor.refresh() {
        log::warn!("usage refresh failed: {err}");
    }
    render(&monitor.snapshot(), args)
}

fn run_watch(monitor: Arc<UsageMonitor>, args: Args) -> Result<()> {
    let args = Arc::new(args);
    let loop_args = Arc::clone(&args);
    let refresh_loop = RefreshLoop::spawn(
        Arc::clone(&monitor),
        monitor.config().refresh_interval,
        move |snapshot| {
            if let Err(err) = render(snapshot, &loop_args) {
                log::warn!("render failed: {err}");
            }
        },
    );

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("read command from stdin")?;
        match line.trim() {
            "r" | "refresh" => match monitor.refresh() {
                Ok(RefreshOutcome::Published(snapshot)) => render(&snapshot, &args)?,
                Ok(RefreshOutcome::AlreadyRunning) => log::info!("refresh already running"),
                Err(err) => log::warn!("usage refresh failed: {err}"),
            },
            "o" | "open" => {
                if let Err(err) = open_usage_page(&monitor.config().usage_url) {
                    log::warn!("{err:#}");
                }
            }
            "q" | "quit" => {
                refresh_loop.stop();
                return Ok(());
            }
            "" => {}
            other => eprintln!("unknown command {other:?} (r=refresh, o=open usage page, q=quit)"),
        }
    }

    // stdin closed: keep refreshing until the process is signalled
    log::debug!("stdin closed; refreshing until interrupted");
    loop {
        std::thread::park();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);
    let config = MonitorConfig::from_args(&args);

    if args.open_usage_page {
        return open_usage_page(&config.usage_url).context("open usage page");
    }

    if args.debug {
        log::debug!("scanning {}", describe_roots(&config));
    }

    let monitor = Arc::new(UsageMonitor::new(config));
    if args.watch {
        run_watch(monitor, args)
    } else {
        run_once(&monitor, &args)
    }
}
