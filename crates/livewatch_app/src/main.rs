mod platform;

use std::path::PathBuf;

use clap::Parser;

use platform::config::AppConfig;
use platform::logging::LogDestination;

/// Watch a remote record list and report what changes.
#[derive(Parser)]
#[command(name = "livewatch", version)]
struct Cli {
    /// RON config file (defaults to ./livewatch.ron when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Record list endpoint; repeat to merge several sources
    #[arg(long = "url")]
    urls: Vec<String>,

    /// Poll interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Added-record count above which a new-items notification is important
    #[arg(long)]
    threshold: Option<usize>,

    /// Where log output goes
    #[arg(long, value_enum)]
    log: Option<LogDestination>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if !cli.urls.is_empty() {
        config.sources = cli.urls;
    }
    if let Some(interval_ms) = cli.interval_ms {
        config.poll_interval_ms = interval_ms;
    }
    if let Some(threshold) = cli.threshold {
        config.important_threshold = threshold;
    }
    if let Some(log) = cli.log {
        config.log = log;
    }

    platform::logging::initialize(config.log, cli.verbose);
    platform::app::run(config)
}
