use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use feedmerge::config::Config;
use feedmerge::feed::Aggregator;

/// Default config file location (~/.config/feedmerge/config.toml), if HOME is set
fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("feedmerge")
            .join("config.toml"),
    )
}

#[derive(Parser, Debug)]
#[command(
    name = "feedmerge",
    version,
    about = "Fetch RSS feeds concurrently and print their merged items as JSON"
)]
struct Args {
    /// Feed URLs joined by the delimiter (comma by default)
    urls: String,

    /// Config file (defaults to ~/.config/feedmerge/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Separator between URLs
    #[arg(long, value_name = "STR")]
    delimiter: Option<String>,

    /// Maximum feeds fetched at once
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Per-feed request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Print a per-feed status line to stderr
    #[arg(long)]
    report: bool,
}

impl Args {
    fn load_config(&self) -> Result<Config> {
        let mut config = match self.config.clone().or_else(default_config_path) {
            Some(path) => Config::load(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(delimiter) = &self.delimiter {
            config.delimiter = delimiter.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.max_concurrent_fetches = concurrency;
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = timeout;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.load_config()?;

    let aggregator = Aggregator::new(&config).context("Failed to create HTTP client")?;
    let report = aggregator.parse_with_report(&args.urls).await;

    if args.report {
        for feed in &report.feeds {
            match &feed.result {
                Ok(count) => eprintln!("ok     {} ({} items)", feed.url, count),
                Err(e) => eprintln!("failed {}: {}", feed.url, e),
            }
        }
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&report.items)
    } else {
        serde_json::to_string(&report.items)
    }
    .context("Failed to serialize items")?;

    println!("{json}");
    Ok(())
}
