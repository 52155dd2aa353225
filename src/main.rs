//! depth-crawler main entry point
//!
//! This is the command-line interface for the crawler. Visits and fetch
//! errors go to stdout; logs and statistics go to stderr.

use anyhow::Context;
use clap::Parser;
use depth_crawler::config::{compute_config_hash, parse_config, Config};
use depth_crawler::crawler::crawl;
use depth_crawler::output::{write_statistics, StdoutReporter};
use depth_crawler::url::NormalizationPolicy;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// depth-crawler: a depth-bounded concurrent web crawler
///
/// Fetches the seed URL, follows every <a href> it finds, and keeps going
/// until the depth budget runs out. Each URL is visited at most once.
#[derive(Parser, Debug)]
#[command(name = "depth-crawler")]
#[command(version)]
#[command(about = "A depth-bounded concurrent web crawler", long_about = None)]
struct Cli {
    /// URL to start crawling from (overrides `seed-url` in the config file)
    #[arg(value_name = "SEED")]
    seed: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Remaining depth given to the seed; 0 fetches nothing
    #[arg(short, long)]
    depth: Option<u32>,

    /// Maximum number of simultaneous fetches
    #[arg(short = 'j', long)]
    concurrency: Option<u32>,

    /// Stop claiming new URLs after this many
    #[arg(long)]
    max_pages: Option<usize>,

    /// Timeout for each HTTP request, in milliseconds
    #[arg(long)]
    fetch_timeout_ms: Option<u64>,

    /// Deadline for the whole crawl, in milliseconds
    #[arg(long)]
    run_timeout_ms: Option<u64>,

    /// Resolve relative links against the page they appear on
    #[arg(long)]
    resolve_links: bool,

    /// How URLs are compared when deciding whether one was already visited
    #[arg(long, value_enum)]
    normalize: Option<NormalizationPolicy>,

    /// Print run statistics to stderr when the crawl finishes
    #[arg(long)]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error logging
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Layers command-line flags over the file configuration
    fn apply_overrides(&self, config: &mut Config) {
        let crawler = &mut config.crawler;

        if let Some(seed) = &self.seed {
            crawler.seed_url = Some(seed.clone());
        }
        if let Some(depth) = self.depth {
            crawler.max_depth = depth;
        }
        if let Some(concurrency) = self.concurrency {
            crawler.max_concurrent_fetches = concurrency;
        }
        if let Some(max_pages) = self.max_pages {
            crawler.max_pages = Some(max_pages);
        }
        if let Some(timeout) = self.fetch_timeout_ms {
            crawler.fetch_timeout_ms = timeout;
        }
        if let Some(timeout) = self.run_timeout_ms {
            crawler.run_timeout_ms = Some(timeout);
        }
        if self.resolve_links {
            crawler.resolve_relative_links = true;
        }
        if let Some(policy) = self.normalize {
            crawler.url_normalization = policy;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let config = parse_config(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            let hash = compute_config_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    // Validated once, by `crawl`, after the flags are merged in
    cli.apply_overrides(&mut config);

    tracing::debug!(
        "Normalization: {}, resolve links: {}, max pages: {:?}",
        config.crawler.url_normalization,
        config.crawler.resolve_relative_links,
        config.crawler.max_pages
    );

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let stats = crawl(&config, Arc::new(StdoutReporter::new()), cancel)
        .await
        .context("crawl could not start")?;

    if cli.stats {
        write_statistics(&stats, &mut std::io::stderr().lock())?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("depth_crawler=info,warn"),
            1 => EnvFilter::new("depth_crawler=debug,info"),
            2 => EnvFilter::new("depth_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Cancels the crawl on Ctrl-C
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, stopping crawl");
                cancel.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
        }
    });
}
