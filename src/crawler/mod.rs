//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The fetch capability and its HTTP implementation
//! - HTML link extraction
//! - The frontier work queue
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, FetchedPage, Fetcher, HttpFetcher, StaticFetcher};
pub use parser::extract_links;
pub use scheduler::{CrawlUnit, Frontier, FrontierSender};

use crate::config::{validate, Config};
use crate::output::{CrawlReporter, CrawlStatistics};
use crate::CrawlError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration (callers need not validate it first)
/// 2. Build the HTTP client
/// 3. Crawl from the seed, reporting every visit and fetch error
/// 4. Return the run's statistics
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `reporter` - Where visits and errors are sent
/// * `cancel` - Cancelling this token stops the run early
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - The run finished (fetch errors do not fail it)
/// * `Err(CrawlError)` - Invalid configuration or HTTP client setup failure
///
/// # Example
///
/// ```no_run
/// use depth_crawler::config::load_config;
/// use depth_crawler::crawler::crawl;
/// use depth_crawler::output::StdoutReporter;
/// use std::path::Path;
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("crawler.toml"))?;
/// let stats = crawl(&config, Arc::new(StdoutReporter::new()), CancellationToken::new()).await?;
/// println!("{} pages visited", stats.pages_visited());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    config: &Config,
    reporter: Arc<dyn CrawlReporter>,
    cancel: CancellationToken,
) -> Result<CrawlStatistics, CrawlError> {
    validate(config)?;

    let fetcher = Arc::new(HttpFetcher::new(config)?);
    let coordinator =
        Coordinator::new(&config.crawler, fetcher, reporter)?.with_cancellation(cancel);

    Ok(coordinator.run().await)
}
