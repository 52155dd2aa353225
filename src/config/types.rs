use crate::url::NormalizationPolicy;
use serde::Deserialize;

/// Default remaining depth given to the seed URL
pub const DEFAULT_MAX_DEPTH: u32 = 2;

/// Default number of workers, and so of simultaneous fetches
pub const DEFAULT_MAX_CONCURRENT_FETCHES: u32 = 8;

/// Default per-request timeout (milliseconds)
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;

/// Main configuration structure
///
/// Every table and field is optional in the TOML file; the seed URL must be
/// supplied either here or on the command line before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// URL the crawl starts from
    #[serde(rename = "seed-url")]
    pub seed_url: Option<String>,

    /// Remaining depth given to the seed; 0 means nothing is fetched
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Number of workers pulling from the frontier
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: u32,

    /// Cap on distinct URLs claimed during the run
    #[serde(rename = "max-pages")]
    pub max_pages: Option<usize>,

    /// Timeout for a single HTTP request (milliseconds)
    #[serde(rename = "fetch-timeout-ms")]
    pub fetch_timeout_ms: u64,

    /// Deadline for the whole run (milliseconds)
    #[serde(rename = "run-timeout-ms")]
    pub run_timeout_ms: Option<u64>,

    /// Resolve relative hrefs against the page they were found on
    #[serde(rename = "resolve-relative-links")]
    pub resolve_relative_links: bool,

    /// How URLs are compared for dedup
    #[serde(rename = "url-normalization")]
    pub url_normalization: NormalizationPolicy,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: None,
            max_depth: DEFAULT_MAX_DEPTH,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            max_pages: None,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            run_timeout_ms: None,
            resolve_relative_links: false,
            url_normalization: NormalizationPolicy::Exact,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version` or `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}
