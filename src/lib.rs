//! depth-crawler: a depth-bounded concurrent web crawler
//!
//! Starting from a seed URL, the crawler fetches each page, extracts its
//! outbound links, and follows them until the configured depth is exhausted.
//! Every URL is processed at most once per run.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawler operations
///
/// Individual fetch failures never surface here; they are reported per page
/// through [`FetchError`] and do not abort a run.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors produced while fetching a single page
///
/// These are local to one crawl unit: the unit reports the error and stops
/// expanding that branch, while the rest of the run carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("error fetching URL {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP error {status} for URL {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("error parsing HTML of {url}: {message}")]
    Parse { url: String, message: String },

    #[error("timed out fetching URL {url}")]
    Timeout { url: String },

    #[error("fetch of URL {url} was cancelled")]
    Cancelled { url: String },
}

impl FetchError {
    /// Returns the URL whose fetch produced this error
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. }
            | Self::HttpStatus { url, .. }
            | Self::Parse { url, .. }
            | Self::Timeout { url }
            | Self::Cancelled { url } => url,
        }
    }
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Coordinator, Fetcher};
pub use state::{CompletionTracker, UnitOutcome, VisitedSet};
pub use url::NormalizationPolicy;
