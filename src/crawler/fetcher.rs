//! Fetch capability
//!
//! This module defines the seam between the crawl loop and the outside world:
//! - The `Fetcher` trait: URL in, page body and outbound links out
//! - `HttpFetcher`: the real implementation over reqwest and scraper
//! - `StaticFetcher`: an in-memory link graph for tests and embedding
//!
//! Fetchers never retry. Every failure is returned to the caller as a
//! distinct `FetchError` carrying the originating URL.

use crate::config::{Config, UserAgentConfig};
use crate::crawler::parser::extract_links;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// A successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Page body as text
    pub body: String,

    /// Outbound URLs, in document order
    pub links: Vec<String>,
}

impl FetchedPage {
    /// Creates a page from a body and its outbound links
    pub fn new(body: impl Into<String>, links: Vec<String>) -> Self {
        Self {
            body: body.into(),
            links,
        }
    }
}

/// Retrieves a URL's content and the links it contains
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches one URL
    ///
    /// Implementations must not retry; the caller decides what to do with
    /// an error.
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `fetch_timeout` - Deadline for each request, connect through body
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetch_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(fetch_timeout)
        .connect_timeout(fetch_timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages over HTTP and extracts their `<a href>` links
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    resolve_relative_links: bool,
}

impl HttpFetcher {
    /// Creates a fetcher from the crawler configuration
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_millis(config.crawler.fetch_timeout_ms),
        )?;

        Ok(Self::with_client(
            client,
            config.crawler.resolve_relative_links,
        ))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, resolve_relative_links: bool) -> Self {
        Self {
            client,
            resolve_relative_links,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches a URL
    ///
    /// # Request Flow
    ///
    /// 1. Send GET request (redirects are followed by the client)
    /// 2. Any non-2xx status → `HttpStatus`
    /// 3. Decode the body using the charset the response declares (UTF-8
    ///    when none is given); a body that cannot be decoded → `Parse`
    /// 4. Extract `<a href>` values in document order
    ///
    /// Transport failures map to `Network`, or `Timeout` when the client
    /// deadline elapsed.
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Final URL after redirects is the right base for relative links
        let base_url = self
            .resolve_relative_links
            .then(|| response.url().clone());

        let body = response
            .text()
            .await
            .map_err(|e| classify_body_error(url, e))?;

        let links = extract_links(&body, base_url.as_ref());
        tracing::trace!("Extracted {} links from {}", links.len(), url);

        Ok(FetchedPage { body, links })
    }
}

/// Maps a reqwest error onto the fetch error taxonomy
fn classify_request_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Maps a failure while reading the body
///
/// Bytes that cannot be turned into text, such as a corrupt compressed
/// stream, are a `Parse` error. Anything else is treated like a request error.
fn classify_body_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_decode() {
        FetchError::Parse {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        classify_request_error(url, error)
    }
}

/// Serves a fixed link graph from memory
///
/// URLs missing from the graph fail with a `Network` error. Every call is
/// counted, so callers can assert how often a URL was fetched.
///
/// # Example
///
/// ```
/// use depth_crawler::crawler::StaticFetcher;
///
/// let fetcher = StaticFetcher::new()
///     .with_page("http://a/", "A", ["http://b/"])
///     .with_page("http://b/", "B", [] as [&str; 0]);
/// assert_eq!(fetcher.total_fetches(), 0);
/// ```
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, Result<FetchedPage, FetchError>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StaticFetcher {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page with its body and outbound links
    pub fn with_page<I, S>(mut self, url: &str, body: &str, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let page = FetchedPage::new(body, links.into_iter().map(Into::into).collect());
        self.pages.insert(url.to_string(), Ok(page));
        self
    }

    /// Makes fetching `url` fail with `error`
    pub fn with_error(mut self, url: &str, error: FetchError) -> Self {
        self.pages.insert(url.to_string(), Err(error));
        self
    }

    /// Number of times `url` has been fetched
    pub fn fetch_count(&self, url: &str) -> usize {
        self.lock_calls().get(url).copied().unwrap_or(0)
    }

    /// Total number of fetches across all URLs
    pub fn total_fetches(&self) -> usize {
        self.lock_calls().values().sum()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, HashMap<String, usize>> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        *self.lock_calls().entry(url.to_string()).or_insert(0) += 1;

        match self.pages.get(url) {
            Some(result) => result.clone(),
            None => Err(FetchError::Network {
                url: url.to_string(),
                message: "no such page".to_string(),
            }),
        }
    }
}
