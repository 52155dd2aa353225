//! Reporter trait and its implementations
//!
//! A reporter receives the two observable outputs of a crawl unit: a
//! successful visit, or a fetch error. Reporters are shared by every worker
//! of a run and must be thread-safe.

use crate::FetchError;
use std::io::Write;
use std::sync::{Mutex, MutexGuard};

/// Trait for crawl output sinks
pub trait CrawlReporter: Send + Sync {
    /// Records a successfully visited page
    ///
    /// # Arguments
    ///
    /// * `url` - The URL as it was fetched
    /// * `body` - The page body
    fn on_visit(&self, url: &str, body: &str);

    /// Records a fetch that failed
    ///
    /// # Arguments
    ///
    /// * `error` - The error, which carries the originating URL
    fn on_error(&self, error: &FetchError);
}

/// Formats the output line for a successful visit
///
/// # Example
///
/// ```
/// use depth_crawler::output::format_visit;
///
/// assert_eq!(format_visit("http://a/", "A"), r#"found : http://a/ "A""#);
/// ```
pub fn format_visit(url: &str, body: &str) -> String {
    format!("found : {} {:?}", url, body)
}

/// Writes one line per event to standard output
#[derive(Debug, Default)]
pub struct StdoutReporter;

impl StdoutReporter {
    /// Creates a new stdout reporter
    pub fn new() -> Self {
        Self
    }

    fn write_line(&self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", line) {
            tracing::debug!("Failed to write output line: {}", e);
        }
    }
}

impl CrawlReporter for StdoutReporter {
    fn on_visit(&self, url: &str, body: &str) {
        self.write_line(&format_visit(url, body));
    }

    fn on_error(&self, error: &FetchError) {
        self.write_line(&error.to_string());
    }
}

/// A single recorded crawl event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    /// A page was fetched successfully
    Visit { url: String, body: String },

    /// A fetch failed
    Error(FetchError),
}

/// Collects events in memory, in the order they were reported
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<CrawlEvent>>,
}

impl MemoryReporter {
    /// Creates an empty reporter
    pub fn new() -> Self {
        Self::default()
    }

    /// All events recorded so far
    pub fn events(&self) -> Vec<CrawlEvent> {
        self.lock().clone()
    }

    /// URLs of successful visits, in report order
    pub fn visited_urls(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                CrawlEvent::Visit { url, .. } => Some(url.clone()),
                CrawlEvent::Error(_) => None,
            })
            .collect()
    }

    /// Errors, in report order
    pub fn errors(&self) -> Vec<FetchError> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                CrawlEvent::Error(error) => Some(error.clone()),
                CrawlEvent::Visit { .. } => None,
            })
            .collect()
    }

    /// Renders the events exactly as `StdoutReporter` would print them
    pub fn lines(&self) -> Vec<String> {
        self.lock()
            .iter()
            .map(|event| match event {
                CrawlEvent::Visit { url, body } => format_visit(url, body),
                CrawlEvent::Error(error) => error.to_string(),
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CrawlEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CrawlReporter for MemoryReporter {
    fn on_visit(&self, url: &str, body: &str) {
        self.lock().push(CrawlEvent::Visit {
            url: url.to_string(),
            body: body.to_string(),
        });
    }

    fn on_error(&self, error: &FetchError) {
        self.lock().push(CrawlEvent::Error(error.clone()));
    }
}
