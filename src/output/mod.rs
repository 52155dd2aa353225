//! Output module for crawl results
//!
//! This module handles:
//! - Emitting one line per visited page and per fetch error
//! - Collecting events in memory for embedders and tests
//! - Summarising a run's unit outcomes

pub mod stats;
mod traits;

pub use stats::{write_statistics, CrawlStatistics};
pub use traits::{format_visit, CrawlEvent, CrawlReporter, MemoryReporter, StdoutReporter};
