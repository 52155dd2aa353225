//! Configuration module for the crawler
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Command-line flags are layered on top of the file by the binary and
//! the merged result is validated once.
//!
//! # Example
//!
//! ```no_run
//! use depth_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, UserAgentConfig, DEFAULT_FETCH_TIMEOUT_MS,
    DEFAULT_MAX_CONCURRENT_FETCHES, DEFAULT_MAX_DEPTH,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, parse_config};
pub use validation::{validate, MAX_CONCURRENT_FETCHES};
