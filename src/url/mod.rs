//! URL handling for the crawler
//!
//! URLs are opaque strings everywhere in the crawl. The only place their
//! syntax matters is the dedup key, which is governed by an explicit
//! [`NormalizationPolicy`].

mod normalize;

pub use normalize::NormalizationPolicy;
