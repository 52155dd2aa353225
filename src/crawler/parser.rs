//! HTML parser for extracting outbound links
//!
//! Links are collected from every `<a href="...">` element in document order
//! (pre-order, depth-first). Values are returned exactly as written: no
//! trimming, no filtering of schemes, no deduplication within a page. Relative
//! references are resolved only when the caller passes a base URL.

use scraper::{Html, Selector};
use url::Url;

/// Extracts all `<a>` href values from an HTML document
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - When `Some`, relative hrefs are resolved against it; hrefs
///   that fail to resolve are kept verbatim
///
/// # Returns
///
/// The href values, in the order their elements appear in the document
///
/// # Example
///
/// ```
/// use depth_crawler::crawler::extract_links;
///
/// let html = r#"<body><a href="/b">B</a><p><a href="http://c/">C</a></p></body>"#;
/// assert_eq!(extract_links(html, None), vec!["/b", "http://c/"]);
/// ```
pub fn extract_links(html: &str, base_url: Option<&Url>) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                links.push(resolve_link(href, base_url));
            }
        }
    }

    links
}

/// Resolves an href against the base URL, falling back to the raw value
fn resolve_link(href: &str, base_url: Option<&Url>) -> String {
    match base_url {
        Some(base) => match base.join(href) {
            Ok(absolute_url) => absolute_url.to_string(),
            Err(e) => {
                tracing::trace!("Keeping unresolvable href {:?}: {}", href, e);
                href.to_string()
            }
        },
        None => href.to_string(),
    }
}
