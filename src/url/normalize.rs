use serde::Deserialize;
use std::borrow::Cow;
use std::fmt;

/// Policy for turning a URL into its dedup key
///
/// Only the visited-set key is affected. The URL that gets fetched and
/// reported is always the raw string found in the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizationPolicy {
    /// Byte-for-byte string match; `http://a/` and `http://a` are distinct
    #[default]
    Exact,

    /// Drop everything from the first `#` before comparing
    StripFragment,
}

impl NormalizationPolicy {
    /// Computes the dedup key for a URL under this policy
    ///
    /// # Examples
    ///
    /// ```
    /// use depth_crawler::url::NormalizationPolicy;
    ///
    /// let policy = NormalizationPolicy::StripFragment;
    /// assert_eq!(policy.dedup_key("http://a/page#top"), "http://a/page");
    /// assert_eq!(NormalizationPolicy::Exact.dedup_key("http://a/#x"), "http://a/#x");
    /// ```
    pub fn dedup_key<'a>(&self, url: &'a str) -> Cow<'a, str> {
        match self {
            Self::Exact => Cow::Borrowed(url),
            Self::StripFragment => match url.split_once('#') {
                Some((without_fragment, _)) => Cow::Owned(without_fragment.to_string()),
                None => Cow::Borrowed(url),
            },
        }
    }
}

impl fmt::Display for NormalizationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::StripFragment => write!(f, "strip-fragment"),
        }
    }
}
