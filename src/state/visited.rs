//! Concurrency-safe visited set
//!
//! The check-and-mark step is the only synchronization point that keeps a
//! URL from being processed twice. The lock is held for that step alone and
//! never across a fetch.

use crate::url::NormalizationPolicy;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Result of attempting to claim a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// This call performed the first claim; the caller owns the URL
    First,

    /// The URL was claimed earlier by some other caller
    AlreadyClaimed,

    /// The set is full; the URL was not recorded
    LimitReached,
}

/// Set of URLs already claimed during a run
///
/// Entries are never removed. The set lives exactly as long as the run.
#[derive(Debug, Default)]
pub struct VisitedSet {
    claimed: Mutex<HashSet<String>>,
    policy: NormalizationPolicy,
}

impl VisitedSet {
    /// Creates an empty set that compares URLs byte-for-byte
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set that derives dedup keys with `policy`
    pub fn with_policy(policy: NormalizationPolicy) -> Self {
        Self {
            claimed: Mutex::new(HashSet::new()),
            policy,
        }
    }

    /// Claims a URL
    ///
    /// Returns `true` if the URL was already claimed by a prior (possibly
    /// concurrent) call, `false` if this call made the first claim. Exactly one
    /// caller ever sees `false` for a given URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use depth_crawler::state::VisitedSet;
    ///
    /// let visited = VisitedSet::new();
    /// assert!(!visited.claim("http://a/"));
    /// assert!(visited.claim("http://a/"));
    /// ```
    pub fn claim(&self, url: &str) -> bool {
        !matches!(self.try_claim(url, None), ClaimOutcome::First)
    }

    /// Claims a URL unless the set already holds `limit` entries
    ///
    /// A URL that is already present reports `AlreadyClaimed` even when the
    /// set is full.
    pub fn try_claim(&self, url: &str, limit: Option<usize>) -> ClaimOutcome {
        let key = self.policy.dedup_key(url);
        let mut claimed = self.lock();

        if claimed.contains(key.as_ref()) {
            return ClaimOutcome::AlreadyClaimed;
        }

        if let Some(limit) = limit {
            if claimed.len() >= limit {
                return ClaimOutcome::LimitReached;
            }
        }

        claimed.insert(key.into_owned());
        ClaimOutcome::First
    }

    /// Returns true if the URL has been claimed
    pub fn contains(&self, url: &str) -> bool {
        let key = self.policy.dedup_key(url);
        self.lock().contains(key.as_ref())
    }

    /// Returns the number of claimed URLs
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether nothing has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The policy used to derive dedup keys
    pub fn policy(&self) -> NormalizationPolicy {
        self.policy
    }

    // A panic while holding the lock cannot leave the set half-updated, so a
    // poisoned mutex is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
