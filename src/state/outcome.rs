/// Terminal states of a single crawl unit
///
/// Every unit ends in exactly one of these. Units never move back to an
/// earlier step, so the outcome is final once recorded.
use std::fmt;

/// Represents how a crawl unit terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitOutcome {
    // ===== Skip States =====
    /// Remaining depth was zero or less; nothing was fetched
    DepthExhausted,

    /// The URL had already been claimed by another unit
    Duplicate,

    /// The run's page cap was reached before this URL could be claimed
    PageLimitHit,

    // ===== Fetch States =====
    /// The fetch failed; the error was reported and no links were followed
    FetchFailed,

    /// The page was fetched, reported, and its links were enqueued
    Completed,

    /// The run was cancelled while this unit was in flight
    Cancelled,
}

impl UnitOutcome {
    /// Returns true if this unit issued a fetch (whatever its result)
    pub fn attempted_fetch(&self) -> bool {
        matches!(self, Self::FetchFailed | Self::Completed)
    }

    /// Returns true if the unit was dropped before any fetch was attempted
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            Self::DepthExhausted | Self::Duplicate | Self::PageLimitHit
        )
    }

    /// Short machine-friendly name, used in logs and statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DepthExhausted => "depth_exhausted",
            Self::Duplicate => "duplicate",
            Self::PageLimitHit => "page_limit_hit",
            Self::FetchFailed => "fetch_failed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns all possible outcomes, in the order they are reported
    pub fn all() -> [Self; 6] {
        [
            Self::DepthExhausted,
            Self::Duplicate,
            Self::PageLimitHit,
            Self::FetchFailed,
            Self::Completed,
            Self::Cancelled,
        ]
    }
}

impl fmt::Display for UnitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
