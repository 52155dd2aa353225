//! Per-run crawl state
//!
//! Everything in this module is constructed once per run and shared by the
//! workers of that run only. Nothing here is process-global, so independent
//! runs can proceed side by side.
//!
//! # Components
//!
//! - `VisitedSet`: claims each URL exactly once across racing workers
//! - `CompletionTracker`: counts outstanding crawl units and signals when none remain
//! - `UnitOutcome`: the terminal state a crawl unit finished in

mod completion;
mod outcome;
mod visited;

// Re-export main types
pub use completion::{CompletionTracker, WorkTicket};
pub use outcome::UnitOutcome;
pub use visited::{ClaimOutcome, VisitedSet};
