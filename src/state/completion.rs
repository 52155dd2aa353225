//! Completion tracking for crawl units
//!
//! The tracker counts outstanding units of work. A run is finished exactly
//! when the count returns to zero after having been positive.
//!
//! Work is normally registered through [`CompletionTracker::register`], which
//! hands back a [`WorkTicket`]. The ticket travels with the unit, and dropping
//! it is the unit's single decrement, whichever way the unit exits.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    outstanding: AtomicUsize,
    started: AtomicBool,
    notify: Notify,
}

/// Shared counter of outstanding crawl units
///
/// Cloning is cheap; all clones observe the same counter.
#[derive(Debug, Clone, Default)]
pub struct CompletionTracker {
    inner: Arc<Inner>,
}

impl CompletionTracker {
    /// Creates a tracker with no outstanding work
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more unit of outstanding work
    pub fn increment(&self) {
        // Count first: `started` must never be observed while the count is
        // still zero from before the first registration.
        self.inner.outstanding.fetch_add(1, Ordering::SeqCst);
        self.inner.started.store(true, Ordering::SeqCst);
    }

    /// Records that one unit of work has terminated
    ///
    /// Waking waiters happens when the count drops to zero. A decrement
    /// without a matching increment is ignored rather than wrapping.
    pub fn decrement(&self) {
        let previous = self
            .inner
            .outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));

        match previous {
            Ok(1) => self.inner.notify.notify_waiters(),
            Ok(_) => {}
            Err(_) => tracing::warn!("Completion tracker decremented below zero"),
        }
    }

    /// Increments the counter and returns a guard that decrements on drop
    pub fn register(&self) -> WorkTicket {
        self.increment();
        WorkTicket {
            tracker: self.clone(),
        }
    }

    /// Number of units currently outstanding
    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::SeqCst)
    }

    /// Returns true once work has been registered and all of it has finished
    pub fn is_complete(&self) -> bool {
        self.inner.started.load(Ordering::SeqCst) && self.outstanding() == 0
    }

    /// Waits until the count reaches zero after having been positive
    pub async fn wait(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register interest before checking, so a decrement racing with
            // the check still wakes us.
            notified.as_mut().enable();

            if self.is_complete() {
                return;
            }

            notified.await;
        }
    }
}

/// One registered unit of outstanding work
///
/// Dropping the ticket decrements the tracker exactly once.
#[derive(Debug)]
#[must_use = "dropping a ticket immediately marks its work as finished"]
pub struct WorkTicket {
    tracker: CompletionTracker,
}

impl Drop for WorkTicket {
    fn drop(&mut self) {
        self.tracker.decrement();
    }
}
