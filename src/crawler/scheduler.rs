//! Frontier of pending crawl units
//!
//! This module handles:
//! - The work queue that workers pull crawl units from
//! - Registering every unit with the completion tracker before it is queued
//!
//! A unit owns its `WorkTicket`. Whether the unit is processed, skipped, or
//! simply dropped from the queue when a run is cancelled, the ticket goes
//! with it and the tracker is decremented exactly once.

use crate::state::{CompletionTracker, WorkTicket};
use tokio::sync::{mpsc, Mutex};

/// A pending instruction to process one URL at a given remaining depth
#[derive(Debug)]
pub struct CrawlUnit {
    /// The URL to process
    pub url: String,

    /// Depth left for this branch; 0 means the unit terminates immediately
    pub remaining_depth: u32,

    /// Outstanding-work registration, released when the unit is dropped
    _ticket: WorkTicket,
}

/// Handle for adding units to the frontier
///
/// Cheap to clone; every worker holds one so it can fan out.
#[derive(Debug, Clone)]
pub struct FrontierSender {
    tx: mpsc::UnboundedSender<CrawlUnit>,
    tracker: CompletionTracker,
}

impl FrontierSender {
    /// Registers a new unit with the tracker, then queues it
    ///
    /// The increment happens before the unit becomes visible to any worker,
    /// so the tracker cannot reach zero while work is still being created.
    /// Returns false if the frontier has already been torn down; the unit is
    /// dropped and its registration released.
    pub fn enqueue(&self, url: String, remaining_depth: u32) -> bool {
        let unit = CrawlUnit {
            url,
            remaining_depth,
            _ticket: self.tracker.register(),
        };

        match self.tx.send(unit) {
            Ok(()) => true,
            Err(mpsc::error::SendError(unit)) => {
                tracing::debug!("Frontier closed, dropping {}", unit.url);
                false
            }
        }
    }
}

/// Unbounded FIFO of crawl units shared by all workers of a run
#[derive(Debug)]
pub struct Frontier {
    sender: FrontierSender,
    receiver: Mutex<mpsc::UnboundedReceiver<CrawlUnit>>,
}

impl Frontier {
    /// Creates an empty frontier whose units register with `tracker`
    pub fn new(tracker: CompletionTracker) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            sender: FrontierSender { tx, tracker },
            receiver: Mutex::new(rx),
        }
    }

    /// Returns a handle for enqueueing units
    pub fn sender(&self) -> FrontierSender {
        self.sender.clone()
    }

    /// Waits for the next unit
    ///
    /// Only one worker waits on the queue at a time; the rest wait on the
    /// lock. Cancel-safe: dropping the future loses no unit.
    pub async fn next_unit(&self) -> Option<CrawlUnit> {
        let unit = self.receiver.lock().await.recv().await;
        if let Some(unit) = &unit {
            tracing::trace!(
                "Handing out {} (remaining depth {})",
                unit.url,
                unit.remaining_depth
            );
        }
        unit
    }
}
