//! Crawler coordinator - main crawl orchestration logic
//!
//! A run is a fixed pool of workers pulling crawl units from a shared
//! frontier. Each unit goes through the same steps:
//!
//! 1. Depth check: remaining depth 0 ends the unit
//! 2. Dedup check: a URL already claimed ends the unit
//! 3. Fetch, racing the run's cancellation token
//! 4. Report the visit (or the error, which ends the unit)
//! 5. Enqueue one unit per outbound link at remaining depth - 1
//!
//! The run is over when the completion tracker drops back to zero, or when
//! the run is cancelled.

use crate::config::{CrawlerConfig, MAX_CONCURRENT_FETCHES};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::scheduler::{CrawlUnit, Frontier, FrontierSender};
use crate::output::{CrawlReporter, CrawlStatistics};
use crate::state::{ClaimOutcome, CompletionTracker, UnitOutcome, VisitedSet};
use crate::{ConfigError, FetchError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Everything the workers of one run share
struct RunContext<F: ?Sized> {
    fetcher: Arc<F>,
    reporter: Arc<dyn CrawlReporter>,
    visited: Arc<VisitedSet>,
    tracker: CompletionTracker,
    frontier: Frontier,
    sender: FrontierSender,
    cancel: CancellationToken,
    max_pages: Option<usize>,
}

/// Main crawler coordinator structure
///
/// All state is owned by the coordinator and lives for a single run, so any
/// number of coordinators can run side by side.
pub struct Coordinator<F: Fetcher + ?Sized> {
    seed_url: String,
    max_depth: u32,
    workers: usize,
    max_pages: Option<usize>,
    run_timeout: Option<Duration>,
    fetcher: Arc<F>,
    reporter: Arc<dyn CrawlReporter>,
    visited: Arc<VisitedSet>,
    tracker: CompletionTracker,
    cancel: CancellationToken,
}

impl<F: Fetcher + ?Sized + 'static> Coordinator<F> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration; `seed_url` must be set
    /// * `fetcher` - Fetch capability used for every page
    /// * `reporter` - Sink for visits and fetch errors
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(ConfigError)` - No seed URL was configured
    pub fn new(
        config: &CrawlerConfig,
        fetcher: Arc<F>,
        reporter: Arc<dyn CrawlReporter>,
    ) -> Result<Self, ConfigError> {
        let seed_url = config
            .seed_url
            .clone()
            .ok_or_else(|| ConfigError::Validation("seed_url is required".to_string()))?;

        Ok(Self {
            seed_url,
            max_depth: config.max_depth,
            workers: config.max_concurrent_fetches.clamp(1, MAX_CONCURRENT_FETCHES) as usize,
            max_pages: config.max_pages,
            run_timeout: config.run_timeout_ms.map(Duration::from_millis),
            fetcher,
            reporter,
            visited: Arc::new(VisitedSet::with_policy(config.url_normalization)),
            tracker: CompletionTracker::new(),
            cancel: CancellationToken::new(),
        })
    }

    /// Makes the run stop when `token` is cancelled
    ///
    /// The run derives its own child token, so cancelling the run (for
    /// example through its deadline) never cancels the caller's token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this run when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The run's visited set
    pub fn visited(&self) -> Arc<VisitedSet> {
        Arc::clone(&self.visited)
    }

    /// The run's completion tracker
    pub fn tracker(&self) -> CompletionTracker {
        self.tracker.clone()
    }

    /// Runs the crawl to completion
    ///
    /// Returns once no crawl unit is outstanding, or once the run has been
    /// cancelled. Fetch failures never fail the run; they are reported and
    /// tallied.
    pub async fn run(self) -> CrawlStatistics {
        let mut stats = CrawlStatistics::new(&self.seed_url, self.max_depth);
        let run_token = self.cancel.child_token();

        tracing::info!(
            "Starting crawl of {} (depth {}, {} workers, {} dedup)",
            self.seed_url,
            self.max_depth,
            self.workers,
            self.visited.policy()
        );

        let frontier = Frontier::new(self.tracker.clone());
        let sender = frontier.sender();
        sender.enqueue(self.seed_url.clone(), self.max_depth);

        let ctx = Arc::new(RunContext {
            fetcher: self.fetcher,
            reporter: self.reporter,
            visited: Arc::clone(&self.visited),
            tracker: self.tracker.clone(),
            frontier,
            sender,
            cancel: run_token.clone(),
            max_pages: self.max_pages,
        });

        let deadline = self.run_timeout.map(|timeout| {
            let token = run_token.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(timeout) => {
                        tracing::warn!("Run deadline of {:?} reached, cancelling", timeout);
                        token.cancel();
                    }
                    _ = token.cancelled() => {}
                }
            })
        });

        let mut workers = JoinSet::new();
        for worker_id in 0..self.workers {
            workers.spawn(worker_loop(worker_id, Arc::clone(&ctx)));
        }
        drop(ctx);

        let mut interrupted = false;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(report) => {
                    stats.merge(&report.outcomes);
                    interrupted |= report.interrupted;
                }
                Err(e) => tracing::error!("Crawl worker failed: {}", e),
            }
        }

        if let Some(deadline) = deadline {
            deadline.abort();
        }

        stats.cancelled = interrupted || stats.count(UnitOutcome::Cancelled) > 0;
        stats.urls_claimed = self.visited.len();
        stats.finish();

        tracing::info!(
            "Crawl finished: {} pages visited, {} fetch errors, {} units in {:?}{}",
            stats.pages_visited(),
            stats.fetch_errors(),
            stats.total_units(),
            stats.duration().and_then(|d| d.to_std().ok()).unwrap_or_default(),
            if stats.cancelled { " (cancelled)" } else { "" }
        );

        stats
    }
}

/// What one worker saw over the run
struct WorkerReport {
    outcomes: HashMap<UnitOutcome, u64>,

    /// The worker stopped on the token while work was still outstanding
    interrupted: bool,
}

/// Pulls units until the run completes or is cancelled
async fn worker_loop<F: Fetcher + ?Sized>(worker_id: usize, ctx: Arc<RunContext<F>>) -> WorkerReport {
    let mut outcomes = HashMap::new();
    let mut interrupted = false;

    loop {
        let unit = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => {
                interrupted = !ctx.tracker.is_complete();
                break;
            }
            _ = ctx.tracker.wait() => break,
            unit = ctx.frontier.next_unit() => match unit {
                Some(unit) => unit,
                None => break,
            },
        };

        let url = unit.url.clone();
        let outcome = process_unit(&ctx, unit).await;
        tracing::debug!("[worker {}] {} -> {}", worker_id, url, outcome);
        *outcomes.entry(outcome).or_insert(0) += 1;
    }

    tracing::trace!("Worker {} exiting", worker_id);
    WorkerReport {
        outcomes,
        interrupted,
    }
}

/// Processes a single crawl unit
///
/// The unit's ticket is released when `unit` drops at the end of this
/// function, after any children have been registered.
async fn process_unit<F: Fetcher + ?Sized>(ctx: &RunContext<F>, unit: CrawlUnit) -> UnitOutcome {
    if unit.remaining_depth == 0 {
        return UnitOutcome::DepthExhausted;
    }

    match ctx.visited.try_claim(&unit.url, ctx.max_pages) {
        ClaimOutcome::First => {}
        ClaimOutcome::AlreadyClaimed => return UnitOutcome::Duplicate,
        ClaimOutcome::LimitReached => {
            tracing::debug!("Page limit reached, skipping {}", unit.url);
            return UnitOutcome::PageLimitHit;
        }
    }

    let result = tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => Err(FetchError::Cancelled { url: unit.url.clone() }),
        result = ctx.fetcher.fetch(&unit.url) => result,
    };

    let page = match result {
        Ok(page) => page,
        Err(FetchError::Cancelled { url }) => {
            tracing::debug!("Fetch of {} abandoned: run cancelled", url);
            return UnitOutcome::Cancelled;
        }
        Err(e) => {
            tracing::warn!("{}", e);
            ctx.reporter.on_error(&e);
            return UnitOutcome::FetchFailed;
        }
    };

    ctx.reporter.on_visit(&unit.url, &page.body);

    let child_depth = unit.remaining_depth - 1;
    for link in page.links {
        ctx.sender.enqueue(link, child_depth);
    }

    UnitOutcome::Completed
}
