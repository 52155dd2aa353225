//! Run statistics
//!
//! Every crawl unit ends in exactly one [`UnitOutcome`]; a run's statistics
//! are the tally of those outcomes plus some run metadata.

use crate::state::UnitOutcome;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::io::{self, Write};

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// URL the run started from
    pub seed_url: String,

    /// Remaining depth given to the seed
    pub max_depth: u32,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run returned (set by [`CrawlStatistics::finish`])
    pub finished_at: Option<DateTime<Utc>>,

    /// Count of units by terminal outcome
    pub outcomes: HashMap<UnitOutcome, u64>,

    /// Distinct URLs claimed in the visited set
    pub urls_claimed: usize,

    /// Whether the run was cut short by cancellation or its deadline
    pub cancelled: bool,
}

impl CrawlStatistics {
    /// Starts a new, empty tally
    pub fn new(seed_url: impl Into<String>, max_depth: u32) -> Self {
        Self {
            seed_url: seed_url.into(),
            max_depth,
            started_at: Utc::now(),
            finished_at: None,
            outcomes: HashMap::new(),
            urls_claimed: 0,
            cancelled: false,
        }
    }

    /// Records one unit's outcome
    pub fn record(&mut self, outcome: UnitOutcome) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
    }

    /// Adds another tally of outcomes into this one
    pub fn merge(&mut self, outcomes: &HashMap<UnitOutcome, u64>) {
        for (outcome, count) in outcomes {
            *self.outcomes.entry(*outcome).or_insert(0) += count;
        }
    }

    /// Stamps the finish time
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Number of units that ended with `outcome`
    pub fn count(&self, outcome: UnitOutcome) -> u64 {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Number of successful visits
    pub fn pages_visited(&self) -> u64 {
        self.count(UnitOutcome::Completed)
    }

    /// Number of fetches that failed
    pub fn fetch_errors(&self) -> u64 {
        self.count(UnitOutcome::FetchFailed)
    }

    /// Number of fetches issued and finished, successful or not
    pub fn fetches_attempted(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|(outcome, _)| outcome.attempted_fetch())
            .map(|(_, count)| count)
            .sum()
    }

    /// Number of units dropped before any fetch was attempted
    pub fn units_skipped(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|(outcome, _)| outcome.is_skipped())
            .map(|(_, count)| count)
            .sum()
    }

    /// Total units processed by workers
    pub fn total_units(&self) -> u64 {
        self.outcomes.values().sum()
    }

    /// Wall-clock duration of the run, once finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|finished| finished - self.started_at)
    }
}

/// Writes statistics in a human-readable block
///
/// The binary sends this to stderr so stdout carries only crawl output.
pub fn write_statistics<W: Write>(stats: &CrawlStatistics, out: &mut W) -> io::Result<()> {
    writeln!(out, "=== Crawl Statistics ===")?;
    writeln!(out)?;

    writeln!(out, "Run:")?;
    writeln!(out, "  Seed: {}", stats.seed_url)?;
    writeln!(out, "  Max depth: {}", stats.max_depth)?;
    writeln!(out, "  Started: {}", stats.started_at.to_rfc3339())?;
    if let Some(duration) = stats.duration() {
        writeln!(out, "  Duration: {}ms", duration.num_milliseconds())?;
    }
    if stats.cancelled {
        writeln!(out, "  Cancelled before completion")?;
    }
    writeln!(out)?;

    writeln!(out, "Units by Outcome:")?;
    for outcome in UnitOutcome::all() {
        writeln!(out, "  {}: {}", outcome, stats.count(outcome))?;
    }
    writeln!(out)?;

    writeln!(out, "URLs claimed: {}", stats.urls_claimed)?;
    writeln!(
        out,
        "Fetches attempted: {} ({} units skipped)",
        stats.fetches_attempted(),
        stats.units_skipped()
    )?;
    writeln!(
        out,
        "Pages visited: {} ({} fetch errors)",
        stats.pages_visited(),
        stats.fetch_errors()
    )?;

    Ok(())
}
