//! Leaderboard run orchestration.
//!
//! A [`Pipeline`] drives one roster through fetch, aggregation, ranking,
//! statistics and distribution. Each run carries a [`RunContext`] owned by
//! the caller; only one run per pipeline may be in flight at a time.

use crate::analysis::{attach_names, distribution, rank, stats};
use crate::error::RankError;
use crate::fetch::{BatchFetcher, ScoreService, DEFAULT_BATCH_SIZE};
use crate::models::{Identity, Leaderboard};
use crate::roster;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Per-run state shared between the caller and the run.
#[derive(Debug, Default)]
pub struct RunContext {
    cancelled: AtomicBool,
    batches_done: AtomicUsize,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run to stop before its next batch.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub(crate) fn batch_completed(&self) {
        self.batches_done.fetch_add(1, Ordering::SeqCst);
    }

    /// Batches finished so far, successful or not.
    pub fn batches_done(&self) -> usize {
        self.batches_done.load(Ordering::SeqCst)
    }
}

/// Holds the in-flight flag for the duration of a run.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, RankError> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| RankError::RunInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Builds leaderboards from rosters against one scoring service.
pub struct Pipeline {
    service: Arc<dyn ScoreService>,
    batch_size: usize,
    show_progress: bool,
    in_flight: AtomicBool,
}

impl Pipeline {
    pub fn new(service: Arc<dyn ScoreService>) -> Self {
        Self {
            service,
            batch_size: DEFAULT_BATCH_SIZE,
            show_progress: false,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run the full pipeline for a validated roster.
    ///
    /// Batch failures do not fail the run; they are reported in
    /// [`Leaderboard::warnings`]. Fails with [`RankError::RunInProgress`]
    /// if another run is still going.
    pub async fn run(&self, roster: &[Identity], ctx: &RunContext) -> Result<Leaderboard, RankError> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let handles = roster::handles(roster);
        let outcome = BatchFetcher::new(self.service.as_ref(), self.batch_size)
            .with_progress(self.show_progress)
            .fetch_all(&handles, ctx)
            .await;

        info!(
            "Fetched {} records ({} of {} batches failed, {} completed, {} skipped)",
            outcome.records.len(),
            outcome.batches_failed(),
            outcome.batches_total,
            ctx.batches_done(),
            outcome.batches_skipped
        );

        let named = attach_names(outcome.records, roster);
        let entries = rank(named);
        let summary = stats::summarize(&entries);
        let activity = stats::activity(&entries);
        let distribution = distribution::build(&stats::sorted_valid_scores(&entries), summary.mean);

        debug!(
            "Ranked {} entries; {} scores in {} histogram bins",
            entries.len(),
            distribution.total(),
            distribution.bins.len()
        );

        Ok(Leaderboard {
            entries,
            summary,
            activity,
            distribution,
            warnings: outcome.warnings,
            batches_total: outcome.batches_total,
            batches_skipped: outcome.batches_skipped,
            handles_skipped: outcome.handles_skipped,
        })
    }
}
