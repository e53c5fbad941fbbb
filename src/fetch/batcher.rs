//! Sequential batch fetching.
//!
//! Handles are split into contiguous batches and requested one batch at a
//! time. A failed batch is recorded as a warning and its handles are
//! dropped; it is never retried. The loop itself is a fold over batch
//! outcomes ([`FetchOutcome::absorb`]).

use crate::error::FetchError;
use crate::fetch::client::ScoreService;
use crate::models::{BatchWarning, ScoreRecord};
use crate::pipeline::RunContext;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

/// Default number of handles per request.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Split handles into contiguous batches of at most `batch_size`.
///
/// `batch_size` must be at least 1.
pub fn partition(handles: &[String], batch_size: usize) -> Vec<&[String]> {
    handles.chunks(batch_size.max(1)).collect()
}

/// Accumulated result of the batch loop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    /// Records from successful batches, in batch order.
    pub records: Vec<ScoreRecord>,
    /// One entry per failed batch.
    pub warnings: Vec<BatchWarning>,
    /// Batches the handles were split into.
    pub batches_total: usize,
    /// Batches actually requested (fewer than the total after cancellation).
    pub batches_attempted: usize,
    /// Batches never requested because the run was cancelled.
    pub batches_skipped: usize,
    /// Handles in the skipped batches.
    pub handles_skipped: usize,
}

impl FetchOutcome {
    pub fn new(batches_total: usize) -> Self {
        Self {
            batches_total,
            ..Self::default()
        }
    }

    /// Fold one batch result into the outcome.
    ///
    /// `batch` is 1-based; `handles` is the size of the batch.
    pub fn absorb(
        mut self,
        batch: usize,
        handles: usize,
        result: Result<Vec<ScoreRecord>, FetchError>,
    ) -> Self {
        self.batches_attempted += 1;
        match result {
            Ok(records) => {
                debug!("Batch {} returned {} records", batch, records.len());
                self.records.extend(records);
            }
            Err(e) => {
                warn!("Batch {} of {} failed: {}", batch, self.batches_total, e);
                self.warnings.push(BatchWarning {
                    batch,
                    batch_count: self.batches_total,
                    handles,
                    message: e.to_string(),
                });
            }
        }
        self
    }

    pub fn batches_failed(&self) -> usize {
        self.warnings.len()
    }

    /// Record the batches left unrequested after cancellation.
    pub fn skip(mut self, remaining: &[&[String]]) -> Self {
        self.batches_skipped += remaining.len();
        self.handles_skipped += remaining.iter().map(|b| b.len()).sum::<usize>();
        self
    }
}

/// Requests scores batch by batch from a [`ScoreService`].
pub struct BatchFetcher<'a> {
    service: &'a dyn ScoreService,
    batch_size: usize,
    show_progress: bool,
}

impl<'a> BatchFetcher<'a> {
    pub fn new(service: &'a dyn ScoreService, batch_size: usize) -> Self {
        Self {
            service,
            batch_size: batch_size.max(1),
            show_progress: false,
        }
    }

    /// Draw a progress bar on stderr while fetching.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Fetch every batch in order, each awaited before the next starts.
    pub async fn fetch_all(&self, handles: &[String], ctx: &RunContext) -> FetchOutcome {
        let batches = partition(handles, self.batch_size);
        let batch_count = batches.len();
        info!(
            "Fetching scores for {} handles in {} batches of up to {}",
            handles.len(),
            batch_count,
            self.batch_size
        );

        let progress = self.progress_bar(batch_count as u64);
        let mut outcome = FetchOutcome::new(batch_count);

        for (index, batch) in batches.iter().enumerate() {
            let number = index + 1;
            if ctx.is_cancelled() {
                warn!(
                    "Run cancelled; skipping batches {} to {}",
                    number, batch_count
                );
                outcome = outcome.skip(&batches[index..]);
                break;
            }

            progress.set_message(format!("batch {} of {}", number, batch_count));
            debug!("Processing batch {} of {}", number, batch_count);

            let result = self.service.fetch_batch(batch).await;
            outcome = outcome.absorb(number, batch.len(), result);

            ctx.batch_completed();
            progress.inc(1);
        }

        progress.finish_and_clear();
        outcome
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }
}
