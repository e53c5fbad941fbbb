//! In-memory score service for tests.

use crate::error::FetchError;
use crate::fetch::client::{ScoreService, UserScore};
use crate::models::ScoreRecord;
use crate::pipeline::RunContext;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Answers from a fixed table; unknown handles come back not found.
#[derive(Default)]
pub struct StaticScoreService {
    records: HashMap<String, ScoreRecord>,
    failing: Vec<usize>,
    cancel_on: Option<(usize, Arc<RunContext>)>,
    calls: Mutex<Vec<usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StaticScoreService {
    pub fn new(records: Vec<ScoreRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.handle.clone(), r)).collect(),
            ..Self::default()
        }
    }

    /// Every handle found, scored 10, 20, 30, ... in order.
    pub fn scoring_all(handles: &[String]) -> Self {
        Self::new(
            handles
                .iter()
                .enumerate()
                .map(|(i, h)| ScoreRecord::found(h.clone(), ((i + 1) * 10) as f64))
                .collect(),
        )
    }

    /// Make the given 1-based calls fail.
    pub fn failing_batches(mut self, batches: &[usize]) -> Self {
        self.failing = batches.to_vec();
        self
    }

    /// Cancel `ctx` while answering the given 1-based call.
    pub fn cancelling_on(mut self, call: usize, ctx: Arc<RunContext>) -> Self {
        self.cancel_on = Some((call, ctx));
        self
    }

    /// Sizes of the batches requested so far, in call order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoreService for StaticScoreService {
    async fn fetch_batch(&self, handles: &[String]) -> Result<Vec<ScoreRecord>, FetchError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let call = {
            let mut calls = self.calls.lock().map_err(|e| FetchError::Transport(e.to_string()))?;
            calls.push(handles.len());
            calls.len()
        };

        if let Some((on, ctx)) = &self.cancel_on {
            if *on == call {
                ctx.cancel();
            }
        }

        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&call) {
            return Err(FetchError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }

        Ok(handles
            .iter()
            .map(|h| {
                self.records
                    .get(h)
                    .cloned()
                    .unwrap_or_else(|| ScoreRecord::not_found(h.clone()))
            })
            .collect())
    }

    async fn fetch_user(&self, handle: &str) -> Result<UserScore, FetchError> {
        let record = self.records.get(handle);
        Ok(UserScore {
            handle: handle.to_string(),
            score: record.and_then(ScoreRecord::valid_score),
            recent_active_date: record.and_then(|r| r.last_active_date.clone()),
        })
    }
}
