//! Score fetching.
//!
//! This module provides the scoring service client and the sequential
//! batch fetcher built on top of it.

pub mod batcher;
pub mod client;
#[cfg(test)]
pub mod mock;

pub use batcher::{BatchFetcher, DEFAULT_BATCH_SIZE};
pub use client::{HttpScoreService, ScoreService};
