//! Error types.
//!
//! Run-level failures abort a run; fetch failures are isolated to a
//! single batch and downgraded to warnings by the batch fetcher.

use thiserror::Error;

/// Errors that abort a leaderboard run.
#[derive(Error, Debug)]
pub enum RankError {
    /// Roster rows are missing `name` or `username`.
    #[error("Invalid roster format: {0}")]
    InvalidRosterFormat(String),

    /// Another run on the same pipeline has not finished yet.
    #[error("A leaderboard run is already in progress")]
    RunInProgress,

    /// Roster file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Roster file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a single request to the scoring service.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to scoring service at {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("scoring service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response payload: {0}")]
    MalformedPayload(String),
}
