//! Leaderboard analysis.
//!
//! Pure stages that turn fetched score records into a ranked leaderboard:
//! name resolution, ranking, summary statistics and the score distribution.

pub mod aggregator;
pub mod distribution;
pub mod ranker;
pub mod stats;

pub use aggregator::attach_names;
pub use ranker::rank;
