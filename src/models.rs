//! Data models for the leaderboard.
//!
//! This module contains the core data structures that flow through a run:
//! roster identities, score records from the scoring service, ranked
//! entries, summary statistics, the score distribution, and the report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A roster member: the handle the scoring service knows, plus a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Participant handle (platform username).
    pub handle: String,
    /// Display name from the roster.
    pub name: String,
}

impl Identity {
    pub fn new(handle: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            name: name.into(),
        }
    }
}

/// One handle's result as returned by the scoring service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Participant handle.
    pub handle: String,
    /// Whether the service resolved the handle and returned a numeric score.
    pub found: bool,
    /// Custom score. Meaningless when `found` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Active within the service's recent-activity window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Most recent accepted submission date, as reported by the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active_date: Option<String>,
}

impl ScoreRecord {
    /// Creates a found record with the given score.
    pub fn found(handle: impl Into<String>, score: f64) -> Self {
        Self {
            handle: handle.into(),
            found: true,
            score: Some(score),
            active: None,
            last_active_date: None,
        }
    }

    /// Creates a record for a handle the service could not resolve.
    pub fn not_found(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            found: false,
            score: None,
            active: None,
            last_active_date: None,
        }
    }

    /// Score of a found record, `None` otherwise.
    pub fn valid_score(&self) -> Option<f64> {
        if self.found {
            self.score
        } else {
            None
        }
    }
}

/// A score record resolved against the roster, not yet ranked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedRecord {
    #[serde(flatten)]
    pub record: ScoreRecord,
    /// Roster display name, or `"N/A"` when the handle is not on the roster.
    pub name: String,
}

/// Leaderboard position.
///
/// Serializes as a bare integer for ranked entries and as `"-"` for
/// entries the scoring service could not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    Position(usize),
    Unranked,
}

impl Rank {
    pub fn position(&self) -> Option<usize> {
        match self {
            Rank::Position(p) => Some(*p),
            Rank::Unranked => None,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Position(p) => write!(f, "{}", p),
            Rank::Unranked => write!(f, "-"),
        }
    }
}

impl Serialize for Rank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rank::Position(p) => serializer.serialize_u64(*p as u64),
            Rank::Unranked => serializer.serialize_str("-"),
        }
    }
}

/// A leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    #[serde(flatten)]
    pub record: ScoreRecord,
    pub name: String,
    pub rank: Rank,
}

/// Mean, median and top score over found entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub mean: f64,
    pub median: f64,
    pub top: f64,
}

/// How many found participants were recently active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivitySummary {
    pub active: usize,
    pub total: usize,
}

/// A fixed-width histogram bucket. Both ends are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramBin {
    pub range_start: i64,
    pub range_end: i64,
    pub count: usize,
}

impl HistogramBin {
    /// Label in `"{start}-{end}"` form.
    pub fn label(&self) -> String {
        format!("{}-{}", self.range_start, self.range_end)
    }

    /// Whether `value` falls inside `[range_start, range_end]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.range_start as f64 && value <= self.range_end as f64
    }

    /// Midpoint of the bucket.
    pub fn midpoint(&self) -> f64 {
        (self.range_start as f64 + self.range_end as f64) / 2.0
    }
}

/// A sample of the smoothed overlay curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

/// Binned score distribution.
///
/// The overlay curve is not stored; it is derived on demand with
/// [`Distribution::curve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Distribution {
    pub bins: Vec<HistogramBin>,
    /// Index into `bins` of the bucket that contains the mean.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_bin: Option<usize>,
    /// Mean the curve is centred on.
    #[serde(skip)]
    pub mean: f64,
}

impl Distribution {
    /// Total number of scores across all bins.
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// The bucket holding the mean, if any.
    pub fn mean_marker(&self) -> Option<&HistogramBin> {
        self.mean_bin.and_then(|i| self.bins.get(i))
    }
}

/// A batch the scoring service did not answer successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchWarning {
    /// 1-based batch number.
    pub batch: usize,
    pub batch_count: usize,
    /// Number of handles dropped with this batch.
    pub handles: usize,
    pub message: String,
}

impl fmt::Display for BatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Batch {} of {} failed ({} handles skipped): {}",
            self.batch, self.batch_count, self.handles, self.message
        )
    }
}

/// Everything a finished run produces, before presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaderboard {
    pub entries: Vec<RankedEntry>,
    pub summary: SummaryStats,
    pub activity: ActivitySummary,
    pub distribution: Distribution,
    pub warnings: Vec<BatchWarning>,
    pub batches_total: usize,
    /// Batches never requested because the run was cancelled.
    pub batches_skipped: usize,
    /// Handles in those batches; absent from `entries`.
    pub handles_skipped: usize,
}

impl Leaderboard {
    /// Number of ranked (found) entries.
    pub fn ranked_count(&self) -> usize {
        self.entries.iter().filter(|e| e.rank.position().is_some()).count()
    }

    /// Whether any roster handle is missing because a batch failed or was skipped.
    pub fn is_partial(&self) -> bool {
        !self.warnings.is_empty() || self.batches_skipped > 0
    }
}

/// Metadata about a leaderboard report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Roster file the run was built from.
    pub roster_path: String,
    /// Scoring service base URL.
    pub service_url: String,
    pub generated_at: DateTime<Utc>,
    /// Number of roster rows.
    pub roster_size: usize,
    pub batches_total: usize,
    pub batches_failed: usize,
    /// Batches left unrequested after cancellation.
    pub batches_skipped: usize,
    pub duration_seconds: f64,
}

/// The complete leaderboard report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub leaderboard: Leaderboard,
    /// Overlay samples; empty when disabled or when there is no score data.
    pub curve: Vec<CurvePoint>,
}
