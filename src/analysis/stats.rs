//! Summary statistics over found entries.

use crate::models::{ActivitySummary, RankedEntry, SummaryStats};

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Scores of found entries, ascending.
pub fn sorted_valid_scores(entries: &[RankedEntry]) -> Vec<f64> {
    let mut scores: Vec<f64> = entries
        .iter()
        .filter_map(|e| e.record.valid_score())
        .collect();
    scores.sort_by(f64::total_cmp);
    scores
}

/// Mean, median and top score of the found entries.
pub fn summarize(entries: &[RankedEntry]) -> SummaryStats {
    summarize_scores(&sorted_valid_scores(entries))
}

/// Summary statistics of ascending scores. All zero when empty.
pub fn summarize_scores(sorted: &[f64]) -> SummaryStats {
    let n = sorted.len();
    if n == 0 {
        return SummaryStats::default();
    }

    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };

    SummaryStats {
        mean: round2(mean),
        median: round2(median),
        top: sorted[n - 1],
    }
}

/// Recently active participants among the found entries.
pub fn activity(entries: &[RankedEntry]) -> ActivitySummary {
    let found = entries.iter().filter(|e| e.record.valid_score().is_some());
    let (active, total) = found.fold((0, 0), |(active, total), e| {
        let is_active = e.record.active.unwrap_or(false);
        (active + usize::from(is_active), total + 1)
    });

    ActivitySummary { active, total }
}
