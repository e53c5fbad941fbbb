//! Score distribution.
//!
//! Found scores are bucketed into fixed-width bins. A bell curve centred
//! on the mean is laid over the histogram: the spread is estimated by
//! standing each bin's midpoint in for all of its scores, and the curve is
//! rescaled so its peak matches the tallest bin. This is a visual guide,
//! not a density estimate.

use crate::models::{CurvePoint, Distribution, HistogramBin};
use std::f64::consts::PI;

/// Width of every histogram bin.
pub const BIN_WIDTH: i64 = 100;

/// Upper bound on the number of bins; the last bin absorbs any tail.
pub const MAX_BINS: usize = 1_000;

/// Number of overlay samples across the score range.
pub const CURVE_SAMPLES: usize = 60;

/// The overlay is only drawn over more than this many bins.
pub const MIN_CURVE_BINS: usize = 2;

/// Bucket ascending scores into bins of [`BIN_WIDTH`].
///
/// `mean` is the rounded mean from the summary statistics; it selects the
/// mean marker bin and centres the overlay curve.
pub fn build(sorted_scores: &[f64], mean: f64) -> Distribution {
    let (Some(first), Some(last)) = (sorted_scores.first(), sorted_scores.last()) else {
        return Distribution::default();
    };

    let min = first.floor() as i64;
    let max = last.floor() as i64;
    let span = i128::from(max) - i128::from(min) + 1;
    let wanted = (span + i128::from(BIN_WIDTH) - 1) / i128::from(BIN_WIDTH);
    let bin_count = usize::try_from(wanted).unwrap_or(MAX_BINS).clamp(1, MAX_BINS);

    let mut counts = vec![0usize; bin_count];
    for score in sorted_scores {
        let offset = ((score - min as f64) / BIN_WIDTH as f64).floor().max(0.0) as usize;
        counts[offset.min(bin_count - 1)] += 1;
    }

    let bins: Vec<HistogramBin> = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let range_start = min.saturating_add(i as i64 * BIN_WIDTH);
            let range_end = if i + 1 == bin_count {
                max
            } else {
                max.min(range_start.saturating_add(BIN_WIDTH - 1))
            };
            HistogramBin {
                range_start,
                range_end,
                count,
            }
        })
        .collect();

    let mean_bin = bins.iter().position(|b| b.contains(mean));

    Distribution {
        bins,
        mean_bin,
        mean,
    }
}

/// Standard deviation of the bin midpoints, each weighted by its count.
///
/// Falls back to 1 when the spread is zero.
pub fn midpoint_std_dev(bins: &[HistogramBin]) -> f64 {
    let n: usize = bins.iter().map(|b| b.count).sum();
    if n == 0 {
        return 1.0;
    }

    let n = n as f64;
    let avg = bins.iter().map(|b| b.midpoint() * b.count as f64).sum::<f64>() / n;
    let variance = bins
        .iter()
        .map(|b| b.count as f64 * (b.midpoint() - avg).powi(2))
        .sum::<f64>()
        / n;

    let std = variance.sqrt();
    if std.is_finite() && std > 0.0 {
        std
    } else {
        1.0
    }
}

fn normal_density(x: f64, mean: f64, std: f64) -> f64 {
    (1.0 / (std * (2.0 * PI).sqrt())) * (-0.5 * ((x - mean) / std).powi(2)).exp()
}

impl Distribution {
    /// Overlay curve samples, evenly spaced over the histogram range.
    ///
    /// Empty unless there are more than [`MIN_CURVE_BINS`] bins.
    pub fn curve(&self) -> Vec<CurvePoint> {
        if self.bins.len() <= MIN_CURVE_BINS {
            return Vec::new();
        }
        let (Some(first), Some(last)) = (self.bins.first(), self.bins.last()) else {
            return Vec::new();
        };

        let min = first.range_start as f64;
        let max = last.range_end as f64;
        let std = midpoint_std_dev(&self.bins);
        let max_count = self.bins.iter().map(|b| b.count).max().unwrap_or(0) as f64;

        let xs: Vec<f64> = (0..CURVE_SAMPLES)
            .map(|i| min + (max - min) * i as f64 / (CURVE_SAMPLES - 1) as f64)
            .collect();
        let densities: Vec<f64> = xs
            .iter()
            .map(|&x| normal_density(x, self.mean, std))
            .collect();

        let max_density = densities.iter().copied().fold(0.0, f64::max);
        let scale = if max_density > 0.0 {
            max_count / max_density
        } else {
            0.0
        };

        xs.into_iter()
            .zip(densities)
            .map(|(x, density)| CurvePoint {
                x,
                y: density * scale,
            })
            .collect()
    }
}
