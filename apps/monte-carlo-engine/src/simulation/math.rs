//! Statistical helpers for path metrics and aggregation.

use super::constants::HUNDRED;

/// Mean of a slice, 0 when empty.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation, 0 when empty.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Nearest-rank index for `percentile` over `len` sorted values.
///
/// `floor(p / 100 * len)`, clamped to `[0, len - 1]`. `len` must be non-zero.
pub fn nearest_rank_index(percentile: f64, len: usize) -> usize {
    let raw = (percentile / HUNDRED) * len as f64;
    // `as usize` saturates negatives and NaN to 0
    (raw.floor() as usize).min(len - 1)
}

/// Nearest-rank percentile over values that are already sorted ascending.
///
/// Returns an observed value, never an interpolation. Empty input returns 0.
pub fn percentile_of_sorted(sorted: &[f64], percentile: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    sorted[nearest_rank_index(percentile, sorted.len())]
}

/// Nearest-rank percentile over an unordered collection.
///
/// The input is copied and sorted with a total order, so NaN values sort
/// last instead of poisoning the comparison.
pub fn percentile(values: &[f64], percentile: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_of_sorted(&sorted, percentile)
}
