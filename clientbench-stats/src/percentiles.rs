//! Percentile Computation
//!
//! Linear interpolation between nearest ranks. Quartiles computed here define
//! the fences used by outlier trimming.

use std::cmp::Ordering;

/// Sort samples ascending; NaN compares equal so it never panics.
pub fn sorted_copy(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Percentile of an already sorted slice.
///
/// `percentile` is expressed in percent (25.0 for the first quartile).
///
/// # Examples
///
/// ```
/// # use clientbench_stats::{percentile_of_sorted, sorted_copy};
/// let sorted = sorted_copy(&[5.0, 1.0, 3.0, 2.0, 4.0]);
/// assert_eq!(percentile_of_sorted(&sorted, 50.0), 3.0);
/// ```
pub fn percentile_of_sorted(sorted: &[f64], percentile: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (percentile / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = (lower + 1).min(n - 1);
            let fraction = rank - lower as f64;
            sorted[lower] + fraction * (sorted[upper] - sorted[lower])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        let sorted = sorted_copy(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((percentile_of_sorted(&sorted, 50.0) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_quartiles_interpolate() {
        let sorted: Vec<f64> = (1..=100).map(|x| x as f64).collect();

        assert!((percentile_of_sorted(&sorted, 25.0) - 25.75).abs() < 1e-9);
        assert!((percentile_of_sorted(&sorted, 75.0) - 75.25).abs() < 1e-9);
    }

    #[test]
    fn test_sorted_copy_orders_input() {
        let sorted = sorted_copy(&[9.0, 1.0, 5.0]);
        assert_eq!(sorted, vec![1.0, 5.0, 9.0]);
        assert!((percentile_of_sorted(&sorted, 0.0) - 1.0).abs() < f64::EPSILON);
        assert!((percentile_of_sorted(&sorted, 100.0) - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_and_empty() {
        assert!((percentile_of_sorted(&[42.0], 75.0) - 42.0).abs() < f64::EPSILON);
        assert!((percentile_of_sorted(&[], 50.0) - 0.0).abs() < f64::EPSILON);
    }
}
