#![warn(missing_docs)]
//! clientbench Statistical Engine
//!
//! Provides the numeric side of a benchmark run:
//! - Incremental sample accumulation with mean, range and margin of error
//! - Relative margin of error as the convergence signal
//! - Interquartile outlier trimming for final reporting
//! - Percentile calculation by linear interpolation

mod accumulator;
mod outliers;
mod percentiles;

pub use accumulator::{SampleStats, t_critical_95};
pub use outliers::{OutlierAnalysis, OutlierMethod, detect_outliers};
pub use percentiles::{percentile_of_sorted, sorted_copy};

/// Confidence level of every reported margin of error (95%)
pub const CONFIDENCE_LEVEL: f64 = 0.95;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!((CONFIDENCE_LEVEL - 0.95).abs() < f64::EPSILON);
    }
}
