//! Outlier Detection
//!
//! IQR fences around the first and third quartile. Trimming is a reporting
//! projection only: the live sample set that drives convergence is never
//! filtered.

use crate::percentiles::{percentile_of_sorted, sorted_copy};

/// Method for outlier detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlierMethod {
    /// Keep samples inside `[Q1 - k*IQR/2, Q3 + k*IQR/2]`
    Iqr {
        /// Fence multiplier in half steps (k=0 keeps only [Q1, Q3], k=3 is Tukey's 1.5*IQR)
        k: u32,
    },
    /// Keep everything
    None,
}

impl OutlierMethod {
    /// Interquartile window `[Q1, Q3]`, both ends inclusive
    pub const INTERQUARTILE: OutlierMethod = OutlierMethod::Iqr { k: 0 };

    /// Tukey fences at 1.5 * IQR
    pub const TUKEY: OutlierMethod = OutlierMethod::Iqr { k: 3 };
}

impl Default for OutlierMethod {
    fn default() -> Self {
        OutlierMethod::INTERQUARTILE
    }
}

/// Result of outlier analysis
#[derive(Debug, Clone)]
pub struct OutlierAnalysis {
    /// Samples inside the fences, in their original order
    pub cleaned_samples: Vec<f64>,
    /// Indices of samples outside the fences
    pub outlier_indices: Vec<usize>,
    /// Number of samples below the lower fence
    pub low_outlier_count: usize,
    /// Number of samples above the upper fence
    pub high_outlier_count: usize,
    /// Lower fence (inclusive)
    pub lower_bound: f64,
    /// Upper fence (inclusive)
    pub upper_bound: f64,
    /// Detection method used
    pub method: OutlierMethod,
}

/// Classify samples against the fences of `method`.
pub fn detect_outliers(samples: &[f64], method: OutlierMethod) -> OutlierAnalysis {
    let (lower_bound, upper_bound) = match method {
        _ if samples.is_empty() => (0.0, 0.0),
        OutlierMethod::None => (f64::NEG_INFINITY, f64::INFINITY),
        OutlierMethod::Iqr { k } => {
            let sorted = sorted_copy(samples);
            let q1 = percentile_of_sorted(&sorted, 25.0);
            let q3 = percentile_of_sorted(&sorted, 75.0);
            let fence = (q3 - q1) * k as f64 * 0.5;
            (q1 - fence, q3 + fence)
        }
    };

    let mut analysis = OutlierAnalysis {
        cleaned_samples: Vec::with_capacity(samples.len()),
        outlier_indices: Vec::new(),
        low_outlier_count: 0,
        high_outlier_count: 0,
        lower_bound,
        upper_bound,
        method,
    };

    for (i, &sample) in samples.iter().enumerate() {
        if sample < lower_bound {
            analysis.outlier_indices.push(i);
            analysis.low_outlier_count += 1;
        } else if sample > upper_bound {
            analysis.outlier_indices.push(i);
            analysis.high_outlier_count += 1;
        } else {
            analysis.cleaned_samples.push(sample);
        }
    }

    analysis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tukey_keeps_regular_samples() {
        let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = detect_outliers(&samples, OutlierMethod::TUKEY);

        assert!(result.outlier_indices.is_empty());
        assert_eq!(result.cleaned_samples, samples);
    }

    #[test]
    fn test_tukey_high_outlier() {
        let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let result = detect_outliers(&samples, OutlierMethod::TUKEY);

        assert_eq!(result.high_outlier_count, 1);
        assert_eq!(result.outlier_indices, vec![5]);
        assert_eq!(result.cleaned_samples.len(), 5);
        // Q1 = 2.25, Q3 = 4.75
        assert!((result.lower_bound + 1.5).abs() < 1e-12);
        assert!((result.upper_bound - 8.5).abs() < 1e-12);
    }

    #[test]
    fn test_default_is_interquartile_window() {
        let samples: Vec<f64> = (1..=9).map(|x| x as f64).collect();
        let result = detect_outliers(&samples, OutlierMethod::default());

        // Q1 = 3, Q3 = 7, both inclusive
        assert_eq!(result.cleaned_samples, vec![3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(result.low_outlier_count, 2);
        assert_eq!(result.high_outlier_count, 2);
    }

    #[test]
    fn test_no_detection() {
        let samples = vec![1.0, 2.0, 100.0];
        let result = detect_outliers(&samples, OutlierMethod::None);

        assert!(result.outlier_indices.is_empty());
        assert_eq!(result.cleaned_samples.len(), 3);
    }

    #[test]
    fn test_empty_samples() {
        let result = detect_outliers(&[], OutlierMethod::default());

        assert!(result.cleaned_samples.is_empty());
        assert!(result.outlier_indices.is_empty());
    }
}
