//! Sample Accumulator
//!
//! Append-only collection of observations with on-demand mean, range and
//! margin of error. Queries never mutate the stored observations.

use crate::outliers::{OutlierMethod, detect_outliers};

/// Two-sided 95% Student-t critical values, indexed by degrees of freedom - 1.
const T_TABLE_95: [f64; 30] = [
    12.706, 4.303, 3.182, 2.776, 2.571, 2.447, 2.365, 2.306, 2.262, 2.228, 2.201, 2.179, 2.160,
    2.145, 2.131, 2.120, 2.110, 2.101, 2.093, 2.086, 2.080, 2.074, 2.069, 2.064, 2.060, 2.056,
    2.052, 2.048, 2.045, 2.042,
];

/// Normal approximation used beyond the table.
const Z_95: f64 = 1.96;

/// Means closer to zero than this make the relative margin of error meaningless.
const MIN_RELATIVE_MEAN: f64 = 1e-12;

/// Critical value for a 95% confidence interval with `df` degrees of freedom.
///
/// Returns `None` for zero degrees of freedom.
pub fn t_critical_95(df: usize) -> Option<f64> {
    match df {
        0 => None,
        df if df <= T_TABLE_95.len() => Some(T_TABLE_95[df - 1]),
        _ => Some(Z_95),
    }
}

/// Incremental numeric sample collector
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleStats {
    samples: Vec<f64>,
    sum: f64,
}

impl SampleStats {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one observation
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.samples.push(value);
    }

    /// Number of observations appended
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// Whether nothing has been appended yet
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Observations in insertion order
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Arithmetic mean, `None` when empty
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            None
        } else {
            Some(self.sum / self.samples.len() as f64)
        }
    }

    /// `(min, max)` pair, `None` when empty
    pub fn range(&self) -> Option<(f64, f64)> {
        let first = *self.samples.first()?;
        Some(
            self.samples
                .iter()
                .fold((first, first), |(lo, hi), &x| (lo.min(x), hi.max(x))),
        )
    }

    /// Unbiased sample variance; needs at least two observations
    pub fn variance(&self) -> Option<f64> {
        let n = self.samples.len();
        if n < 2 {
            return None;
        }
        let mean = self.mean()?;
        let squares: f64 = self.samples.iter().map(|x| (x - mean).powi(2)).sum();
        Some(squares / (n - 1) as f64)
    }

    /// Sample standard deviation
    pub fn std_dev(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    /// Standard error of the mean
    pub fn standard_error(&self) -> Option<f64> {
        self.std_dev()
            .map(|sd| sd / (self.samples.len() as f64).sqrt())
    }

    /// Half-width of the 95% confidence interval around the mean
    pub fn margin_of_error(&self) -> Option<f64> {
        let critical = t_critical_95(self.samples.len().saturating_sub(1))?;
        self.standard_error().map(|sem| sem * critical)
    }

    /// Margin of error as a percentage of the mean.
    ///
    /// `None` with fewer than two observations or when the mean is zero or
    /// not finite.
    pub fn relative_margin_of_error(&self) -> Option<f64> {
        let mean = self.mean()?;
        if !mean.is_finite() || mean.abs() < MIN_RELATIVE_MEAN {
            return None;
        }
        self.margin_of_error().map(|moe| moe / mean.abs() * 100.0)
    }

    /// New accumulator holding only the samples between the 25th and 75th
    /// percentiles, both inclusive
    pub fn trim_outliers(&self) -> SampleStats {
        self.trim_outliers_with(OutlierMethod::INTERQUARTILE)
    }

    /// New accumulator holding only the samples kept by `method`
    pub fn trim_outliers_with(&self, method: OutlierMethod) -> SampleStats {
        detect_outliers(&self.samples, method)
            .cleaned_samples
            .into_iter()
            .collect()
    }
}

impl FromIterator<f64> for SampleStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = SampleStats::new();
        stats.extend(iter);
        stats
    }
}

impl Extend<f64> for SampleStats {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}
