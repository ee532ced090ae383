//! Stats Summary
//!
//! Read-only snapshot computed on demand from a sample set.

use clientbench_core::HeapUsage;
use clientbench_stats::SampleStats;
use serde::{Deserialize, Serialize};

/// Timing and memory summary of one sample set. Durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsSummary {
    /// Number of samples summarised
    pub iterations: usize,
    #[allow(missing_docs)]
    pub min_ms: Option<f64>,
    #[allow(missing_docs)]
    pub mean_ms: Option<f64>,
    #[allow(missing_docs)]
    pub max_ms: Option<f64>,
    /// Half-width of the 95% confidence interval
    pub margin_of_error_ms: Option<f64>,
    /// Margin of error as a percentage of the mean
    pub relative_margin_of_error: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Present when a memory probe produced readings
    pub memory: Option<MemorySummary>,
}

/// Mean heap figures of a sample set plus the pairing's pre-run baseline
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemorySummary {
    /// Mean bytes in use after each pass
    pub mean_heap_used: Option<f64>,
    /// Mean bytes held after each pass
    pub mean_heap_total: Option<f64>,
    /// Reading taken before the pairing's first pass
    pub baseline: Option<HeapUsage>,
}

impl MemorySummary {
    /// `None` when there is neither a sample nor a baseline to report
    pub fn from_samples(
        heap_used: &SampleStats,
        heap_total: &SampleStats,
        baseline: Option<HeapUsage>,
    ) -> Option<Self> {
        if heap_used.is_empty() && heap_total.is_empty() && baseline.is_none() {
            return None;
        }
        Some(Self {
            mean_heap_used: heap_used.mean(),
            mean_heap_total: heap_total.mean(),
            baseline,
        })
    }
}

impl StatsSummary {
    /// Summarise duration samples (milliseconds)
    pub fn from_samples(durations: &SampleStats, memory: Option<MemorySummary>) -> Self {
        let range = durations.range();
        Self {
            iterations: durations.count(),
            min_ms: range.map(|(min, _)| min),
            mean_ms: durations.mean(),
            max_ms: range.map(|(_, max)| max),
            margin_of_error_ms: durations.margin_of_error(),
            relative_margin_of_error: durations.relative_margin_of_error(),
            memory,
        }
    }
}
