//! Sample Set
//!
//! Parallel accumulators for one pairing's measured passes: run durations
//! in milliseconds and, when the memory probe delivers, heap readings.

use super::pass::PassMeasurement;
use clientbench_core::{HeapUsage, duration_ms};
use clientbench_report::{MemorySummary, StatsSummary};
use clientbench_stats::SampleStats;

/// Observations gathered by the iteration phase
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    durations: SampleStats,
    heap_used: SampleStats,
    heap_total: SampleStats,
    baseline: Option<HeapUsage>,
}

impl SampleSet {
    /// Empty set tagged with the pairing's pre-run heap reading
    pub fn new(baseline: Option<HeapUsage>) -> Self {
        Self {
            baseline,
            ..Self::default()
        }
    }

    /// Append one successful pass
    pub fn record(&mut self, measurement: &PassMeasurement) {
        self.durations.push(duration_ms(measurement.duration));
        if let Some(heap) = measurement.memory {
            self.heap_used.push(heap.used as f64);
            self.heap_total.push(heap.total as f64);
        }
    }

    /// Run durations in milliseconds
    pub fn durations(&self) -> &SampleStats {
        &self.durations
    }

    /// Heap reading taken before the pairing's first pass
    pub fn baseline(&self) -> Option<HeapUsage> {
        self.baseline
    }

    /// Summary over every recorded sample
    pub fn summary(&self) -> StatsSummary {
        StatsSummary::from_samples(&self.durations, self.memory_summary())
    }

    /// Summary with duration outliers removed
    pub fn trimmed_summary(&self) -> StatsSummary {
        StatsSummary::from_samples(&self.durations.trim_outliers(), self.memory_summary())
    }

    fn memory_summary(&self) -> Option<MemorySummary> {
        MemorySummary::from_samples(&self.heap_used, &self.heap_total, self.baseline)
    }
}
