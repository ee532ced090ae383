//! Memory Instrumentation
//!
//! An injected, optional capability. When no probe is available the engine
//! simply omits memory figures; it never treats absence as an error.

use crate::allocator;
use serde::{Deserialize, Serialize};

/// Heap reading in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeapUsage {
    /// Bytes in use
    pub used: u64,
    /// Bytes held by the heap (at least `used`)
    pub total: u64,
}

/// Optional facility for collecting garbage and reading heap size
pub trait MemoryProbe: Send + Sync {
    /// Force a collection pass; `false` when the facility is unavailable
    fn try_force_collect(&self) -> bool;

    /// Current heap usage; `None` when the facility is unavailable
    fn try_read_heap(&self) -> Option<HeapUsage>;
}

/// Probe for environments without memory instrumentation
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMemoryProbe;

impl MemoryProbe for NoMemoryProbe {
    fn try_force_collect(&self) -> bool {
        false
    }

    fn try_read_heap(&self) -> Option<HeapUsage> {
        None
    }
}

/// Probe backed by `TrackingAllocator`.
///
/// Rust frees eagerly, so a forced collection has nothing to do and always
/// succeeds. `used` is the live byte count and `total` the peak live byte
/// count since the probe was detected.
#[derive(Debug)]
pub struct AllocatorProbe {
    _installed: (),
}

impl AllocatorProbe {
    /// Returns a probe when `TrackingAllocator` is the global allocator
    pub fn detect() -> Option<Self> {
        if !allocator::is_active() {
            return None;
        }
        allocator::reset_peak();
        Some(Self { _installed: () })
    }
}

impl MemoryProbe for AllocatorProbe {
    fn try_force_collect(&self) -> bool {
        true
    }

    fn try_read_heap(&self) -> Option<HeapUsage> {
        let used = allocator::live_bytes();
        Some(HeapUsage {
            used,
            total: allocator::peak_bytes().max(used),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_probe_is_unavailable() {
        let probe = NoMemoryProbe;
        assert!(!probe.try_force_collect());
        assert!(probe.try_read_heap().is_none());
    }

    #[test]
    fn test_allocator_probe_reads_are_consistent() {
        let probe = AllocatorProbe { _installed: () };
        assert!(probe.try_force_collect());
        let heap = probe.try_read_heap().unwrap();
        assert!(heap.total >= heap.used);
    }
}
