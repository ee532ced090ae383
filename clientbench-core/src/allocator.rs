//! Allocation Tracking
//!
//! `TrackingAllocator` wraps the system allocator and keeps process-wide
//! counters of live and peak heap bytes. Install it with
//! `#[global_allocator]` to make `AllocatorProbe` available.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

static ACTIVE: AtomicBool = AtomicBool::new(false);
static LIVE_BYTES: AtomicU64 = AtomicU64::new(0);
static PEAK_BYTES: AtomicU64 = AtomicU64::new(0);

/// Global allocator that records heap usage
pub struct TrackingAllocator;

// SAFETY: every call is forwarded unchanged to `System`; bookkeeping only
// touches atomics and never allocates.
unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            record_alloc(layout.size() as u64);
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            record_alloc(layout.size() as u64);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        record_dealloc(layout.size() as u64);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            record_dealloc(layout.size() as u64);
            record_alloc(new_size as u64);
        }
        new_ptr
    }
}

fn record_alloc(size: u64) {
    ACTIVE.store(true, Ordering::Relaxed);
    let live = LIVE_BYTES.fetch_add(size, Ordering::Relaxed) + size;
    PEAK_BYTES.fetch_max(live, Ordering::Relaxed);
}

fn record_dealloc(size: u64) {
    // Frees of memory allocated before tracking started must not wrap.
    let _ = LIVE_BYTES.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |live| {
        Some(live.saturating_sub(size))
    });
}

/// Whether `TrackingAllocator` has served at least one allocation
pub fn is_active() -> bool {
    ACTIVE.load(Ordering::Relaxed)
}

/// Bytes currently allocated through the tracking allocator
pub fn live_bytes() -> u64 {
    LIVE_BYTES.load(Ordering::Relaxed)
}

/// Highest `live_bytes` observed since the last `reset_peak`
pub fn peak_bytes() -> u64 {
    PEAK_BYTES.load(Ordering::Relaxed)
}

/// Restart the peak window at the current live size
pub fn reset_peak() {
    PEAK_BYTES.store(live_bytes(), Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    // The counters are process-wide, so the whole sequence lives in one test.
    #[test]
    fn test_bookkeeping() {
        let live_before = live_bytes();

        record_alloc(4096);
        assert_eq!(live_bytes(), live_before + 4096);
        assert!(peak_bytes() >= live_before + 4096);
        assert!(is_active());

        record_dealloc(4096);
        assert_eq!(live_bytes(), live_before);

        reset_peak();
        assert_eq!(peak_bytes(), live_bytes());

        record_dealloc(u64::MAX);
        assert_eq!(live_bytes(), 0);
    }
}
