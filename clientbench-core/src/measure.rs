//! Monotonic Timing
//!
//! Built on `tokio::time::Instant` so measurements follow the runtime clock,
//! including a paused clock under test.

use std::time::Duration;
use tokio::time::Instant;

/// Timer for measuring one lifecycle step or a whole phase
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer
    #[inline(always)]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time elapsed since `start`
    #[inline(always)]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time elapsed since `start`, in fractional milliseconds
    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        duration_ms(self.elapsed())
    }
}

/// Fractional milliseconds of a duration
pub fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1_000.0
}
