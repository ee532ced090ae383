#![warn(missing_docs)]
//! clientbench Core - Capability Contracts
//!
//! This crate defines what the execution engine runs:
//! - `Benchmark` and `Client` capability traits (async, independently failable)
//! - Descriptors that construct fresh instances for every pass
//! - Raw and transformed examples
//! - Monotonic `Timer` for measuring the `run` step
//! - Optional memory instrumentation via `MemoryProbe` and `TrackingAllocator`

mod allocator;
mod capability;
mod descriptor;
mod error;
mod example;
mod measure;
mod memory;

pub use allocator::{TrackingAllocator, is_active, live_bytes, peak_bytes, reset_peak};
pub use capability::{Benchmark, BoxError, Client};
pub use descriptor::{BenchmarkDescriptor, BenchmarkFactory, ClientDescriptor, ClientFactory};
pub use error::{PassError, Stage};
pub use example::{Example, RawExample};
pub use measure::{Timer, duration_ms};
pub use memory::{AllocatorProbe, HeapUsage, MemoryProbe, NoMemoryProbe};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named stage of a client-benchmark pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Passes that also run the benchmark's `verify` step
    Verify,
    /// Unmeasured passes that stabilise the environment
    Warmup,
    /// Measured passes driven by the convergence predicate
    Iteration,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Verify => "VERIFY",
            Phase::Warmup => "WARMUP",
            Phase::Iteration => "ITERATION",
        })
    }
}

/// Static metadata of a benchmark, used only for reporting
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BenchmarkMeta {
    /// Display name
    pub name: String,
}

/// Static metadata of a client, used only for reporting and history keys
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientMeta {
    /// Display name
    pub name: String,
}
