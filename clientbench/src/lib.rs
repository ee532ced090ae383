#![warn(missing_docs)]
//! # clientbench
//!
//! Compare interchangeable client implementations on the same workload.
//!
//! - **Fresh instances per pass**: every pass builds a new client and a new benchmark
//! - **Phased execution**: VERIFY checks correctness, WARMUP stabilises, ITERATION measures
//! - **Convergence**: iteration stops once the 95% relative margin of error hits a target,
//!   or when the duration cap is reached
//! - **Self-describing events**: every lifecycle transition goes to a `Reporter`
//! - **Cooperative cancellation**: `SuiteHandle::cancel` stops at the next pass boundary
//! - **Memory figures**: optional heap readings through `TrackingAllocator`
//! - **History**: per-pairing means appended to a JSON file for charting
//!
//! ## Quick Start
//!
//! ```ignore
//! use clientbench::prelude::*;
//!
//! #[async_trait]
//! trait Store: Client<String, String> {
//!     async fn get(&self, key: &str) -> Option<String>;
//! }
//!
//! let suite = Suite::<String, dyn Store, String>::new(RawExample::new("user", "alice".into()))
//!     .client(ClientDescriptor::new("memory", || Ok(Box::new(MemoryStore::default()) as Box<dyn Store>)))
//!     .benchmark(BenchmarkDescriptor::new("lookup", |client, example| {
//!         Ok(Box::new(Lookup { client, example }) as Box<dyn Benchmark>)
//!     }));
//!
//! let handle = suite.spawn();
//! let outcome = handle.finished().await?;
//! ```

pub use clientbench_core::{
    AllocatorProbe, Benchmark, BenchmarkDescriptor, BenchmarkMeta, BoxError, Client,
    ClientDescriptor, ClientMeta, Example, HeapUsage, MemoryProbe, NoMemoryProbe, PassError,
    Phase, RawExample, Stage, Timer, TrackingAllocator,
};
pub use clientbench_report::{
    Event, EventType, Failure, Fanout, History, HistoryEntry, HistoryError, JsonHistory,
    JsonLinesReporter, MemorySummary, PhaseState, Reporter, StatsSummary, StopReason, Subject,
    SuiteInfo, SummaryHook, TracingReporter,
};
pub use clientbench_runner::{
    BenchFile, CancelToken, ConfigError, Configuration, Preset, Suite, SuiteError, SuiteHandle,
    SuiteOutcome, parse_duration,
};
pub use clientbench_stats::{OutlierMethod, SampleStats};

/// Attribute for implementing the async capability traits
pub use async_trait::async_trait;

use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Benchmark, BenchmarkDescriptor, BoxError, CancelToken, Client, ClientDescriptor,
        Configuration, Event, Example, RawExample, Reporter, Suite, SuiteHandle, async_trait,
    };
}

/// Install a `tracing` subscriber filtered to this crate family.
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "clientbench=debug,clientbench_runner=debug,clientbench_report=debug"
    } else {
        "clientbench=info,clientbench_runner=info,clientbench_report=info"
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Run settings resolved from a `bench.toml`
#[derive(Debug, Clone)]
pub struct Settings {
    /// Validated run configuration
    pub config: Configuration,
    /// History store, when `[history] path` is set
    pub history: Option<Arc<JsonHistory>>,
}

impl Settings {
    /// Resolve settings from a parsed file
    pub fn from_file(file: &BenchFile) -> Result<Self, ConfigError> {
        Ok(Self {
            config: file.configuration()?,
            history: file
                .history
                .path
                .as_ref()
                .map(|path| Arc::new(JsonHistory::new(path))),
        })
    }

    /// Discover `bench.toml` from the current directory upwards, falling back
    /// to the quick preset without history
    pub fn discover() -> Result<Self, ConfigError> {
        Self::from_file(&BenchFile::discover().unwrap_or_default())
    }

    /// Apply these settings to a suite
    pub fn apply<P, C, E>(self, suite: Suite<P, C, E>) -> Result<Suite<P, C, E>, ConfigError>
    where
        C: ?Sized + Client<P, E>,
        P: Send + Sync + 'static,
        E: Send + Sync,
    {
        let suite = suite.config(self.config)?;
        Ok(match self.history {
            Some(history) => suite.summary_hook(history),
            None => suite,
        })
    }
}
