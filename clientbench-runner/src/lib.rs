#![warn(missing_docs)]
//! clientbench Runner - Phased Execution Engine
//!
//! Executes a suite of benchmarks against a set of interchangeable clients.
//! Every pairing runs VERIFY, WARMUP and a convergence-driven ITERATION
//! phase; each lifecycle transition is reported as an `Event`.
//!
//! Work is strictly sequential on one task so that a measured `run` step
//! never shares the runtime with other benchmark work.

mod config;
mod context;
pub mod executor;

pub use config::{
    BenchFile, ConfigError, Configuration, HistorySection, Preset, RunnerSection, parse_duration,
};
pub use context::{CancelToken, RunContext};
pub use executor::{Suite, SuiteError, SuiteHandle, SuiteOutcome};
