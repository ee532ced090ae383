//! Benchmark Executor
//!
//! Runs a suite and reports every lifecycle transition.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Suite (benchmarks × clients, raw example)
//!       │
//!       ▼
//! ┌─────────────┐
//! │    suite    │  Benchmarks in order, clients in order, cancel checks
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   pairing   │  Baseline, example transform, settle pauses, summary
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │    phase    │  VERIFY / WARMUP counts, ITERATION convergence
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │    pass     │  Fresh client + benchmark, setup → run → verify → teardown
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`suite`] - Suite builder, run loop and spawned handle
//! - [`pairing`] - One benchmark against one client
//! - [`phase`] - Phase state machine and convergence predicate
//! - [`pass`] - Single timed pass
//! - [`samples`] - Per-pairing duration and heap samples

mod pairing;
mod pass;
mod phase;
mod samples;
mod suite;

pub use pairing::{PairingOutcome, run_pairing, transform_example};
pub use pass::{PairingMeta, PassMeasurement, PassTarget, run_pass};
pub use phase::{
    PHASE_SETTLE, check_convergence, run_iteration_phase, run_verify_phase, run_warmup_phase,
};
pub use samples::SampleSet;
pub use suite::{Suite, SuiteError, SuiteHandle, SuiteOutcome};
