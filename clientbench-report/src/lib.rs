#![warn(missing_docs)]
//! clientbench Report - Events, Reporters and History
//!
//! Everything the engine hands to the outside world:
//! - A flat stream of self-describing `Event`s
//! - The `Reporter` sink contract with tracing, JSON-lines and fan-out sinks
//! - `StatsSummary` snapshots derived from sample sets
//! - An append-only JSON history store for cross-run charting

mod event;
mod history;
mod reporter;
mod summary;

pub use event::{Event, EventType, Failure, PhaseState, StopReason, Subject, SuiteInfo};
pub use history::{History, HistoryEntry, HistoryError, JsonHistory, SummaryHook, round_ms};
pub use reporter::{Fanout, JsonLinesReporter, Reporter, TracingReporter};
pub use summary::{MemorySummary, StatsSummary};
