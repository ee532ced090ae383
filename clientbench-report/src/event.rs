//! Suite Events
//!
//! Every event repeats the suite's static metadata (clients, benchmarks, raw
//! example) and the current `canceled` flag, so a consumer can render any
//! single event without keeping state. The metadata is shared behind an
//! `Arc`; building an event never copies the example.

use crate::summary::StatsSummary;
use clientbench_core::{BenchmarkMeta, ClientMeta, PassError, Phase, RawExample, Stage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What an event is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Subject {
    /// The whole run
    Suite,
    /// One benchmark across all clients
    Benchmark,
    /// One benchmark against one client
    ClientBenchmark,
    /// One phase of a pairing
    ClientBenchmarkPhase,
}

/// Lifecycle transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    #[allow(missing_docs)]
    Start,
    #[allow(missing_docs)]
    End,
}

/// Why a phase stopped running passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopReason {
    /// All scheduled passes ran (VERIFY, WARMUP)
    Completed,
    /// Relative margin of error reached the target
    Converged,
    /// The iteration phase hit `max_duration`
    MaxDurationExceeded,
    /// A pass or the example transformation failed
    Failed,
    /// The suite was canceled
    Canceled,
}

/// Lifecycle of a single phase.
///
/// ```text
/// NOT_STARTED ──► RUNNING ──► COMPLETED | CONVERGED | MAX_DURATION_EXCEEDED
///                             | FAILED | CANCELED ──► ENDED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseState {
    /// Constructed, no START reported yet
    NotStarted,
    /// START reported, passes may run
    Running,
    /// Every scheduled pass ran
    Completed,
    /// Relative margin of error reached the target
    Converged,
    /// Duration cap reached
    MaxDurationExceeded,
    /// A failure was recorded for the pairing
    Failed,
    /// The suite was canceled
    Canceled,
    /// END reported
    Ended,
}

impl PhaseState {
    /// NOT_STARTED → RUNNING; other states are unchanged
    pub fn start(self) -> Self {
        match self {
            PhaseState::NotStarted => PhaseState::Running,
            other => other,
        }
    }

    /// RUNNING → the state matching `reason`; other states are unchanged
    pub fn stop(self, reason: StopReason) -> Self {
        match self {
            PhaseState::Running => reason.into(),
            other => other,
        }
    }

    /// Any stopped state → ENDED; other states are unchanged
    pub fn end(self) -> Self {
        if self.stop_reason().is_some() {
            PhaseState::Ended
        } else {
            self
        }
    }

    /// Why the phase stopped, for the stopped states
    pub fn stop_reason(self) -> Option<StopReason> {
        match self {
            PhaseState::Completed => Some(StopReason::Completed),
            PhaseState::Converged => Some(StopReason::Converged),
            PhaseState::MaxDurationExceeded => Some(StopReason::MaxDurationExceeded),
            PhaseState::Failed => Some(StopReason::Failed),
            PhaseState::Canceled => Some(StopReason::Canceled),
            PhaseState::NotStarted | PhaseState::Running | PhaseState::Ended => None,
        }
    }
}

impl From<StopReason> for PhaseState {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::Completed => PhaseState::Completed,
            StopReason::Converged => PhaseState::Converged,
            StopReason::MaxDurationExceeded => PhaseState::MaxDurationExceeded,
            StopReason::Failed => PhaseState::Failed,
            StopReason::Canceled => PhaseState::Canceled,
        }
    }
}

/// Failure recorded for a pairing, tagged with the phase it happened in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Phase the pairing was in
    pub phase: Phase,
    /// Lifecycle step that failed
    pub stage: Stage,
    /// Rendered error chain head
    pub message: String,
}

impl Failure {
    /// Capture `error` as raised during `phase`
    pub fn new(phase: Phase, error: &PassError) -> Self {
        Self {
            phase,
            stage: error.stage(),
            message: error.to_string(),
        }
    }
}

/// Static metadata of a suite run
#[derive(Debug, Serialize)]
pub struct SuiteInfo<P> {
    /// Clients in run order
    pub clients: Vec<ClientMeta>,
    /// Benchmarks in run order
    pub benchmarks: Vec<BenchmarkMeta>,
    /// Raw example shared by every pairing
    pub example: RawExample<P>,
}

/// One lifecycle transition of the suite
#[derive(Debug, Serialize)]
#[serde(bound(serialize = "P: Serialize"))]
#[allow(missing_docs)]
pub struct Event<P> {
    pub subject: Subject,
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(flatten)]
    pub suite: Arc<SuiteInfo<P>>,
    pub canceled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<BenchmarkMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    /// Phase state when the event was emitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<PhaseState>,
    /// Set on the per-pass END snapshots of the iteration phase
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub progress: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
}

impl<P> Event<P> {
    /// Bare event for `subject`; subject-specific fields are added with the builder methods
    pub fn new(subject: Subject, kind: EventType, suite: Arc<SuiteInfo<P>>, canceled: bool) -> Self {
        Self {
            subject,
            kind,
            suite,
            canceled,
            benchmark: None,
            client: None,
            phase: None,
            state: None,
            progress: false,
            duration_ms: None,
            stats: None,
            failure: None,
            stop_reason: None,
        }
    }

    /// Attach the benchmark being run
    pub fn with_benchmark(mut self, benchmark: &BenchmarkMeta) -> Self {
        self.benchmark = Some(benchmark.clone());
        self
    }

    /// Attach the client being run
    pub fn with_client(mut self, client: &ClientMeta) -> Self {
        self.client = Some(client.clone());
        self
    }

    /// Attach the phase
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Attach the phase state
    pub fn with_state(mut self, state: PhaseState) -> Self {
        self.state = Some(state);
        self
    }

    /// Wall-clock duration of the finished scope
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Attach a stats snapshot
    pub fn with_stats(mut self, stats: StatsSummary) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Attach the pairing's failure, if any
    pub fn with_failure(mut self, failure: Option<Failure>) -> Self {
        self.failure = failure;
        self
    }

    /// Attach why a phase stopped
    pub fn with_stop_reason(mut self, reason: StopReason) -> Self {
        self.stop_reason = Some(reason);
        self
    }

    /// Mark as an in-flight snapshot rather than the terminal END
    pub fn as_progress(mut self) -> Self {
        self.progress = true;
        self
    }

    /// Whether this is the START of `subject`
    pub fn is_start_of(&self, subject: Subject) -> bool {
        self.subject == subject && self.kind == EventType::Start
    }

    /// Whether this is the terminal END of `subject`
    pub fn is_end_of(&self, subject: Subject) -> bool {
        self.subject == subject && self.kind == EventType::End && !self.progress
    }
}

impl<P> Clone for Event<P> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject,
            kind: self.kind,
            suite: Arc::clone(&self.suite),
            canceled: self.canceled,
            benchmark: self.benchmark.clone(),
            client: self.client.clone(),
            phase: self.phase,
            state: self.state,
            progress: self.progress,
            duration_ms: self.duration_ms,
            stats: self.stats.clone(),
            failure: self.failure.clone(),
            stop_reason: self.stop_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn suite() -> Arc<SuiteInfo<&'static str>> {
        Arc::new(SuiteInfo {
            clients: vec![ClientMeta {
                name: "hashmap".into(),
            }],
            benchmarks: vec![BenchmarkMeta {
                name: "read".into(),
            }],
            example: RawExample::new("users", "query { users }"),
        })
    }

    #[test]
    fn test_phase_event_shape() {
        let event = Event::new(Subject::ClientBenchmarkPhase, EventType::End, suite(), false)
            .with_benchmark(&BenchmarkMeta {
                name: "read".into(),
            })
            .with_client(&ClientMeta {
                name: "hashmap".into(),
            })
            .with_phase(Phase::Iteration)
            .with_state(PhaseState::Converged)
            .with_stop_reason(StopReason::Converged);

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["subject"], json!("CLIENT_BENCHMARK_PHASE"));
        assert_eq!(value["type"], json!("END"));
        assert_eq!(value["phase"], json!("ITERATION"));
        assert_eq!(value["stop_reason"], json!("CONVERGED"));
        assert_eq!(value["state"], json!("CONVERGED"));
        assert_eq!(value["canceled"], json!(false));
        assert_eq!(value["clients"][0]["name"], json!("hashmap"));
        assert_eq!(value["example"]["payload"], json!("query { users }"));
        assert!(value.get("progress").is_none());
        assert!(value.get("failure").is_none());
    }

    #[test]
    fn test_progress_is_not_terminal() {
        let event =
            Event::new(Subject::ClientBenchmarkPhase, EventType::End, suite(), false).as_progress();
        assert!(!event.is_end_of(Subject::ClientBenchmarkPhase));
        assert_eq!(serde_json::to_value(&event).unwrap()["progress"], json!(true));
    }

    #[test]
    fn test_failure_from_pass_error() {
        let failure = Failure::new(Phase::Verify, &PassError::Verify("mismatch".into()));
        assert_eq!(failure.stage, Stage::Verify);
        assert_eq!(failure.message, "verification failed: mismatch");

        let value = serde_json::to_value(&failure).unwrap();
        assert_eq!(value, json!({"phase": "VERIFY", "stage": "verify", "message": "verification failed: mismatch"}));
    }

    #[test]
    fn test_phase_state_transitions() {
        let state = PhaseState::NotStarted;
        assert_eq!(state.stop(StopReason::Failed), PhaseState::NotStarted);
        assert_eq!(state.end(), PhaseState::NotStarted);

        let running = state.start();
        assert_eq!(running, PhaseState::Running);
        assert_eq!(running.end(), PhaseState::Running);
        assert!(running.stop_reason().is_none());

        let stopped = running.stop(StopReason::Converged);
        assert_eq!(stopped, PhaseState::Converged);
        assert_eq!(stopped.stop_reason(), Some(StopReason::Converged));
        assert_eq!(stopped.stop(StopReason::Canceled), PhaseState::Converged);
        assert_eq!(stopped.end(), PhaseState::Ended);
        assert_eq!(PhaseState::Ended.start(), PhaseState::Ended);
        assert!(PhaseState::Ended.stop_reason().is_none());
    }

    #[test]
    fn test_clone_shares_suite() {
        let event = Event::new(Subject::Suite, EventType::Start, suite(), true);
        let copy = event.clone();
        assert!(Arc::ptr_eq(&event.suite, &copy.suite));
        assert!(copy.is_start_of(Subject::Suite));
    }
}
