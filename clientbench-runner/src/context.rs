//! Run Context
//!
//! Mutable state threaded through one suite run: the reporter, the
//! configuration, the cancel flag and the failure recorded for the pairing
//! in progress.

use crate::config::Configuration;
use clientbench_core::{MemoryProbe, PassError, Phase};
use clientbench_report::{Event, EventType, Failure, Reporter, Subject, SuiteInfo, SummaryHook};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared, sticky cancellation flag
///
/// Clones observe the same flag. Once set it is never cleared.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    canceled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Fresh, uncanceled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}

/// State of one suite run
pub struct RunContext<P> {
    reporter: Box<dyn Reporter<P>>,
    config: Configuration,
    suite: Arc<SuiteInfo<P>>,
    cancel: CancelToken,
    failure: Option<Failure>,
    memory: Arc<dyn MemoryProbe>,
    hook: Option<Arc<dyn SummaryHook>>,
}

impl<P> RunContext<P> {
    /// Build a context for one run
    pub fn new(
        reporter: Box<dyn Reporter<P>>,
        config: Configuration,
        suite: Arc<SuiteInfo<P>>,
        cancel: CancelToken,
        memory: Arc<dyn MemoryProbe>,
    ) -> Self {
        Self {
            reporter,
            config,
            suite,
            cancel,
            failure: None,
            memory,
            hook: None,
        }
    }

    /// Attach a hook receiving each successful pairing's mean
    pub fn with_summary_hook(mut self, hook: Arc<dyn SummaryHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Run configuration
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Static suite metadata shared by every event
    pub fn suite(&self) -> &Arc<SuiteInfo<P>> {
        &self.suite
    }

    /// Memory facility for passes and baselines
    pub fn memory_probe(&self) -> Arc<dyn MemoryProbe> {
        Arc::clone(&self.memory)
    }

    /// History hook, when one is attached
    pub fn summary_hook(&self) -> Option<Arc<dyn SummaryHook>> {
        self.hook.clone()
    }

    /// Whether the suite was canceled
    pub fn is_canceled(&self) -> bool {
        self.cancel.is_canceled()
    }

    /// Failure recorded for the current pairing
    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    /// Whether the current pairing must stop running passes
    pub fn should_stop(&self) -> bool {
        self.is_canceled() || self.failure.is_some()
    }

    /// Record a failure for the current pairing. Only the first one is kept.
    pub fn record_failure(&mut self, phase: Phase, error: &PassError) {
        tracing::error!(%phase, stage = %error.stage(), "pass failed: {}", error);
        if self.failure.is_none() {
            self.failure = Some(Failure::new(phase, error));
        }
    }

    /// Remove the current pairing's failure so the next pairing starts clean
    pub fn take_failure(&mut self) -> Option<Failure> {
        self.failure.take()
    }

    /// Bare event carrying suite metadata and the current cancel flag
    pub fn event(&self, subject: Subject, kind: EventType) -> Event<P> {
        Event::new(subject, kind, Arc::clone(&self.suite), self.is_canceled())
    }

    /// Deliver an event to the reporter
    pub fn emit(&mut self, event: Event<P>) {
        self.reporter.report(event);
    }
}
