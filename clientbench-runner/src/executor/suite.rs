//! Suite Orchestration
//!
//! Runs every benchmark against every client, strictly in order:
//!
//! ```text
//! SUITE ─┬─ BENCHMARK b0 ─┬─ CLIENT_BENCHMARK (b0, c0) ── VERIFY, WARMUP, ITERATION
//!        │                └─ CLIENT_BENCHMARK (b0, c1) ── ...
//!        └─ BENCHMARK b1 ── ...
//! ```
//!
//! Cancellation is checked before each benchmark and each client. An
//! in-flight pass always completes; the remaining work is skipped and the
//! open BENCHMARK and SUITE subjects still report their END.

use super::pairing::run_pairing;
use crate::config::{ConfigError, Configuration};
use crate::context::{CancelToken, RunContext};
use clientbench_core::{
    BenchmarkDescriptor, Client, ClientDescriptor, MemoryProbe, NoMemoryProbe, RawExample, Timer,
};
use clientbench_report::{EventType, Reporter, Subject, SuiteInfo, SummaryHook, TracingReporter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Errors from awaiting a spawned suite
#[derive(Debug, Error)]
pub enum SuiteError {
    /// The run task panicked or was aborted
    #[error("suite task did not finish: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Final state of a suite run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteOutcome {
    /// Whether cancellation was requested before the run ended
    pub canceled: bool,
    /// Pairings that were started
    pub pairings: usize,
    /// Started pairings that recorded a failure
    pub failed_pairings: usize,
}

/// A benchmark suite: ordered benchmarks, ordered clients and one raw example.
///
/// `P` is the raw payload, `C` the client interface the benchmarks are
/// written against (usually a `dyn` trait) and `E` the transformed example.
pub struct Suite<P, C: ?Sized, E> {
    example: RawExample<P>,
    benchmarks: Vec<BenchmarkDescriptor<C, E>>,
    clients: Vec<ClientDescriptor<C>>,
    config: Configuration,
    reporter: Box<dyn Reporter<P>>,
    memory: Arc<dyn MemoryProbe>,
    hook: Option<Arc<dyn SummaryHook>>,
}

impl<P, C, E> Suite<P, C, E>
where
    C: ?Sized + Client<P, E>,
    P: Send + Sync + 'static,
    E: Send + Sync,
{
    /// Empty suite over `example`, with the quick preset, a tracing reporter
    /// and no memory instrumentation
    pub fn new(example: RawExample<P>) -> Self {
        Self {
            example,
            benchmarks: Vec::new(),
            clients: Vec::new(),
            config: Configuration::default(),
            reporter: Box::new(TracingReporter),
            memory: Arc::new(NoMemoryProbe),
            hook: None,
        }
    }

    /// Append a benchmark
    pub fn benchmark(mut self, benchmark: BenchmarkDescriptor<C, E>) -> Self {
        self.benchmarks.push(benchmark);
        self
    }

    /// Append several benchmarks, in order
    pub fn benchmarks(mut self, benchmarks: impl IntoIterator<Item = BenchmarkDescriptor<C, E>>) -> Self {
        self.benchmarks.extend(benchmarks);
        self
    }

    /// Append a client
    pub fn client(mut self, client: ClientDescriptor<C>) -> Self {
        self.clients.push(client);
        self
    }

    /// Append several clients, in order
    pub fn clients(mut self, clients: impl IntoIterator<Item = ClientDescriptor<C>>) -> Self {
        self.clients.extend(clients);
        self
    }

    /// Replace the configuration after validating it
    pub fn config(mut self, config: Configuration) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Replace the event sink
    pub fn reporter(mut self, reporter: impl Reporter<P> + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Replace the memory facility; `NoMemoryProbe` by default
    pub fn memory_probe(mut self, probe: Arc<dyn MemoryProbe>) -> Self {
        self.memory = probe;
        self
    }

    /// Receive the mean of every pairing that finished without failure
    pub fn summary_hook(mut self, hook: Arc<dyn SummaryHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Run to completion, observing `cancel` at benchmark, client and pass
    /// boundaries
    pub async fn run(self, cancel: CancelToken) -> SuiteOutcome {
        let Suite {
            example,
            benchmarks,
            clients,
            config,
            reporter,
            memory,
            hook,
        } = self;

        let suite = Arc::new(SuiteInfo {
            clients: clients.iter().map(|c| c.meta().clone()).collect(),
            benchmarks: benchmarks.iter().map(|b| b.meta().clone()).collect(),
            example,
        });
        let mut ctx = RunContext::new(reporter, config, suite, cancel, memory);
        if let Some(hook) = hook {
            ctx = ctx.with_summary_hook(hook);
        }

        let timer = Timer::start();
        let mut outcome = SuiteOutcome::default();

        let event = ctx.event(Subject::Suite, EventType::Start);
        ctx.emit(event);
        info!(
            benchmarks = benchmarks.len(),
            clients = clients.len(),
            "suite started"
        );

        for benchmark in &benchmarks {
            if ctx.is_canceled() {
                break;
            }

            let benchmark_timer = Timer::start();
            let event = ctx
                .event(Subject::Benchmark, EventType::Start)
                .with_benchmark(benchmark.meta());
            ctx.emit(event);

            for client in &clients {
                if ctx.is_canceled() {
                    break;
                }
                let pairing = run_pairing(&mut ctx, benchmark, client).await;
                outcome.pairings += 1;
                if pairing.is_failed() {
                    outcome.failed_pairings += 1;
                }
            }

            let event = ctx
                .event(Subject::Benchmark, EventType::End)
                .with_benchmark(benchmark.meta())
                .with_duration_ms(benchmark_timer.elapsed_ms());
            ctx.emit(event);
        }

        outcome.canceled = ctx.is_canceled();
        let event = ctx
            .event(Subject::Suite, EventType::End)
            .with_duration_ms(timer.elapsed_ms());
        ctx.emit(event);

        if outcome.canceled {
            warn!(pairings = outcome.pairings, "suite canceled");
        } else {
            info!(
                pairings = outcome.pairings,
                failed = outcome.failed_pairings,
                "suite finished"
            );
        }
        outcome
    }

    /// Start the run on the current runtime and return a handle to it
    pub fn spawn(self) -> SuiteHandle
    where
        C: 'static,
        E: 'static,
    {
        let cancel = CancelToken::new();
        let task = tokio::spawn(self.run(cancel.clone()));
        SuiteHandle { cancel, task }
    }
}

/// Handle to a spawned suite run
#[derive(Debug)]
pub struct SuiteHandle {
    cancel: CancelToken,
    task: JoinHandle<SuiteOutcome>,
}

impl SuiteHandle {
    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether cancellation was requested
    pub fn is_canceled(&self) -> bool {
        self.cancel.is_canceled()
    }

    /// Token observing the same flag, for cancelling from elsewhere
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Wait for the run to end
    pub async fn finished(self) -> Result<SuiteOutcome, SuiteError> {
        Ok(self.task.await?)
    }
}
