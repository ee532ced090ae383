//! Single Pass
//!
//! One pass builds a fresh client and a fresh benchmark, then walks
//! setup → run → (verify) → teardown. Only `run` is timed. Any step that
//! fails aborts the pass; the error is recorded on the run context and the
//! caller sees no measurement.

use crate::context::RunContext;
use clientbench_core::{
    BenchmarkDescriptor, BenchmarkMeta, ClientDescriptor, ClientMeta, Example, HeapUsage,
    MemoryProbe, PassError, Phase, Timer,
};
use clientbench_report::{Event, EventType, Subject};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a successful pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassMeasurement {
    /// Wall-clock time of the `run` step
    pub duration: Duration,
    /// Heap reading taken right after `run`, when a probe is available
    pub memory: Option<HeapUsage>,
}

/// Everything needed to instantiate one pairing's benchmark
pub struct PassTarget<'a, C: ?Sized, E> {
    /// Workload to instantiate
    pub benchmark: &'a BenchmarkDescriptor<C, E>,
    /// Client to instantiate
    pub client: &'a ClientDescriptor<C>,
    /// Example transformed for this client
    pub example: Arc<Example<E>>,
}

impl<C: ?Sized, E> PassTarget<'_, C, E> {
    /// Names of the paired benchmark and client
    pub fn meta(&self) -> PairingMeta<'_> {
        PairingMeta {
            benchmark: self.benchmark.meta(),
            client: self.client.meta(),
        }
    }
}

/// Names of the benchmark and client being paired
#[derive(Debug, Clone, Copy)]
pub struct PairingMeta<'a> {
    /// Benchmark name and description
    pub benchmark: &'a BenchmarkMeta,
    /// Client name and description
    pub client: &'a ClientMeta,
}

impl PairingMeta<'_> {
    /// Bare event about this pairing
    pub fn event<P>(self, ctx: &RunContext<P>, subject: Subject, kind: EventType) -> Event<P> {
        ctx.event(subject, kind)
            .with_benchmark(self.benchmark)
            .with_client(self.client)
    }
}

/// Run one pass for `target`.
///
/// On failure the error is recorded against `phase` and `None` is returned.
/// Control is yielded to the runtime before returning, so a cancel request
/// issued from another task is observed between passes.
pub async fn run_pass<P, C, E>(
    ctx: &mut RunContext<P>,
    target: &PassTarget<'_, C, E>,
    phase: Phase,
    verify: bool,
) -> Option<PassMeasurement>
where
    C: ?Sized,
{
    let memory = ctx.memory_probe();
    let outcome = execute(memory.as_ref(), target, verify).await;
    tokio::task::yield_now().await;

    match outcome {
        Ok(measurement) => Some(measurement),
        Err(error) => {
            ctx.record_failure(phase, &error);
            None
        }
    }
}

async fn execute<C, E>(
    memory: &dyn MemoryProbe,
    target: &PassTarget<'_, C, E>,
    verify: bool,
) -> Result<PassMeasurement, PassError>
where
    C: ?Sized,
{
    let client = target.client.create()?;
    let mut benchmark = target.benchmark.create(client, Arc::clone(&target.example))?;

    benchmark.setup().await.map_err(PassError::Setup)?;

    let instrumented = memory.try_force_collect();
    let timer = Timer::start();
    benchmark.run().await.map_err(PassError::Run)?;
    let duration = timer.elapsed();

    // Collect again so the reading reflects what `run` retained
    let heap = if instrumented {
        memory.try_force_collect();
        memory.try_read_heap()
    } else {
        None
    };

    if verify {
        benchmark.verify().await.map_err(PassError::Verify)?;
    }
    benchmark.teardown().await.map_err(PassError::Teardown)?;

    Ok(PassMeasurement {
        duration,
        memory: heap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::context::CancelToken;
    use async_trait::async_trait;
    use clientbench_core::{Benchmark, BoxError, NoMemoryProbe, RawExample, Stage};
    use clientbench_report::SuiteInfo;
    use std::sync::Mutex;

    type Journal = Arc<Mutex<Vec<&'static str>>>;

    struct Scripted {
        journal: Journal,
        fail_at: Option<&'static str>,
        run_for: Duration,
    }

    impl Scripted {
        fn step(&self, name: &'static str) -> Result<(), BoxError> {
            self.journal.lock().unwrap().push(name);
            if self.fail_at == Some(name) {
                return Err(format!("{} exploded", name).into());
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Benchmark for Scripted {
        async fn setup(&mut self) -> Result<(), BoxError> {
            self.step("setup")
        }

        async fn run(&mut self) -> Result<(), BoxError> {
            tokio::time::sleep(self.run_for).await;
            self.step("run")
        }

        async fn verify(&mut self) -> Result<(), BoxError> {
            self.step("verify")
        }

        async fn teardown(&mut self) -> Result<(), BoxError> {
            self.step("teardown")
        }
    }

    struct FixedHeap;

    impl MemoryProbe for FixedHeap {
        fn try_force_collect(&self) -> bool {
            true
        }

        fn try_read_heap(&self) -> Option<HeapUsage> {
            Some(HeapUsage {
                used: 64,
                total: 128,
            })
        }
    }

    fn context(memory: Arc<dyn MemoryProbe>) -> RunContext<()> {
        let suite = Arc::new(SuiteInfo {
            clients: Vec::new(),
            benchmarks: Vec::new(),
            example: RawExample::new("unit", ()),
        });
        RunContext::new(
            Box::new(|_: Event<()>| {}),
            Configuration::quick(),
            suite,
            CancelToken::new(),
            memory,
        )
    }

    fn descriptors(
        journal: &Journal,
        fail_at: Option<&'static str>,
    ) -> (BenchmarkDescriptor<(), ()>, ClientDescriptor<()>) {
        let journal = Arc::clone(journal);
        let benchmark = BenchmarkDescriptor::new("scripted", move |_client, _example| {
            Ok(Box::new(Scripted {
                journal: Arc::clone(&journal),
                fail_at,
                run_for: Duration::from_millis(7),
            }) as Box<dyn Benchmark>)
        });
        let client = ClientDescriptor::new("unit", || Ok(Box::new(())));
        (benchmark, client)
    }

    #[tokio::test(start_paused = true)]
    async fn test_pass_measures_run_only() {
        let journal = Journal::default();
        let (benchmark, client) = descriptors(&journal, None);
        let target = PassTarget {
            benchmark: &benchmark,
            client: &client,
            example: Arc::new(Example::new("unit", ())),
        };
        let mut ctx = context(Arc::new(NoMemoryProbe));

        let measurement = run_pass(&mut ctx, &target, Phase::Iteration, false)
            .await
            .unwrap();

        assert!(measurement.duration >= Duration::from_millis(7));
        assert!(measurement.duration < Duration::from_millis(9));
        assert!(measurement.memory.is_none());
        assert_eq!(*journal.lock().unwrap(), vec!["setup", "run", "teardown"]);
        assert!(ctx.failure().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_verify_runs_between_run_and_teardown() {
        let journal = Journal::default();
        let (benchmark, client) = descriptors(&journal, None);
        let target = PassTarget {
            benchmark: &benchmark,
            client: &client,
            example: Arc::new(Example::new("unit", ())),
        };
        let mut ctx = context(Arc::new(FixedHeap));

        let measurement = run_pass(&mut ctx, &target, Phase::Verify, true).await.unwrap();

        assert_eq!(
            *journal.lock().unwrap(),
            vec!["setup", "run", "verify", "teardown"]
        );
        assert_eq!(
            measurement.memory,
            Some(HeapUsage {
                used: 64,
                total: 128
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_step_aborts_pass() {
        let journal = Journal::default();
        let (benchmark, client) = descriptors(&journal, Some("setup"));
        let target = PassTarget {
            benchmark: &benchmark,
            client: &client,
            example: Arc::new(Example::new("unit", ())),
        };
        let mut ctx = context(Arc::new(NoMemoryProbe));

        assert!(run_pass(&mut ctx, &target, Phase::Warmup, false).await.is_none());

        assert_eq!(*journal.lock().unwrap(), vec!["setup"]);
        let failure = ctx.failure().unwrap();
        assert_eq!(failure.phase, Phase::Warmup);
        assert_eq!(failure.stage, Stage::Setup);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_verify_aborts_pass() {
        let journal = Journal::default();
        let (benchmark, client) = descriptors(&journal, Some("verify"));
        let target = PassTarget {
            benchmark: &benchmark,
            client: &client,
            example: Arc::new(Example::new("unit", ())),
        };
        let mut ctx = context(Arc::new(NoMemoryProbe));

        assert!(run_pass(&mut ctx, &target, Phase::Verify, true).await.is_none());

        assert_eq!(*journal.lock().unwrap(), vec!["setup", "run", "verify"]);
        let failure = ctx.failure().unwrap();
        assert_eq!(failure.phase, Phase::Verify);
        assert_eq!(failure.stage, Stage::Verify);
        assert_eq!(failure.message, "verification failed: verify exploded");
    }

    #[tokio::test(start_paused = true)]
    async fn test_verify_skipped_outside_verify_passes() {
        let journal = Journal::default();
        let (benchmark, client) = descriptors(&journal, Some("verify"));
        let target = PassTarget {
            benchmark: &benchmark,
            client: &client,
            example: Arc::new(Example::new("unit", ())),
        };
        let mut ctx = context(Arc::new(NoMemoryProbe));

        assert!(run_pass(&mut ctx, &target, Phase::Iteration, false).await.is_some());
        assert_eq!(*journal.lock().unwrap(), vec!["setup", "run", "teardown"]);
        assert!(ctx.failure().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_teardown_discards_measurement() {
        let journal = Journal::default();
        let (benchmark, client) = descriptors(&journal, Some("teardown"));
        let target = PassTarget {
            benchmark: &benchmark,
            client: &client,
            example: Arc::new(Example::new("unit", ())),
        };
        let mut ctx = context(Arc::new(NoMemoryProbe));

        assert!(run_pass(&mut ctx, &target, Phase::Iteration, false).await.is_none());

        assert_eq!(*journal.lock().unwrap(), vec!["setup", "run", "teardown"]);
        let failure = ctx.failure().unwrap();
        assert_eq!(failure.phase, Phase::Iteration);
        assert_eq!(failure.stage, Stage::Teardown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_construction_failure() {
        let journal = Journal::default();
        let (benchmark, _) = descriptors(&journal, None);
        let client: ClientDescriptor<()> =
            ClientDescriptor::new("broken", || Err("no connection".into()));
        let target = PassTarget {
            benchmark: &benchmark,
            client: &client,
            example: Arc::new(Example::new("unit", ())),
        };
        let mut ctx = context(Arc::new(NoMemoryProbe));

        assert!(run_pass(&mut ctx, &target, Phase::Verify, true).await.is_none());

        assert!(journal.lock().unwrap().is_empty());
        assert_eq!(ctx.failure().unwrap().stage, Stage::Construct);
    }
}
