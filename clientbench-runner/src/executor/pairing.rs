//! Client-Benchmark Pairing
//!
//! Drives one benchmark against one client: a heap baseline, example
//! transformation, then VERIFY, WARMUP and ITERATION with settle pauses in
//! between. The pairing's failure slot is cleared once its END is reported,
//! so one client's failure never leaks into the next.

use super::pass::{PairingMeta, PassTarget};
use super::phase::{PHASE_SETTLE, run_iteration_phase, run_verify_phase, run_warmup_phase};
use super::samples::SampleSet;
use crate::context::RunContext;
use clientbench_core::{
    BenchmarkDescriptor, Client, ClientDescriptor, Example, HeapUsage, MemoryProbe, PassError,
    Phase, RawExample, Timer,
};
use clientbench_report::{EventType, Failure, StatsSummary, Subject};
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of one pairing, as reported on its END event
#[derive(Debug, Clone, PartialEq)]
pub struct PairingOutcome {
    /// Outlier-trimmed summary of the iteration samples
    pub stats: StatsSummary,
    /// First failure recorded for the pairing
    pub failure: Option<Failure>,
}

impl PairingOutcome {
    /// Whether a failure was recorded
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// Heap reading taken before any pass of the pairing
fn read_baseline(memory: &dyn MemoryProbe) -> Option<HeapUsage> {
    if memory.try_force_collect() {
        memory.try_read_heap()
    } else {
        None
    }
}

/// Transform `raw` and every nested partial, depth first, with one client instance
pub fn transform_example<'a, P, E, C>(
    client: &'a C,
    raw: &'a RawExample<P>,
) -> BoxFuture<'a, Result<Example<E>, PassError>>
where
    C: ?Sized + Client<P, E>,
    P: Sync,
    E: Send + 'a,
{
    Box::pin(async move {
        let value = client
            .transform_raw_example(&raw.payload)
            .await
            .map_err(|source| PassError::Transform {
                example: raw.name.clone(),
                source,
            })?;

        let mut partials = Vec::with_capacity(raw.partials.len());
        for partial in &raw.partials {
            partials.push(transform_example(client, partial).await?);
        }

        Ok(Example {
            name: raw.name.clone(),
            value,
            partials,
        })
    })
}

/// Run every phase of `benchmark` against `client`
pub async fn run_pairing<P, C, E>(
    ctx: &mut RunContext<P>,
    benchmark: &BenchmarkDescriptor<C, E>,
    client: &ClientDescriptor<C>,
) -> PairingOutcome
where
    C: ?Sized + Client<P, E>,
    P: Send + Sync,
    E: Send + Sync,
{
    let meta = PairingMeta {
        benchmark: benchmark.meta(),
        client: client.meta(),
    };
    let timer = Timer::start();

    let event = meta.event(ctx, Subject::ClientBenchmark, EventType::Start);
    ctx.emit(event);
    info!(benchmark = %meta.benchmark.name, client = %meta.client.name, "pairing started");

    let baseline = read_baseline(ctx.memory_probe().as_ref());

    let suite = Arc::clone(ctx.suite());
    let transformed = match client.create() {
        Ok(instance) => transform_example(&*instance, &suite.example).await,
        Err(e) => Err(e),
    };
    let target = match transformed {
        Ok(example) => Some(PassTarget {
            benchmark,
            client,
            example: Arc::new(example),
        }),
        Err(e) => {
            ctx.record_failure(Phase::Verify, &e);
            None
        }
    };

    run_verify_phase(ctx, meta, target.as_ref()).await;

    let mut samples = None;
    if let Some(target) = &target {
        if !ctx.should_stop() {
            tokio::time::sleep(PHASE_SETTLE).await;
            run_warmup_phase(ctx, target).await;
        }
        if !ctx.should_stop() {
            tokio::time::sleep(PHASE_SETTLE).await;
            samples = run_iteration_phase(ctx, target, baseline).await;
            tokio::time::sleep(PHASE_SETTLE).await;
        }
    }

    let stats = match &samples {
        Some(samples) => samples.trimmed_summary(),
        None => SampleSet::new(baseline).summary(),
    };
    let failure = ctx.failure().cloned();

    let event = meta
        .event(ctx, Subject::ClientBenchmark, EventType::End)
        .with_duration_ms(timer.elapsed_ms())
        .with_stats(stats.clone())
        .with_failure(failure.clone());
    ctx.emit(event);
    ctx.take_failure();

    match &failure {
        Some(failure) => warn!(
            benchmark = %meta.benchmark.name,
            client = %meta.client.name,
            phase = %failure.phase,
            "pairing failed: {}",
            failure.message
        ),
        None => info!(
            benchmark = %meta.benchmark.name,
            client = %meta.client.name,
            iterations = stats.iterations,
            mean_ms = stats.mean_ms,
            "pairing finished"
        ),
    }

    // A canceled pairing's mean covers a partial sample set
    if failure.is_none() && !ctx.is_canceled() {
        if let (Some(hook), Some(mean_ms)) = (ctx.summary_hook(), stats.mean_ms) {
            hook.record(meta.client, meta.benchmark, mean_ms).await;
        }
    }

    PairingOutcome { stats, failure }
}
