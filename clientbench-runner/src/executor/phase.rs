//! Phase Controller
//!
//! Runs one named phase of a pairing as a sequence of single passes.
//!
//! ```text
//! NOT_STARTED ──► RUNNING ──► COMPLETED | CONVERGED | MAX_DURATION_EXCEEDED
//!                             | FAILED | CANCELED ──► ENDED
//! ```
//!
//! Every phase event carries the phase's `PhaseState`: RUNNING on START and
//! on iteration snapshots, the stopped state on the terminal END.
//!
//! VERIFY and WARMUP run a fixed number of passes. ITERATION runs until the
//! convergence predicate fires. A phase that is reached after the pairing
//! has failed, or after cancellation, is skipped and emits nothing.

use super::pass::{PairingMeta, PassTarget, run_pass};
use super::samples::SampleSet;
use crate::config::Configuration;
use crate::context::RunContext;
use clientbench_core::{HeapUsage, Phase, Timer};
use clientbench_report::{EventType, PhaseState, StatsSummary, StopReason, Subject};
use clientbench_stats::SampleStats;
use std::time::Duration;
use tracing::debug;

/// Pause between phases, excluded from every phase's duration
pub const PHASE_SETTLE: Duration = Duration::from_millis(40);

/// Decide whether the iteration phase is done after a pass.
///
/// Below `min_samples` the answer is always no. Past `max_duration` the
/// phase stops regardless of the margin of error. Otherwise it stops once
/// the relative margin of error reaches the target.
pub fn check_convergence(
    durations: &SampleStats,
    elapsed: Duration,
    config: &Configuration,
) -> Option<StopReason> {
    if durations.count() < config.min_samples {
        return None;
    }
    if elapsed > config.max_duration {
        return Some(StopReason::MaxDurationExceeded);
    }
    match durations.relative_margin_of_error() {
        Some(rme) if rme <= config.target_relative_margin_of_error => Some(StopReason::Converged),
        _ => None,
    }
}

/// Reason to stop before the next pass, failure taking precedence
fn interrupted<P>(ctx: &RunContext<P>) -> Option<StopReason> {
    if ctx.failure().is_some() {
        Some(StopReason::Failed)
    } else if ctx.is_canceled() {
        Some(StopReason::Canceled)
    } else {
        None
    }
}

/// A phase between its START and END events
struct PhaseRun<'a> {
    meta: PairingMeta<'a>,
    phase: Phase,
    timer: Timer,
    state: PhaseState,
}

impl<'a> PhaseRun<'a> {
    fn start<P>(ctx: &mut RunContext<P>, meta: PairingMeta<'a>, phase: Phase) -> Self {
        let state = PhaseState::NotStarted.start();
        let event = meta
            .event(ctx, Subject::ClientBenchmarkPhase, EventType::Start)
            .with_phase(phase)
            .with_state(state);
        ctx.emit(event);
        debug!(
            benchmark = %meta.benchmark.name,
            client = %meta.client.name,
            %phase,
            "phase started"
        );

        Self {
            meta,
            phase,
            timer: Timer::start(),
            state,
        }
    }

    fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }

    /// In-flight snapshot after a measured pass
    fn progress<P>(&self, ctx: &mut RunContext<P>, stats: StatsSummary) {
        let event = self
            .meta
            .event(ctx, Subject::ClientBenchmarkPhase, EventType::End)
            .with_phase(self.phase)
            .with_state(self.state)
            .with_duration_ms(self.timer.elapsed_ms())
            .with_stats(stats)
            .as_progress();
        ctx.emit(event);
    }

    fn finish<P>(mut self, ctx: &mut RunContext<P>, reason: StopReason, stats: Option<StatsSummary>) {
        self.state = self.state.stop(reason);
        let stopped = self.state;

        let mut event = self
            .meta
            .event(ctx, Subject::ClientBenchmarkPhase, EventType::End)
            .with_phase(self.phase)
            .with_state(stopped)
            .with_duration_ms(self.timer.elapsed_ms())
            .with_failure(ctx.failure().cloned());
        if let Some(reason) = stopped.stop_reason() {
            event = event.with_stop_reason(reason);
        }
        if let Some(stats) = stats {
            event = event.with_stats(stats);
        }
        ctx.emit(event);

        self.state = self.state.end();
        debug!(
            benchmark = %self.meta.benchmark.name,
            client = %self.meta.client.name,
            phase = %self.phase,
            ?stopped,
            state = ?self.state,
            "phase ended"
        );
    }
}

/// Run `config.verify_passes` passes with verification enabled.
///
/// `target` is `None` when the example could not be transformed; the phase
/// still reports its START and END so the failure surfaces on VERIFY.
pub async fn run_verify_phase<P, C, E>(
    ctx: &mut RunContext<P>,
    meta: PairingMeta<'_>,
    target: Option<&PassTarget<'_, C, E>>,
) where
    C: ?Sized,
{
    if ctx.is_canceled() {
        return;
    }

    let run = PhaseRun::start(ctx, meta, Phase::Verify);
    let passes = ctx.config().verify_passes;
    let reason = match target {
        Some(target) => run_counted(ctx, target, Phase::Verify, passes, true).await,
        None => interrupted(ctx).unwrap_or(StopReason::Failed),
    };
    run.finish(ctx, reason, None);
}

/// Run `config.warmups` unmeasured passes
pub async fn run_warmup_phase<P, C, E>(ctx: &mut RunContext<P>, target: &PassTarget<'_, C, E>)
where
    C: ?Sized,
{
    if ctx.should_stop() {
        return;
    }

    let run = PhaseRun::start(ctx, target.meta(), Phase::Warmup);
    let passes = ctx.config().warmups;
    let reason = run_counted(ctx, target, Phase::Warmup, passes, false).await;
    run.finish(ctx, reason, None);
}

async fn run_counted<P, C, E>(
    ctx: &mut RunContext<P>,
    target: &PassTarget<'_, C, E>,
    phase: Phase,
    passes: u32,
    verify: bool,
) -> StopReason
where
    C: ?Sized,
{
    for _ in 0..passes {
        if interrupted(ctx).is_some() {
            break;
        }
        run_pass(ctx, target, phase, verify).await;
    }
    interrupted(ctx).unwrap_or(StopReason::Completed)
}

/// Run measured passes until convergence, the duration cap, a failure or
/// cancellation. Returns the collected samples, or `None` when skipped.
pub async fn run_iteration_phase<P, C, E>(
    ctx: &mut RunContext<P>,
    target: &PassTarget<'_, C, E>,
    baseline: Option<HeapUsage>,
) -> Option<SampleSet>
where
    C: ?Sized,
{
    if ctx.should_stop() {
        return None;
    }

    let run = PhaseRun::start(ctx, target.meta(), Phase::Iteration);
    let mut samples = SampleSet::new(baseline);

    let reason = loop {
        if let Some(reason) = interrupted(ctx) {
            break reason;
        }
        let Some(measurement) = run_pass(ctx, target, Phase::Iteration, false).await else {
            continue;
        };

        samples.record(&measurement);
        run.progress(ctx, samples.summary());

        if let Some(reason) = check_convergence(samples.durations(), run.elapsed(), ctx.config()) {
            break reason;
        }
    };

    run.finish(ctx, reason, Some(samples.summary()));
    Some(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(min_samples: usize, max_ms: u64, target: f64) -> Configuration {
        Configuration {
            verify_passes: 1,
            warmups: 0,
            min_samples,
            max_duration: Duration::from_millis(max_ms),
            target_relative_margin_of_error: target,
        }
    }

    fn steady(n: usize) -> SampleStats {
        (0..n).map(|i| if i % 2 == 0 { 1.0 } else { 1.01 }).collect()
    }

    #[test]
    fn test_never_converges_below_min_samples() {
        let config = config(10, 100, 50.0);
        let durations = steady(9);

        assert!(durations.relative_margin_of_error().unwrap() < 50.0);
        assert_eq!(
            check_convergence(&durations, Duration::from_secs(60), &config),
            None
        );
    }

    #[test]
    fn test_converges_on_margin_of_error() {
        let config = config(2, 1_000, 15.0);
        assert_eq!(
            check_convergence(&steady(4), Duration::from_millis(5), &config),
            Some(StopReason::Converged)
        );
    }

    #[test]
    fn test_duration_cap_overrides_target() {
        let capped = config(2, 100, 0.0001);
        let noisy: SampleStats = [1.0, 50.0, 3.0, 90.0].into_iter().collect();

        assert_eq!(
            check_convergence(&noisy, Duration::from_millis(50), &capped),
            None
        );
        assert_eq!(
            check_convergence(&noisy, Duration::from_millis(101), &capped),
            Some(StopReason::MaxDurationExceeded)
        );
        // the cap wins even when the margin is also satisfied
        assert_eq!(
            check_convergence(&steady(4), Duration::from_millis(101), &config(2, 100, 50.0)),
            Some(StopReason::MaxDurationExceeded)
        );
    }

    #[test]
    fn test_zero_mean_waits_for_cap() {
        let config = config(2, 100, 50.0);
        let zeros: SampleStats = [0.0, 0.0, 0.0].into_iter().collect();

        assert_eq!(check_convergence(&zeros, Duration::from_millis(10), &config), None);
        assert_eq!(
            check_convergence(&zeros, Duration::from_millis(200), &config),
            Some(StopReason::MaxDurationExceeded)
        );
    }
}
