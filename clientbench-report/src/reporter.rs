//! Reporters
//!
//! A reporter is a synchronous sink invoked at every lifecycle transition.
//! It runs on the measuring task, so it must return quickly and must not
//! panic; sinks that can fail log the error and carry on.

use crate::event::{Event, EventType, Subject};
use serde::Serialize;
use std::io::Write;

/// Sink for suite events
pub trait Reporter<P>: Send {
    /// Receive one event
    fn report(&mut self, event: Event<P>);
}

impl<P, F> Reporter<P> for F
where
    F: FnMut(Event<P>) + Send,
{
    fn report(&mut self, event: Event<P>) {
        self(event)
    }
}

/// Logs every event through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl<P> Reporter<P> for TracingReporter {
    fn report(&mut self, event: Event<P>) {
        let benchmark = event.benchmark.as_ref().map(|b| b.name.as_str());
        let client = event.client.as_ref().map(|c| c.name.as_str());

        match (event.subject, event.kind) {
            (Subject::ClientBenchmarkPhase, EventType::End) if event.progress => {
                tracing::trace!(
                    benchmark,
                    client,
                    iterations = event.stats.as_ref().map(|s| s.iterations),
                    rme = event.stats.as_ref().and_then(|s| s.relative_margin_of_error),
                    "iteration"
                );
            }
            (subject, kind) => {
                if let Some(failure) = &event.failure {
                    tracing::warn!(
                        ?subject,
                        ?kind,
                        benchmark,
                        client,
                        phase = %failure.phase,
                        "{}",
                        failure.message
                    );
                } else {
                    tracing::info!(
                        ?subject,
                        ?kind,
                        benchmark,
                        client,
                        phase = event.phase.map(tracing::field::display),
                        mean_ms = event.stats.as_ref().and_then(|s| s.mean_ms),
                        canceled = event.canceled,
                        "suite event"
                    );
                }
            }
        }
    }
}

/// Writes one JSON object per event
#[derive(Debug)]
pub struct JsonLinesReporter<W> {
    writer: W,
}

impl<W: Write + Send> JsonLinesReporter<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<P: Serialize, W: Write + Send> Reporter<P> for JsonLinesReporter<W> {
    fn report(&mut self, event: Event<P>) {
        let written = serde_json::to_writer(&mut self.writer, &event)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"))
            .and_then(|()| self.writer.flush());
        if let Err(e) = written {
            tracing::warn!("failed to write event: {}", e);
        }
    }
}

/// Forwards every event to several reporters, in order
pub struct Fanout<P> {
    reporters: Vec<Box<dyn Reporter<P>>>,
}

impl<P> Fanout<P> {
    /// Empty fan-out
    pub fn new() -> Self {
        Self {
            reporters: Vec::new(),
        }
    }

    /// Add a reporter
    pub fn with(mut self, reporter: impl Reporter<P> + 'static) -> Self {
        self.reporters.push(Box::new(reporter));
        self
    }
}

impl<P> Default for Fanout<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Reporter<P> for Fanout<P> {
    fn report(&mut self, event: Event<P>) {
        if let Some((last, rest)) = self.reporters.split_last_mut() {
            for reporter in rest {
                reporter.report(event.clone());
            }
            last.report(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SuiteInfo;
    use clientbench_core::RawExample;
    use std::sync::{Arc, Mutex};

    fn suite() -> Arc<SuiteInfo<u32>> {
        Arc::new(SuiteInfo {
            clients: Vec::new(),
            benchmarks: Vec::new(),
            example: RawExample::new("n", 7),
        })
    }

    #[test]
    fn test_closure_reporter() {
        let mut seen = Vec::new();
        {
            let mut reporter = |event: Event<u32>| seen.push(event.subject);
            reporter.report(Event::new(Subject::Suite, EventType::Start, suite(), false));
        }
        assert_eq!(seen, vec![Subject::Suite]);
    }

    #[test]
    fn test_json_lines() {
        let mut reporter = JsonLinesReporter::new(Vec::new());
        reporter.report(Event::new(Subject::Suite, EventType::Start, suite(), false));
        reporter.report(Event::new(Subject::Suite, EventType::End, suite(), true));

        let output = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "START");
        assert_eq!(lines[1]["canceled"], true);
        assert_eq!(lines[1]["example"]["payload"], 7);
    }

    #[test]
    fn test_fanout_delivers_to_all() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = Arc::clone(&log);
        let second = Arc::clone(&log);

        let mut fanout = Fanout::new()
            .with(move |e: Event<u32>| first.lock().unwrap().push(("first", e.kind)))
            .with(move |e: Event<u32>| second.lock().unwrap().push(("second", e.kind)))
            .with(TracingReporter);
        fanout.report(Event::new(Subject::Suite, EventType::End, suite(), false));

        assert_eq!(
            *log.lock().unwrap(),
            vec![("first", EventType::End), ("second", EventType::End)]
        );
    }
}
