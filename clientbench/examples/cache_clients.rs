//! clientbench Example Suite
//!
//! Compares two in-memory cache clients on the same key list: one backed by
//! a `HashMap`, one by a `BTreeMap`. Each pass builds a fresh client, fills
//! it during setup and measures the lookups.
//!
//! Run with:
//!   cargo run --example cache_clients
//!   RUST_LOG=clientbench=debug cargo run --example cache_clients
//!
//! A `bench.toml` in the current directory or any parent overrides the quick
//! preset and can enable history recording.

use clientbench::prelude::*;
use clientbench::{Fanout, Settings, StopReason, Subject, TracingReporter, init_tracing};
use std::collections::{BTreeMap, HashMap};
use std::hint::black_box;
use std::sync::Arc;

type Keys = Vec<String>;

// ============================================================================
// Clients
// ============================================================================

trait Cache: Client<String, Keys> {
    fn put(&mut self, key: &str, value: u64);
    fn get(&self, key: &str) -> Option<u64>;
}

/// Splits a comma-separated key list; shared by both clients
fn parse_keys(raw: &str) -> Result<Keys, BoxError> {
    let keys: Keys = raw
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect();
    if keys.is_empty() {
        return Err("no keys in example".into());
    }
    Ok(keys)
}

#[derive(Default)]
struct HashCache(HashMap<String, u64>);

#[async_trait]
impl Client<String, Keys> for HashCache {
    async fn transform_raw_example(&self, raw: &String) -> Result<Keys, BoxError> {
        parse_keys(raw)
    }
}

impl Cache for HashCache {
    fn put(&mut self, key: &str, value: u64) {
        self.0.insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<u64> {
        self.0.get(key).copied()
    }
}

#[derive(Default)]
struct TreeCache(BTreeMap<String, u64>);

#[async_trait]
impl Client<String, Keys> for TreeCache {
    async fn transform_raw_example(&self, raw: &String) -> Result<Keys, BoxError> {
        parse_keys(raw)
    }
}

impl Cache for TreeCache {
    fn put(&mut self, key: &str, value: u64) {
        self.0.insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<u64> {
        self.0.get(key).copied()
    }
}

// ============================================================================
// Benchmarks
// ============================================================================

/// Reads every key many times
struct ReadHeavy {
    cache: Box<dyn Cache>,
    example: Arc<Example<Keys>>,
    sum: u64,
}

#[async_trait]
impl Benchmark for ReadHeavy {
    async fn setup(&mut self) -> Result<(), BoxError> {
        for (i, key) in self.example.value.iter().enumerate() {
            self.cache.put(key, i as u64);
        }
        Ok(())
    }

    async fn run(&mut self) -> Result<(), BoxError> {
        self.sum = 0;
        for _ in 0..200 {
            for key in &self.example.value {
                self.sum += black_box(self.cache.get(key)).unwrap_or_default();
            }
        }
        Ok(())
    }

    async fn verify(&mut self) -> Result<(), BoxError> {
        let n = self.example.value.len() as u64;
        let expected = 200 * n * n.saturating_sub(1) / 2;
        if self.sum != expected {
            return Err(format!("sum {} != {}", self.sum, expected).into());
        }
        Ok(())
    }
}

fn keys(count: usize) -> String {
    (0..count)
        .map(|i| format!("user:{:05}", i))
        .collect::<Vec<_>>()
        .join(",")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(false);

    let example = RawExample::new("users", keys(512));
    let suite = Suite::<String, dyn Cache, Keys>::new(example)
        .client(ClientDescriptor::new("hashmap", || {
            Ok(Box::new(HashCache::default()) as Box<dyn Cache>)
        }))
        .client(ClientDescriptor::new("btreemap", || {
            Ok(Box::new(TreeCache::default()) as Box<dyn Cache>)
        }))
        .benchmark(BenchmarkDescriptor::new("read-heavy", |cache, example| {
            Ok(Box::new(ReadHeavy {
                cache,
                example,
                sum: 0,
            }) as Box<dyn Benchmark>)
        }))
        .reporter(Fanout::new().with(TracingReporter).with(|event: Event<String>| {
            if event.is_end_of(Subject::ClientBenchmark) {
                let client = event.client.map(|c| c.name).unwrap_or_default();
                match (event.failure, event.stats) {
                    (Some(failure), _) => println!("{:<10} FAILED  {}", client, failure.message),
                    (None, Some(stats)) => println!(
                        "{:<10} {:>9.4} ms  ±{:.2}%  ({} samples)",
                        client,
                        stats.mean_ms.unwrap_or_default(),
                        stats.relative_margin_of_error.unwrap_or_default(),
                        stats.iterations
                    ),
                    (None, None) => {}
                }
            } else if event.is_end_of(Subject::ClientBenchmarkPhase)
                && event.stop_reason == Some(StopReason::MaxDurationExceeded)
            {
                println!("  (duration cap reached before convergence)");
            }
        }));

    let suite = Settings::discover()?.apply(suite)?;
    let outcome = suite.spawn().finished().await?;

    println!(
        "{} pairings, {} failed{}",
        outcome.pairings,
        outcome.failed_pairings,
        if outcome.canceled { ", canceled" } else { "" }
    );
    Ok(())
}
