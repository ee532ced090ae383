//! Result History
//!
//! Append-only store of per-pairing mean durations, keyed by client name, for
//! charting across runs. Recording is best-effort: `SummaryHook` never
//! reports errors back to the engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clientbench_core::{BenchmarkMeta, ClientMeta};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to read or write the history file
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Filesystem error
    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Existing file could not be parsed
    #[error("history file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Receives the mean duration of every finished pairing
#[async_trait]
pub trait SummaryHook: Send + Sync {
    /// Persist one mean; failures are handled by the hook itself
    async fn record(&self, client: &ClientMeta, benchmark: &BenchmarkMeta, mean_ms: f64);
}

/// One recorded mean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Benchmark name
    pub benchmark: String,
    /// Mean duration, rounded to three decimals
    pub mean_ms: f64,
    /// UTC time of recording
    pub recorded_at: DateTime<Utc>,
}

/// Whole history document: client name to entries in recording order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    /// Entries per client name
    #[serde(flatten)]
    pub clients: BTreeMap<String, Vec<HistoryEntry>>,
}

impl History {
    /// Entries recorded for `client`
    pub fn entries(&self, client: &str) -> &[HistoryEntry] {
        self.clients.get(client).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Round to microsecond precision
pub fn round_ms(value: f64) -> f64 {
    (value * 1_000.0).round() / 1_000.0
}

/// History stored as a single JSON file
#[derive(Debug, Clone)]
pub struct JsonHistory {
    path: PathBuf,
}

impl JsonHistory {
    /// Store backed by `path`; the file is created on first append
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole history; a missing file is an empty history
    pub async fn load(&self) -> Result<History, HistoryError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(History::default()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(History::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Read, append one rounded entry, write back
    pub async fn append(
        &self,
        client: &str,
        benchmark: &str,
        mean_ms: f64,
    ) -> Result<(), HistoryError> {
        let mut history = self.load().await?;
        history
            .clients
            .entry(client.to_string())
            .or_default()
            .push(HistoryEntry {
                benchmark: benchmark.to_string(),
                mean_ms: round_ms(mean_ms),
                recorded_at: Utc::now(),
            });

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&history)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl SummaryHook for JsonHistory {
    async fn record(&self, client: &ClientMeta, benchmark: &BenchmarkMeta, mean_ms: f64) {
        if let Err(e) = self.append(&client.name, &benchmark.name, mean_ms).await {
            tracing::warn!(
                path = %self.path.display(),
                client = %client.name,
                "failed to record history: {}",
                e
            );
        }
    }
}
