//! Pass Errors

use crate::capability::BoxError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Lifecycle step in which a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Building a client or benchmark instance
    Construct,
    /// Converting the raw example
    Transform,
    /// `Benchmark::setup`
    Setup,
    /// `Benchmark::run`
    Run,
    /// `Benchmark::verify`
    Verify,
    /// `Benchmark::teardown`
    Teardown,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Construct => "construct",
            Stage::Transform => "transform",
            Stage::Setup => "setup",
            Stage::Run => "run",
            Stage::Verify => "verify",
            Stage::Teardown => "teardown",
        })
    }
}

/// Failure of a single pass or of example transformation
#[derive(Debug, Error)]
pub enum PassError {
    /// Client factory returned an error
    #[error("failed to construct client: {0}")]
    ClientConstruction(#[source] BoxError),

    /// Benchmark factory returned an error
    #[error("failed to construct benchmark: {0}")]
    BenchmarkConstruction(#[source] BoxError),

    /// A raw example or one of its partials could not be converted
    #[error("failed to transform example '{example}': {source}")]
    Transform {
        /// Name of the example that failed
        example: String,
        /// Client error
        #[source]
        source: BoxError,
    },

    /// `Benchmark::setup` failed
    #[error("setup failed: {0}")]
    Setup(#[source] BoxError),

    /// `Benchmark::run` failed
    #[error("run failed: {0}")]
    Run(#[source] BoxError),

    /// `Benchmark::verify` failed
    #[error("verification failed: {0}")]
    Verify(#[source] BoxError),

    /// `Benchmark::teardown` failed
    #[error("teardown failed: {0}")]
    Teardown(#[source] BoxError),
}

impl PassError {
    /// Lifecycle step this error belongs to
    pub fn stage(&self) -> Stage {
        match self {
            PassError::ClientConstruction(_) | PassError::BenchmarkConstruction(_) => {
                Stage::Construct
            }
            PassError::Transform { .. } => Stage::Transform,
            PassError::Setup(_) => Stage::Setup,
            PassError::Run(_) => Stage::Run,
            PassError::Verify(_) => Stage::Verify,
            PassError::Teardown(_) => Stage::Teardown,
        }
    }
}
