//! Capability Traits
//!
//! The engine is generic over these traits and never inspects concrete
//! identity. Every step is async and independently failable; failures are
//! boxed so adapters can surface any error type.

use async_trait::async_trait;

/// Error type produced by benchmark and client adapters
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// One workload bound to one client instance and one transformed example.
///
/// A fresh instance is built for every pass and dropped afterwards.
#[async_trait]
pub trait Benchmark: Send {
    /// Prepare state for `run`; not measured
    async fn setup(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    /// The measured step
    async fn run(&mut self) -> Result<(), BoxError>;

    /// Assert the outcome of `run`; only invoked during the VERIFY phase
    async fn verify(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Release resources; not measured
    async fn teardown(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// A client implementation under comparison.
///
/// `P` is the raw example payload and `E` the client-specific executable
/// example. Client-specific operations used by benchmarks live on the
/// caller's own trait, which names `Client<P, E>` as a supertrait.
#[async_trait]
pub trait Client<P, E>: Send + Sync {
    /// Convert one raw payload into this client's executable form
    async fn transform_raw_example(&self, raw: &P) -> Result<E, BoxError>;
}
