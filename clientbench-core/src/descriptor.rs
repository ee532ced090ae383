//! Descriptors
//!
//! Factories handed to the engine fully constructed. They carry display
//! metadata and build a fresh instance on every call.

use crate::capability::{Benchmark, BoxError};
use crate::error::PassError;
use crate::example::Example;
use crate::{BenchmarkMeta, ClientMeta};
use std::sync::Arc;

/// Zero-argument client constructor
pub type ClientFactory<C> = dyn Fn() -> Result<Box<C>, BoxError> + Send + Sync;

/// Benchmark constructor bound to a client instance and an example
pub type BenchmarkFactory<C, E> =
    dyn Fn(Box<C>, Arc<Example<E>>) -> Result<Box<dyn Benchmark>, BoxError> + Send + Sync;

/// Describes one client implementation under comparison
pub struct ClientDescriptor<C: ?Sized> {
    meta: ClientMeta,
    factory: Arc<ClientFactory<C>>,
}

impl<C: ?Sized> ClientDescriptor<C> {
    /// Create a descriptor from a display name and a constructor
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Box<C>, BoxError> + Send + Sync + 'static,
    {
        Self {
            meta: ClientMeta { name: name.into() },
            factory: Arc::new(factory),
        }
    }

    /// Static metadata
    pub fn meta(&self) -> &ClientMeta {
        &self.meta
    }

    /// Build a fresh client instance
    pub fn create(&self) -> Result<Box<C>, PassError> {
        (self.factory)().map_err(PassError::ClientConstruction)
    }
}

impl<C: ?Sized> Clone for ClientDescriptor<C> {
    fn clone(&self) -> Self {
        Self {
            meta: self.meta.clone(),
            factory: Arc::clone(&self.factory),
        }
    }
}

/// Describes one workload, instantiable against any client of type `C`
pub struct BenchmarkDescriptor<C: ?Sized, E> {
    meta: BenchmarkMeta,
    factory: Arc<BenchmarkFactory<C, E>>,
}

impl<C: ?Sized, E> BenchmarkDescriptor<C, E> {
    /// Create a descriptor from a display name and a constructor
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(Box<C>, Arc<Example<E>>) -> Result<Box<dyn Benchmark>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            meta: BenchmarkMeta { name: name.into() },
            factory: Arc::new(factory),
        }
    }

    /// Static metadata
    pub fn meta(&self) -> &BenchmarkMeta {
        &self.meta
    }

    /// Build a fresh benchmark bound to `client` and `example`
    pub fn create(
        &self,
        client: Box<C>,
        example: Arc<Example<E>>,
    ) -> Result<Box<dyn Benchmark>, PassError> {
        (self.factory)(client, example).map_err(PassError::BenchmarkConstruction)
    }
}

impl<C: ?Sized, E> Clone for BenchmarkDescriptor<C, E> {
    fn clone(&self) -> Self {
        Self {
            meta: self.meta.clone(),
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<C: ?Sized> std::fmt::Debug for ClientDescriptor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientDescriptor")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

impl<C: ?Sized, E> std::fmt::Debug for BenchmarkDescriptor<C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkDescriptor")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}
