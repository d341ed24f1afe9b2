//! Error types for the routecast library.
//!
//! This module provides strongly-typed errors for all public APIs. It follows
//! a hybrid approach:
//!
//! - **Module-specific errors** for fine-grained handling ([`ProviderError`],
//!   [`CacheError`], [`EdgeError`], [`WorkerError`])
//! - **Unified error type** ([`RoutecastError`]) for convenience when the
//!   source does not matter
//!
//! # Architecture
//!
//! - [`ProviderError`] - failures talking to the geocoding/routing providers
//! - [`CacheError`] - durable tier and store I/O, always non-fatal on the
//!   primary path
//! - [`EdgeError`] - the typed payload of the edge resolution contract
//! - [`WorkerError`] - geometry worker channel failures
//!
//! Geocoding failure is not an error at all: a name that cannot be resolved
//! yields an absent [`GeocodeResult`](crate::geocode::GeocodeResult).

mod cache;
mod edge;
mod provider;
mod worker;

pub use cache::CacheError;
pub use edge::EdgeError;
pub use provider::ProviderError;
pub use worker::WorkerError;

/// Unified error type for all routecast operations.
///
/// Module-specific error types convert automatically via `From`, so `?`
/// propagates naturally in callers that do not need to distinguish sources.
#[derive(Debug, thiserror::Error)]
pub enum RoutecastError {
    /// Error from an external provider.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from a cache tier or durable store.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Error from the edge route resolver.
    #[error("Edge error: {0}")]
    Edge(#[from] EdgeError),

    /// Error from the geometry worker.
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}
