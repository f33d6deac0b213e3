//! Snapshot provider abstraction
//!
//! [`SnapshotProvider`] is the only seam between the collector and the
//! outside world. Implementations are stateless request/response adapters:
//! given a symbol they either return a complete [`Snapshot`] or fail. They
//! must never hand back partial data.
//!
//! Cancellation is expressed the Rust way: the caller drops the future.
//! The collector does this through [`ScrapeContext`](crate::monitoring::ScrapeContext)
//! when a scrape deadline passes or the process shuts down.
//!
//! # Example
//!
//! ```
//! use async_trait::async_trait;
//! use oi_core::core::FetchError;
//! use oi_core::data::{Snapshot, SnapshotProvider};
//!
//! struct FlatProvider;
//!
//! #[async_trait]
//! impl SnapshotProvider for FlatProvider {
//!     async fn fetch(&self, _symbol: &str) -> Result<Snapshot, FetchError> {
//!         Ok(Snapshot::new(100.0, vec![]))
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use super::Snapshot;
use crate::core::FetchError;

/// Source of option-chain snapshots
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Fetch the current option chain for `symbol`
    ///
    /// Must fail on transport errors, non-success responses and malformed
    /// payloads rather than returning a partially filled snapshot.
    async fn fetch(&self, symbol: &str) -> Result<Snapshot, FetchError>;
}

#[async_trait]
impl<P: SnapshotProvider + ?Sized> SnapshotProvider for Arc<P> {
    async fn fetch(&self, symbol: &str) -> Result<Snapshot, FetchError> {
        (**self).fetch(symbol).await
    }
}
