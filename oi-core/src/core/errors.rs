//! Error types for snapshot fetching and exporter setup
//!
//! Two families:
//! - [`FetchError`]: anything that can go wrong while obtaining one snapshot.
//!   The collector collapses every variant into a single `fail` outcome.
//! - [`ExporterError`]: construction and exposition failures that the
//!   process entry point has to deal with.

use std::time::Duration;
use thiserror::Error;

/// Errors produced by a [`SnapshotProvider`](crate::data::SnapshotProvider)
/// or by the scrape context wrapping it
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure (connect, TLS, body read)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Provider answered with a non-success HTTP status
    #[error("invalid http status: {0}")]
    Status(u16),

    /// Payload could not be decoded into an option chain
    #[error("failed to decode option chain: {0}")]
    Decode(#[from] serde_json::Error),

    /// Fetch did not complete before the scrape deadline
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),

    /// Fetch was abandoned because the process is shutting down
    #[error("fetch cancelled")]
    Cancelled,

    /// Provider-specific failure that fits none of the above
    #[error("provider error: {0}")]
    Provider(String),
}

impl FetchError {
    /// Short, low-cardinality tag for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Request(_) => "request",
            FetchError::Status(_) => "status",
            FetchError::Decode(_) => "decode",
            FetchError::Timeout(_) => "timeout",
            FetchError::Cancelled => "cancelled",
            FetchError::Provider(_) => "provider",
        }
    }
}

/// Errors raised while building or exposing collectors
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Metric descriptor rejected by the prometheus crate (bad name, bad label)
    #[error("invalid metric descriptor: {0}")]
    Metrics(#[from] prometheus::Error),

    /// A collector with the same metric name and constant labels already exists
    #[error("duplicate collector for {0}")]
    DuplicateCollector(String),

    /// Text exposition failed
    #[error("failed to encode metrics: {0}")]
    Encode(String),

    /// HTTP client for the provider could not be built
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    /// Socket level failure in the metrics server
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
