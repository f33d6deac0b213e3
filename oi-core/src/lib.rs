//! OI Core - Option-chain open interest exporter for Prometheus
//!
//! Periodically scraped by Prometheus, the exporter fetches the NSE option
//! chain for each configured symbol and publishes open interest, last price
//! and underlying value as gauges, plus a per-symbol scrape outcome counter.
//!
//! ## Architecture
//! - **Pull-based**: every scrape runs one fresh provider fetch per symbol,
//!   nothing is cached between scrapes
//! - **Fail closed**: a failed fetch publishes no gauges, only an incremented
//!   `scrape_count{status="fail"}`
//! - **Concurrent scrapes**: collectors are shared across connections; the
//!   outcome counter is the only mutable state and is atomic
//!
//! ## Core Modules
//! - `data`: Snapshot model, `SnapshotProvider` trait, NSE HTTP client
//! - `monitoring`: Collector, descriptors/samples, registry, HTTP server
//! - `core`: Error types and label enums
//! - `config`: Layered configuration (file + environment)
//! - `utils`: Logger initialization
//! - `testing`: Scripted provider and snapshot builders

pub mod config;
pub mod core;
pub mod data;
pub mod monitoring;
pub mod testing;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{ExporterError, FetchError, OptionType, ScrapeStatus};
pub use data::{ChainEntry, NseClient, OptionSide, Snapshot, SnapshotProvider};
pub use monitoring::{
    CollectorRegistry, MetricsServer, MetricsServerConfig, OptionChainCollector, Sample,
    ScrapeCollector, ScrapeContext,
};

// Re-export error types
pub use anyhow::{Error, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::core::{ExporterError, FetchError, OptionType, ScrapeStatus};
    pub use crate::data::{ChainEntry, OptionSide, Snapshot, SnapshotProvider};
    pub use crate::monitoring::{
        CollectorRegistry, MetricName, OptionChainCollector, Sample, ScrapeCollector,
        ScrapeContext,
    };
    pub use crate::{Error, Result};
}
