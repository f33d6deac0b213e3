//! Monitoring and observability module
//!
//! Provides the option-chain collector, its metric descriptors, the
//! registry that renders collectors into the Prometheus text format, and the
//! HTTP server Prometheus scrapes.

pub mod collector;
pub mod context;
pub mod metrics;
pub mod registry;
pub mod server;

pub use collector::{OptionChainCollector, ScrapeCollector, ScrapeCounter};
pub use context::ScrapeContext;
pub use metrics::{MetricDescriptor, MetricKind, MetricName, Sample};
pub use registry::{encode_families, CollectorRegistry};
pub use server::{MetricsServer, MetricsServerConfig};
