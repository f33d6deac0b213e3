//! Option-chain collector
//!
//! Turns one provider fetch into a fixed set of labeled samples and keeps a
//! per-symbol `ok`/`fail` counter of fetch outcomes.
//!
//! ```text
//! collect(ctx)
//!   ├── provider.fetch(symbol)      (bounded by ctx deadline / shutdown)
//!   ├── ok   → underlying_value, then open_interest + last_price per present side
//!   ├── fail → no gauges, error logged
//!   └── scrape_count{status="ok"|"fail"} (cumulative, both statuses)
//! ```
//!
//! The only mutable state is the scrape counter. It uses atomic prometheus
//! counters, so `collect` can run concurrently on a shared collector without
//! losing increments.

use async_trait::async_trait;
use prometheus::{IntCounter, IntCounterVec, Opts};
use std::sync::Arc;
use tracing::{debug, error};

use super::context::ScrapeContext;
use super::metrics::{
    MetricDescriptor, MetricKind, MetricName, Sample, LABEL_EXPIRY_DATE, LABEL_OPTION_TYPE,
    LABEL_STATUS, LABEL_STRIKE_PRICE, LABEL_SYMBOL, STRIKE_LABELS,
};
use crate::core::{ExporterError, OptionType, ScrapeStatus};
use crate::data::{ChainEntry, OptionSide, Snapshot, SnapshotProvider};

/// Pull-based collector interface
///
/// `describe` is pure metadata and never touches the provider. `collect`
/// runs one full cycle and never fails: errors become metrics.
#[async_trait]
pub trait ScrapeCollector: Send + Sync {
    /// Every descriptor this collector can emit samples for
    fn describe(&self) -> Vec<&MetricDescriptor>;

    /// Run one collection cycle
    async fn collect(&self, ctx: &ScrapeContext) -> Vec<Sample>;
}

/// Cumulative fetch outcomes for one symbol
///
/// Both statuses exist from construction, so a status that has never been
/// observed is still reported as zero.
pub struct ScrapeCounter {
    symbol: String,
    ok: IntCounter,
    fail: IntCounter,
}

impl ScrapeCounter {
    pub fn new(namespace: &str, symbol: &str) -> Result<Self, ExporterError> {
        let counters = IntCounterVec::new(
            Opts::new(
                MetricName::ScrapeCount.suffix(),
                MetricName::ScrapeCount.help(),
            )
            .namespace(namespace),
            &[LABEL_SYMBOL, LABEL_STATUS],
        )?;

        let ok = counters.get_metric_with_label_values(&[symbol, ScrapeStatus::Ok.as_str()])?;
        let fail =
            counters.get_metric_with_label_values(&[symbol, ScrapeStatus::Fail.as_str()])?;

        Ok(Self {
            symbol: symbol.to_string(),
            ok,
            fail,
        })
    }

    fn counter(&self, status: ScrapeStatus) -> &IntCounter {
        match status {
            ScrapeStatus::Ok => &self.ok,
            ScrapeStatus::Fail => &self.fail,
        }
    }

    pub fn inc(&self, status: ScrapeStatus) {
        self.counter(status).inc();
    }

    pub fn get(&self, status: ScrapeStatus) -> u64 {
        self.counter(status).get()
    }

    /// Current value of every `(symbol, status)` series
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        ScrapeStatus::ALL.into_iter().map(move |status| {
            Sample::new(MetricName::ScrapeCount, self.get(status) as f64)
                .with_label(LABEL_SYMBOL, self.symbol.clone())
                .with_label(LABEL_STATUS, status.as_str())
        })
    }
}

/// Collector for one symbol's option chain
pub struct OptionChainCollector {
    symbol: String,
    provider: Arc<dyn SnapshotProvider>,

    // metrics
    open_interest: MetricDescriptor,
    last_price: MetricDescriptor,
    underlying_value: MetricDescriptor,
    scrape_count_desc: MetricDescriptor,
    scrape_count: ScrapeCounter,
}

impl OptionChainCollector {
    /// Build the collector and its descriptors
    ///
    /// Fails if `namespace` or `symbol` do not form valid metric names/labels.
    pub fn new(
        namespace: &str,
        symbol: impl Into<String>,
        provider: Arc<dyn SnapshotProvider>,
    ) -> Result<Self, ExporterError> {
        let symbol = symbol.into();
        let symbol_label = [(LABEL_SYMBOL, symbol.as_str())];

        let open_interest = MetricDescriptor::new(
            MetricName::OpenInterest,
            MetricKind::Gauge,
            namespace,
            &STRIKE_LABELS,
            &symbol_label,
        )?;
        let last_price = MetricDescriptor::new(
            MetricName::LastPrice,
            MetricKind::Gauge,
            namespace,
            &STRIKE_LABELS,
            &symbol_label,
        )?;
        let underlying_value = MetricDescriptor::new(
            MetricName::UnderlyingValue,
            MetricKind::Gauge,
            namespace,
            &[],
            &symbol_label,
        )?;
        let scrape_count_desc = MetricDescriptor::new(
            MetricName::ScrapeCount,
            MetricKind::Counter,
            namespace,
            &[LABEL_SYMBOL, LABEL_STATUS],
            &[],
        )?;
        let scrape_count = ScrapeCounter::new(namespace, &symbol)?;

        Ok(Self {
            symbol,
            provider,
            open_interest,
            last_price,
            underlying_value,
            scrape_count_desc,
            scrape_count,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Cumulative count of cycles that ended with `status`
    pub fn scrape_count(&self, status: ScrapeStatus) -> u64 {
        self.scrape_count.get(status)
    }

    /// Append the data samples derived from a successfully fetched snapshot
    fn push_snapshot(&self, snapshot: &Snapshot, out: &mut Vec<Sample>) {
        out.push(Sample::new(
            MetricName::UnderlyingValue,
            snapshot.underlying_value,
        ));

        for entry in &snapshot.entries {
            push_side(entry, OptionType::Put, &entry.put, out);
            push_side(entry, OptionType::Call, &entry.call, out);
        }
    }
}

/// Open interest and last price for one side, skipped for the zero-strike sentinel
///
/// `strike_price` comes from the side itself, not from the entry.
fn push_side(entry: &ChainEntry, option_type: OptionType, side: &OptionSide, out: &mut Vec<Sample>) {
    if !side.is_present() {
        return;
    }

    let strike = side.strike_price.to_string();
    for (metric, value) in [
        (MetricName::OpenInterest, side.open_interest),
        (MetricName::LastPrice, side.last_price),
    ] {
        out.push(
            Sample::new(metric, value)
                .with_label(LABEL_OPTION_TYPE, option_type.as_str())
                .with_label(LABEL_EXPIRY_DATE, entry.expiry_date.clone())
                .with_label(LABEL_STRIKE_PRICE, strike.clone()),
        );
    }
}

#[async_trait]
impl ScrapeCollector for OptionChainCollector {
    fn describe(&self) -> Vec<&MetricDescriptor> {
        vec![
            &self.open_interest,
            &self.last_price,
            &self.underlying_value,
            &self.scrape_count_desc,
        ]
    }

    async fn collect(&self, ctx: &ScrapeContext) -> Vec<Sample> {
        let mut samples = Vec::new();

        let status = match ctx.run(self.provider.fetch(&self.symbol)).await {
            Ok(snapshot) => {
                samples.reserve(1 + 2 * snapshot.present_sides() + ScrapeStatus::ALL.len());
                self.push_snapshot(&snapshot, &mut samples);
                debug!(
                    symbol = %self.symbol,
                    entries = snapshot.entries.len(),
                    samples = samples.len(),
                    "option chain collected"
                );
                ScrapeStatus::Ok
            }
            Err(e) => {
                error!(
                    symbol = %self.symbol,
                    kind = e.kind(),
                    error = %e,
                    "error in listing option chain data"
                );
                ScrapeStatus::Fail
            }
        };

        self.scrape_count.inc(status);
        samples.extend(self.scrape_count.samples());
        samples
    }
}
