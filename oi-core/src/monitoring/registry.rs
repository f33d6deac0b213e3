//! Collector registry and text exposition
//!
//! Holds the registered [`ScrapeCollector`]s, runs them for every scrape and
//! turns their samples into `prometheus` protobuf families that the stock
//! [`TextEncoder`] can render. Samples from different collectors that share
//! a metric name (e.g. `<ns>_scrape_count` across symbols) are merged into a
//! single family.

use prometheus::proto::{Counter, Gauge, LabelPair, Metric, MetricFamily};
use prometheus::{Encoder, TextEncoder};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{error, warn};

use super::collector::ScrapeCollector;
use super::context::ScrapeContext;
use super::metrics::{MetricDescriptor, MetricKind, Sample};
use crate::core::ExporterError;

/// Shape a metric name is pinned to by its first registration
struct FamilyShape {
    help: String,
    kind: MetricKind,
    dim_hash: u64,
}

/// Registry of pull-based collectors
#[derive(Default)]
pub struct CollectorRegistry {
    collectors: Vec<Arc<dyn ScrapeCollector>>,
    desc_ids: HashSet<u64>,
    shapes: HashMap<String, FamilyShape>,
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collector
    ///
    /// Rejects descriptors that would produce duplicate series (same name and
    /// constant labels as an existing one) and names whose help, type or
    /// label names disagree with an earlier registration. Series collisions
    /// that only show up in the data (shared families, repeated chain rows)
    /// are dropped at gather time, first one wins.
    pub fn register(&mut self, collector: Arc<dyn ScrapeCollector>) -> Result<(), ExporterError> {
        let descs = collector.describe();

        let mut new_ids = HashSet::new();
        for d in &descs {
            let desc = d.desc();
            // Families without constant labels (scrape_count) are shared
            // between collectors; their series differ by variable labels.
            let pinned = !desc.const_label_pairs.is_empty();
            if pinned && (self.desc_ids.contains(&desc.id) || !new_ids.insert(desc.id)) {
                return Err(ExporterError::DuplicateCollector(d.name().to_string()));
            }
            if let Some(shape) = self.shapes.get(d.name()) {
                if shape.help != d.help() || shape.kind != d.kind() || shape.dim_hash != desc.dim_hash {
                    return Err(ExporterError::Metrics(prometheus::Error::Msg(format!(
                        "descriptor {} is inconsistent with a previously registered one",
                        d.name()
                    ))));
                }
            }
        }

        for d in &descs {
            self.shapes
                .entry(d.name().to_string())
                .or_insert_with(|| FamilyShape {
                    help: d.help().to_string(),
                    kind: d.kind(),
                    dim_hash: d.desc().dim_hash,
                });
        }
        self.desc_ids.extend(new_ids);
        drop(descs);

        self.collectors.push(collector);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }

    /// Descriptors of every registered collector, in registration order
    pub fn describe(&self) -> Vec<&MetricDescriptor> {
        self.collectors.iter().flat_map(|c| c.describe()).collect()
    }

    /// Names of every metric family the registered collectors can emit
    pub fn metric_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.shapes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Run every collector once and build the resulting families
    ///
    /// Collectors run concurrently; each performs its own provider fetch.
    /// Families appear in the order their first sample was produced.
    pub async fn gather(&self, ctx: &ScrapeContext) -> Vec<MetricFamily> {
        let handles: Vec<_> = self
            .collectors
            .iter()
            .map(|collector| {
                let collector = collector.clone();
                let ctx = ctx.clone();
                tokio::spawn(async move { collector.collect(&ctx).await })
            })
            .collect();

        let mut families: Vec<MetricFamily> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut seen: HashSet<(usize, Vec<(String, String)>)> = HashSet::new();

        for (collector, handle) in self.collectors.iter().zip(handles) {
            let samples = match handle.await {
                Ok(samples) => samples,
                Err(e) => {
                    error!(error = %e, "collector task failed");
                    continue;
                }
            };

            let descs = collector.describe();
            for sample in samples {
                let Some(desc) = descs.iter().find(|d| d.metric() == sample.metric) else {
                    warn!(metric = ?sample.metric, "sample without descriptor dropped");
                    continue;
                };
                if sample.labels.len() != desc.variable_labels().len() {
                    warn!(
                        metric = desc.name(),
                        "sample label count does not match descriptor, dropped"
                    );
                    continue;
                }

                let idx = *index.entry(desc.name().to_string()).or_insert_with(|| {
                    families.push(new_family(desc));
                    families.len() - 1
                });
                let labels = series_labels(desc, &sample);
                if !seen.insert((idx, labels.clone())) {
                    warn!(metric = desc.name(), labels = ?labels, "duplicate series dropped");
                    continue;
                }
                families[idx].mut_metric().push(to_metric(desc.kind(), labels, sample.value));
            }
        }

        families
    }

    /// Gather and render in the Prometheus text format
    pub async fn encode_text(&self, ctx: &ScrapeContext) -> Result<String, ExporterError> {
        let families = self.gather(ctx).await;
        encode_families(&families)
    }
}

/// Render families with the stock text encoder
pub fn encode_families(families: &[MetricFamily]) -> Result<String, ExporterError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(families, &mut buffer)
        .map_err(|e| ExporterError::Encode(e.to_string()))?;

    String::from_utf8(buffer).map_err(|e| ExporterError::Encode(e.to_string()))
}

fn new_family(desc: &MetricDescriptor) -> MetricFamily {
    let mut mf = MetricFamily::default();
    mf.set_name(desc.name().to_string());
    mf.set_help(desc.help().to_string());
    mf.set_field_type(desc.kind().proto_type());
    mf
}

/// Constant and variable labels merged and sorted by name
fn series_labels(desc: &MetricDescriptor, sample: &Sample) -> Vec<(String, String)> {
    let mut labels: Vec<(String, String)> = desc
        .const_labels()
        .chain(sample.labels.iter().map(|(k, v)| (*k, v.as_str())))
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    labels.sort();
    labels
}

fn to_metric(kind: MetricKind, labels: Vec<(String, String)>, value: f64) -> Metric {
    let labels: Vec<LabelPair> = labels
        .into_iter()
        .map(|(name, label_value)| {
            let mut lp = LabelPair::default();
            lp.set_name(name);
            lp.set_value(label_value);
            lp
        })
        .collect();

    let mut m = Metric::default();
    m.set_label(labels.into());
    match kind {
        MetricKind::Gauge => {
            let mut g = Gauge::default();
            g.set_value(value);
            m.set_gauge(g);
        }
        MetricKind::Counter => {
            let mut c = Counter::default();
            c.set_value(value);
            m.set_counter(c);
        }
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Snapshot;
    use crate::monitoring::OptionChainCollector;
    use crate::testing::{scenario_snapshot, ScriptedProvider};
    use prometheus::proto::MetricType;

    fn collector(symbol: &str, provider: ScriptedProvider) -> Arc<dyn ScrapeCollector> {
        Arc::new(OptionChainCollector::new("oi_exporter", symbol, Arc::new(provider)).unwrap())
    }

    #[test]
    fn test_duplicate_symbol_rejected() {
        let mut registry = CollectorRegistry::new();
        registry
            .register(collector("NIFTY", ScriptedProvider::always_ok(Snapshot::default())))
            .unwrap();

        let err = registry
            .register(collector("NIFTY", ScriptedProvider::always_ok(Snapshot::default())))
            .unwrap_err();
        assert!(matches!(err, ExporterError::DuplicateCollector(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_symbols_accepted() {
        let mut registry = CollectorRegistry::new();
        registry
            .register(collector("NIFTY", ScriptedProvider::always_ok(Snapshot::default())))
            .unwrap();
        registry
            .register(collector("BANKNIFTY", ScriptedProvider::always_ok(Snapshot::default())))
            .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.metric_names().len(), 4);
        assert_eq!(registry.describe().len(), 8);
    }

    #[tokio::test]
    async fn test_gather_families() {
        let mut registry = CollectorRegistry::new();
        registry
            .register(collector("BANKNIFTY", ScriptedProvider::always_ok(scenario_snapshot())))
            .unwrap();

        let families = registry.gather(&ScrapeContext::background()).await;
        let names: Vec<_> = families.iter().map(|f| f.get_name()).collect();
        assert_eq!(
            names,
            vec![
                "oi_exporter_underlying_value",
                "oi_exporter_open_interest",
                "oi_exporter_last_price",
                "oi_exporter_scrape_count",
            ]
        );

        let oi = &families[1];
        assert_eq!(oi.get_field_type(), MetricType::GAUGE);
        assert_eq!(oi.get_metric().len(), 2);

        let counter = &families[3];
        assert_eq!(counter.get_field_type(), MetricType::COUNTER);
        assert_eq!(counter.get_metric().len(), 2);
    }

    #[tokio::test]
    async fn test_scrape_count_merged_across_symbols() {
        let mut registry = CollectorRegistry::new();
        registry
            .register(collector("NIFTY", ScriptedProvider::always_err("down")))
            .unwrap();
        registry
            .register(collector("BANKNIFTY", ScriptedProvider::always_err("down")))
            .unwrap();

        let families = registry.gather(&ScrapeContext::background()).await;
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].get_name(), "oi_exporter_scrape_count");
        assert_eq!(families[0].get_metric().len(), 4);
    }

    #[tokio::test]
    async fn test_encode_text() {
        let mut registry = CollectorRegistry::new();
        registry
            .register(collector("BANKNIFTY", ScriptedProvider::always_ok(scenario_snapshot())))
            .unwrap();

        let text = registry.encode_text(&ScrapeContext::background()).await.unwrap();

        assert!(text.contains("# TYPE oi_exporter_open_interest gauge"));
        assert!(text.contains("# HELP oi_exporter_scrape_count Total scrape count"));
        assert!(text.contains("# TYPE oi_exporter_scrape_count counter"));
        assert!(text.contains("oi_exporter_underlying_value{symbol=\"BANKNIFTY\"} 48000.5"));
        assert!(text.contains(
            "oi_exporter_open_interest{expiry_date=\"28-Nov-2024\",option_type=\"PE\",strike_price=\"48000\",symbol=\"BANKNIFTY\"} 1200"
        ));
        assert!(text.contains(
            "oi_exporter_last_price{expiry_date=\"28-Nov-2024\",option_type=\"CE\",strike_price=\"48000\",symbol=\"BANKNIFTY\"} 40"
        ));
        assert!(text.contains("oi_exporter_scrape_count{status=\"ok\",symbol=\"BANKNIFTY\"} 1"));
        assert!(text.contains("oi_exporter_scrape_count{status=\"fail\",symbol=\"BANKNIFTY\"} 0"));
    }

    #[tokio::test]
    async fn test_repeated_chain_row_dropped() {
        let mut snapshot = scenario_snapshot();
        snapshot.entries.push(snapshot.entries[0].clone());

        let mut registry = CollectorRegistry::new();
        registry
            .register(collector("BANKNIFTY", ScriptedProvider::always_ok(snapshot)))
            .unwrap();

        let families = registry.gather(&ScrapeContext::background()).await;
        let oi = families
            .iter()
            .find(|f| f.get_name() == "oi_exporter_open_interest")
            .unwrap();
        assert_eq!(oi.get_metric().len(), 2);
    }

    #[tokio::test]
    async fn test_encode_empty_registry() {
        let registry = CollectorRegistry::new();
        let text = registry.encode_text(&ScrapeContext::background()).await.unwrap();
        assert!(text.is_empty());
    }
}
