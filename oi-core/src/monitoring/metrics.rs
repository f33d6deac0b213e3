//! Metric descriptors and samples
//!
//! A [`MetricDescriptor`] is immutable metadata (name, help, type, labels)
//! backed by a validated [`prometheus::core::Desc`]. A [`Sample`] is one
//! labeled value produced by a collection cycle. Samples only carry their
//! variable labels; constant labels (such as `symbol` on the gauges) live on
//! the descriptor and are attached at encoding time.

use prometheus::core::Desc;
use prometheus::proto::MetricType;
use std::collections::HashMap;

/// Label names
pub const LABEL_SYMBOL: &str = "symbol";
pub const LABEL_OPTION_TYPE: &str = "option_type";
pub const LABEL_EXPIRY_DATE: &str = "expiry_date";
pub const LABEL_STRIKE_PRICE: &str = "strike_price";
pub const LABEL_STATUS: &str = "status";

/// Variable labels shared by the strike-level gauges
pub const STRIKE_LABELS: [&str; 3] = [LABEL_OPTION_TYPE, LABEL_EXPIRY_DATE, LABEL_STRIKE_PRICE];

/// Metric families produced by the option-chain collector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    OpenInterest,
    LastPrice,
    UnderlyingValue,
    ScrapeCount,
}

impl MetricName {
    /// Name without the namespace prefix
    pub const fn suffix(&self) -> &'static str {
        match self {
            MetricName::OpenInterest => "open_interest",
            MetricName::LastPrice => "last_price",
            MetricName::UnderlyingValue => "underlying_value",
            MetricName::ScrapeCount => "scrape_count",
        }
    }

    pub const fn help(&self) -> &'static str {
        match self {
            MetricName::OpenInterest => "Total open interest",
            MetricName::LastPrice => "Last traded price",
            MetricName::UnderlyingValue => "Spot price of underlying asset",
            MetricName::ScrapeCount => "Total scrape count",
        }
    }

    /// `<namespace>_<suffix>`
    pub fn fq_name(&self, namespace: &str) -> String {
        format!("{}_{}", namespace, self.suffix())
    }
}

/// Exposition type of a metric family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl MetricKind {
    pub fn proto_type(&self) -> MetricType {
        match self {
            MetricKind::Gauge => MetricType::GAUGE,
            MetricKind::Counter => MetricType::COUNTER,
        }
    }
}

/// Immutable description of one metric family
#[derive(Debug, Clone)]
pub struct MetricDescriptor {
    metric: MetricName,
    kind: MetricKind,
    desc: Desc,
}

impl MetricDescriptor {
    /// Build and validate a descriptor
    ///
    /// Fails when the name or any label name is not a valid Prometheus
    /// identifier, or when a label is both constant and variable.
    pub fn new(
        metric: MetricName,
        kind: MetricKind,
        namespace: &str,
        variable_labels: &[&str],
        const_labels: &[(&str, &str)],
    ) -> Result<Self, prometheus::Error> {
        let const_labels: HashMap<String, String> = const_labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let desc = Desc::new(
            metric.fq_name(namespace),
            metric.help().to_string(),
            variable_labels.iter().map(|l| l.to_string()).collect(),
            const_labels,
        )?;

        Ok(Self { metric, kind, desc })
    }

    pub fn metric(&self) -> MetricName {
        self.metric
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.desc.fq_name
    }

    pub fn help(&self) -> &str {
        &self.desc.help
    }

    pub fn variable_labels(&self) -> &[String] {
        &self.desc.variable_labels
    }

    /// Constant label pairs, sorted by name
    pub fn const_labels(&self) -> impl Iterator<Item = (&str, &str)> {
        self.desc
            .const_label_pairs
            .iter()
            .map(|lp| (lp.get_name(), lp.get_value()))
    }

    /// Underlying prometheus descriptor
    pub fn desc(&self) -> &Desc {
        &self.desc
    }
}

/// One labeled value emitted by a collection cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub metric: MetricName,
    /// Variable labels in descriptor order
    pub labels: Vec<(&'static str, String)>,
    pub value: f64,
}

impl Sample {
    pub fn new(metric: MetricName, value: f64) -> Self {
        Self {
            metric,
            labels: Vec::new(),
            value,
        }
    }

    pub fn with_label(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.labels.push((name, value.into()));
        self
    }

    /// Value of a variable label, if set
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}
