//! Label-keyed counters and gauges
//!
//! The aggregator registers every series from [`catalog::CATALOG`] with a
//! private `prometheus::Registry`. Writers are the synchronizer (content
//! size gauges), the request classifier (impressions) and the write
//! handlers (highscores, answers). The `/_metrics` endpoint only reads.
//!
//! [`snapshot`](MetricsAggregator::snapshot) and
//! [`render`](MetricsAggregator::render) both read one `gather()` of the
//! registry, so the exported text and the sample list never disagree.
//!
//! Updates are atomic per series, so concurrent handlers need no extra
//! locking. Label values are not validated against a domain: an arbitrary
//! `difficulty` or user-agent creates a new series.

pub mod catalog;

use std::collections::BTreeMap;

use prometheus::proto::{Metric, MetricFamily};
use prometheus::{Encoder, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

pub use catalog::{MetricDef, MetricKind};

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Metric {name} expects {expected} label values, got {got}")]
    LabelArity {
        name: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Metric {0} is a counter and cannot be set")]
    SetOnCounter(&'static str),

    #[error("Counter {name} cannot decrease (delta {delta})")]
    NegativeDelta { name: &'static str, delta: i64 },

    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("Exposition is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// One exported series value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSample {
    pub name: String,
    pub kind: MetricKind,
    /// Label pairs in catalogue order
    pub labels: Vec<(String, String)>,
    pub value: i64,
}

enum Series {
    Counter(IntCounterVec),
    Gauge(IntGaugeVec),
}

struct Family {
    def: &'static MetricDef,
    series: Series,
}

pub struct MetricsAggregator {
    registry: Registry,
    families: BTreeMap<&'static str, Family>,
}

impl MetricsAggregator {
    /// Register the whole catalogue with a fresh registry
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();
        let mut families = BTreeMap::new();

        for def in catalog::CATALOG {
            let opts = Opts::new(def.name, def.help);
            let series = match def.kind {
                MetricKind::Counter => {
                    let vec = IntCounterVec::new(opts, def.labels)?;
                    registry.register(Box::new(vec.clone()))?;
                    Series::Counter(vec)
                }
                MetricKind::Gauge => {
                    let vec = IntGaugeVec::new(opts, def.labels)?;
                    registry.register(Box::new(vec.clone()))?;
                    Series::Gauge(vec)
                }
            };
            families.insert(def.name, Family { def, series });
        }

        let aggregator = Self { registry, families };

        // Unlabelled series are exported as 0 before their first update
        for family in aggregator.families.values() {
            if family.def.labels.is_empty() {
                aggregator.increment(family.def.name, &[], 0)?;
            }
        }

        Ok(aggregator)
    }

    /// Add `delta` to a series; counters reject negative deltas
    pub fn increment(&self, name: &str, labels: &[&str], delta: i64) -> Result<(), MetricsError> {
        let family = self.family(name, labels)?;
        match &family.series {
            Series::Counter(vec) => {
                let delta = u64::try_from(delta).map_err(|_| MetricsError::NegativeDelta {
                    name: family.def.name,
                    delta,
                })?;
                vec.get_metric_with_label_values(labels)?.inc_by(delta);
            }
            Series::Gauge(vec) => vec.get_metric_with_label_values(labels)?.add(delta),
        }
        Ok(())
    }

    /// Overwrite a gauge
    pub fn set(&self, name: &str, labels: &[&str], value: i64) -> Result<(), MetricsError> {
        let family = self.family(name, labels)?;
        match &family.series {
            Series::Counter(_) => return Err(MetricsError::SetOnCounter(family.def.name)),
            Series::Gauge(vec) => vec.get_metric_with_label_values(labels)?.set(value),
        }
        Ok(())
    }

    /// [`increment`](Self::increment), logging instead of failing
    pub fn record(&self, name: &str, labels: &[&str], delta: i64) {
        if let Err(e) = self.increment(name, labels, delta) {
            warn!("Metric update dropped: {}", e);
        }
    }

    /// [`set`](Self::set), logging instead of failing
    pub fn record_set(&self, name: &str, labels: &[&str], value: i64) {
        if let Err(e) = self.set(name, labels, value) {
            warn!("Metric update dropped: {}", e);
        }
    }

    /// Exported value of one series, `None` if it was never touched
    pub fn value(&self, name: &str, labels: &[&str]) -> Option<i64> {
        self.snapshot()
            .into_iter()
            .find(|sample| {
                sample.name == name
                    && sample
                        .labels
                        .iter()
                        .map(|(_, value)| value.as_str())
                        .eq(labels.iter().copied())
            })
            .map(|sample| sample.value)
    }

    /// Every touched series, ordered by metric name then label values
    pub fn snapshot(&self) -> Vec<MetricSample> {
        let mut samples = Vec::new();
        for family in self.gather() {
            let Some(def) = catalog::find(family.get_name()) else {
                continue;
            };
            for metric in family.get_metric() {
                samples.push(MetricSample {
                    name: def.name.to_string(),
                    kind: def.kind,
                    labels: label_pairs(def, metric),
                    value: sample_value(def.kind, metric),
                });
            }
        }
        samples
    }

    /// Prometheus text exposition of the same data as [`snapshot`](Self::snapshot)
    pub fn render(&self) -> Result<String, MetricsError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    fn family(&self, name: &str, labels: &[&str]) -> Result<&Family, MetricsError> {
        let family = self
            .families
            .get(name)
            .ok_or_else(|| MetricsError::UnknownMetric(name.to_string()))?;
        if family.def.labels.len() != labels.len() {
            return Err(MetricsError::LabelArity {
                name: family.def.name,
                expected: family.def.labels.len(),
                got: labels.len(),
            });
        }
        Ok(family)
    }
}

/// Label pairs of `metric` reordered to the catalogue declaration
///
/// The registry hands labels back sorted by name.
fn label_pairs(def: &MetricDef, metric: &Metric) -> Vec<(String, String)> {
    def.labels
        .iter()
        .map(|name| {
            let value = metric
                .get_label()
                .iter()
                .find(|pair| pair.get_name() == *name)
                .map(|pair| pair.get_value().to_string())
                .unwrap_or_default();
            (name.to_string(), value)
        })
        .collect()
}

fn sample_value(kind: MetricKind, metric: &Metric) -> i64 {
    // Int series only ever hold whole numbers
    match kind {
        MetricKind::Counter => metric.get_counter().get_value() as i64,
        MetricKind::Gauge => metric.get_gauge().get_value() as i64,
    }
}
