// Standard library
use std::sync::Arc;
use std::time::Instant;

// Project imports
use crate::metrics::{Aggregator, FamilySnapshot};

/// Renders snapshots into the text exposition format.
///
/// Holds only the label values identifying each probed target, so rendering
/// is a pure function of the snapshot.
#[derive(Debug, Clone)]
pub struct Exporter {
    /// `host:port` of the name-resolution service
    pub dns_target: String,
    /// `host:port` of the record API
    pub api_target: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

/// A single rendered value and its formatting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Count(u64),
    /// Value and number of decimal places
    Fixed(f64, usize),
}

/// Naming of one probe family in the exposition output.
#[derive(Debug, Clone, Copy)]
pub struct FamilyNames {
    /// e.g. `dns_canary`
    pub namespace: &'static str,
    /// Counted unit, e.g. `queries`
    pub unit: &'static str,
    /// Human readable unit used in help text
    pub subject: &'static str,
}

/// How a metric name is built from [`FamilyNames`].
#[derive(Debug, Clone, Copy)]
pub enum MetricName {
    /// `{namespace}_{unit}{suffix}`
    Unit(&'static str),
    /// `{namespace}_{suffix}`
    Plain(&'static str),
}

/// A metric rendered once per family.
pub struct FamilyMetric {
    pub name: MetricName,
    /// `{}` is replaced by the family subject
    pub help: &'static str,
    pub kind: MetricKind,
    pub value: fn(&FamilySnapshot) -> Sample,
}

/// Shared state of the exposition HTTP handlers.
#[derive(Clone)]
pub struct ExpositionState {
    pub aggregator: Arc<Aggregator>,
    pub exporter: Arc<Exporter>,
    pub started: Instant,
}
