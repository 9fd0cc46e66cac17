// Project imports
use crate::models::Family;

// Current module imports
use super::types::{FamilyMetric, FamilyNames, MetricKind, MetricName, Sample};

/// Content type of the metrics endpoint
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Decimal places for ratios and latencies
pub const RATIO_PRECISION: usize = 6;
/// Decimal places for elapsed-time gauges
pub const ELAPSED_PRECISION: usize = 1;

pub const DNS_NAMES: FamilyNames = FamilyNames {
    namespace: "dns_canary",
    unit: "queries",
    subject: "DNS queries",
};

pub const API_NAMES: FamilyNames = FamilyNames {
    namespace: "api_canary",
    unit: "requests",
    subject: "API lifecycle runs",
};

pub fn family_names(family: Family) -> FamilyNames {
    match family {
        Family::Dns => DNS_NAMES,
        Family::ApiLifecycle => API_NAMES,
    }
}

/// Metrics emitted for every family, in output order.
pub const FAMILY_METRICS: [FamilyMetric; 8] = [
    FamilyMetric {
        name: MetricName::Unit("_total"),
        help: "Total number of {} sent",
        kind: MetricKind::Counter,
        value: |s| Sample::Count(s.total),
    },
    FamilyMetric {
        name: MetricName::Unit("_success_total"),
        help: "Number of successful {}",
        kind: MetricKind::Counter,
        value: |s| Sample::Count(s.success),
    },
    FamilyMetric {
        name: MetricName::Unit("_failed_total"),
        help: "Number of failed {}",
        kind: MetricKind::Counter,
        value: |s| Sample::Count(s.failure),
    },
    FamilyMetric {
        name: MetricName::Plain("response_time_seconds_avg"),
        help: "Average response time of recent {} in seconds",
        kind: MetricKind::Gauge,
        value: |s| Sample::Fixed(s.avg_latency_secs, RATIO_PRECISION),
    },
    FamilyMetric {
        name: MetricName::Plain("response_time_seconds_max"),
        help: "Maximum response time of recent {} in seconds",
        kind: MetricKind::Gauge,
        value: |s| Sample::Fixed(s.max_latency_secs, RATIO_PRECISION),
    },
    FamilyMetric {
        name: MetricName::Plain("availability"),
        help: "Success ratio of {} (0-1)",
        kind: MetricKind::Gauge,
        value: |s| Sample::Fixed(s.success_ratio, RATIO_PRECISION),
    },
    FamilyMetric {
        name: MetricName::Plain("consecutive_failures"),
        help: "Number of consecutive failed {}",
        kind: MetricKind::Gauge,
        value: |s| Sample::Count(s.consecutive_failures),
    },
    FamilyMetric {
        name: MetricName::Plain("time_since_last_success_seconds"),
        help: "Seconds since the last successful {}",
        kind: MetricKind::Gauge,
        value: |s| Sample::Fixed(s.secs_since_last_success, ELAPSED_PRECISION),
    },
];
