// Standard library
use std::fmt::Write;

// Project imports
use crate::metrics::MetricsSnapshot;
use crate::models::{Classification, Family};

// Current module imports
use super::constants::{family_names, API_NAMES, DNS_NAMES, FAMILY_METRICS};
use super::types::{Exporter, FamilyNames, MetricKind, MetricName, Sample};

impl MetricKind {
    fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

impl Sample {
    fn render(&self) -> String {
        match self {
            Sample::Count(value) => value.to_string(),
            Sample::Fixed(value, precision) => format!("{:.*}", precision, value),
        }
    }
}

impl MetricName {
    fn resolve(&self, names: &FamilyNames) -> String {
        match self {
            MetricName::Unit(suffix) => format!("{}_{}{}", names.namespace, names.unit, suffix),
            MetricName::Plain(suffix) => format!("{}_{}", names.namespace, suffix),
        }
    }
}

impl Exporter {
    pub fn new(dns_target: impl Into<String>, api_target: impl Into<String>) -> Self {
        Self {
            dns_target: dns_target.into(),
            api_target: api_target.into(),
        }
    }

    fn target(&self, family: Family) -> &str {
        match family {
            Family::Dns => &self.dns_target,
            Family::ApiLifecycle => &self.api_target,
        }
    }

    /// Renders `snapshot` as a stably ordered exposition document.
    pub fn render(&self, snapshot: &MetricsSnapshot) -> String {
        let mut output = String::new();

        for family in Family::ALL {
            let names = family_names(family);
            let view = snapshot.family(family);
            let labels = [("server", self.target(family))];

            for metric in FAMILY_METRICS.iter() {
                let help = metric.help.replace("{}", names.subject);
                write_metric(
                    &mut output,
                    &metric.name.resolve(&names),
                    &help,
                    metric.kind,
                    &labels,
                    (metric.value)(view),
                );
            }

            if family == Family::Dns {
                for classification in Classification::ALL {
                    write_metric(
                        &mut output,
                        &format!(
                            "{}_{}_{}_total",
                            DNS_NAMES.namespace,
                            DNS_NAMES.unit,
                            classification.as_str()
                        ),
                        &format!("Number of {} DNS responses", classification),
                        MetricKind::Counter,
                        &labels,
                        Sample::Count(snapshot.classifications.get(classification)),
                    );
                }
            }
        }

        let api_labels = [("server", self.api_target.as_str())];
        let operations = [
            ("created", "created", snapshot.operations.created),
            ("read", "read back", snapshot.operations.read),
            ("updated", "updated", snapshot.operations.updated),
            ("deleted", "deleted", snapshot.operations.deleted),
        ];
        for (suffix, verb, value) in operations {
            write_metric(
                &mut output,
                &format!("{}_records_{}_total", API_NAMES.namespace, suffix),
                &format!("Number of records {} by completed lifecycle runs", verb),
                MetricKind::Counter,
                &api_labels,
                Sample::Count(value),
            );
        }

        write_metric(
            &mut output,
            &format!("{}_records_active", DNS_NAMES.namespace),
            "Number of active test records",
            MetricKind::Gauge,
            &[],
            Sample::Count(snapshot.active_records),
        );

        write_metric(
            &mut output,
            &format!("{}_up", DNS_NAMES.namespace),
            "Canary health status (1 = up, 0 = down)",
            MetricKind::Gauge,
            &[],
            Sample::Count(1),
        );

        output
    }
}

fn write_metric(
    output: &mut String,
    name: &str,
    help: &str,
    kind: MetricKind,
    labels: &[(&str, &str)],
    sample: Sample,
) {
    if !output.is_empty() {
        output.push('\n');
    }
    // Writing into a String never fails.
    let _ = writeln!(output, "# HELP {} {}", name, help);
    let _ = writeln!(output, "# TYPE {} {}", name, kind.as_str());

    if labels.is_empty() {
        let _ = writeln!(output, "{} {}", name, sample.render());
        return;
    }

    let labels_str = labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
        .collect::<Vec<_>>()
        .join(",");
    let _ = writeln!(output, "{}{{{}}} {}", name, labels_str, sample.render());
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
