//! Metric descriptors, metric instances and the text exposition encoder.

use std::fmt::Write;

/// Prometheus metric type of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

/// Static description of a metric family.
#[derive(Debug, PartialEq, Eq)]
pub struct Descriptor {
    /// Fully-qualified metric name.
    pub name: &'static str,
    /// Help text.
    pub help: &'static str,
    /// Metric type.
    pub kind: MetricKind,
    /// Ordered label names.
    pub labels: &'static [&'static str],
}

/// A [`Descriptor`] whose label count is part of its type.
///
/// Metrics can only be built through [`LabeledDescriptor::metric`], which
/// takes exactly `N` label values, so a metric can never disagree with its
/// descriptor's label schema.
#[derive(Debug)]
pub struct LabeledDescriptor<const N: usize> {
    descriptor: Descriptor,
}

impl<const N: usize> LabeledDescriptor<N> {
    pub const fn new(
        name: &'static str,
        help: &'static str,
        kind: MetricKind,
        labels: &'static [&'static str; N],
    ) -> Self {
        Self {
            descriptor: Descriptor {
                name,
                help,
                kind,
                labels,
            },
        }
    }

    pub fn descriptor(&'static self) -> &'static Descriptor {
        &self.descriptor
    }

    /// Build a metric instance of this family.
    pub fn metric(&'static self, value: f64, labels: [String; N]) -> Metric {
        Metric {
            descriptor: &self.descriptor,
            value,
            labels: Vec::from(labels),
        }
    }
}

/// A fully-materialized metric sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    descriptor: &'static Descriptor,
    value: f64,
    labels: Vec<String>,
}

impl Metric {
    pub fn descriptor(&self) -> &'static Descriptor {
        self.descriptor
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Label values, in the descriptor's label order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Look up a label value by name.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.descriptor
            .labels
            .iter()
            .position(|l| *l == name)
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }

    fn format_labels(&self) -> String {
        if self.labels.is_empty() {
            return String::new();
        }

        let parts: Vec<String> = self
            .descriptor
            .labels
            .iter()
            .zip(&self.labels)
            .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
            .collect();

        format!("{{{}}}", parts.join(","))
    }
}

/// Render metrics in Prometheus text exposition format.
///
/// Samples are grouped by metric name; within a family the snapshot order is
/// preserved.
pub fn render(metrics: &[Metric]) -> String {
    let mut sorted: Vec<&Metric> = metrics.iter().collect();
    sorted.sort_by_key(|m| m.name());

    let mut output = String::with_capacity(metrics.len() * 100);
    let mut current: Option<&str> = None;

    for metric in sorted {
        let descriptor = metric.descriptor();
        if current != Some(descriptor.name) {
            writeln!(
                output,
                "# HELP {} {}",
                descriptor.name,
                escape_help(descriptor.help)
            )
            .ok();
            writeln!(output, "# TYPE {} {}", descriptor.name, descriptor.kind.as_str()).ok();
            current = Some(descriptor.name);
        }

        writeln!(
            output,
            "{}{} {}",
            descriptor.name,
            metric.format_labels(),
            format_value(metric.value)
        )
        .ok();
    }

    output
}

/// Escape special characters in label values.
fn escape_label_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Format a floating point value for Prometheus.
fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        }
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}
