pub const NAMESPACE: &str = "maxscale";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
}

impl MetricType {
    pub fn as_prometheus_type(&self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
            Self::Histogram => "histogram",
        }
    }
}

/// Static metadata for one exported metric family.
///
/// An empty `namespace` or `subsystem` is omitted from the fully qualified
/// name, so the exporter's own process metrics can live outside `maxscale_`.
#[derive(Debug, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub namespace: &'static str,
    pub subsystem: &'static str,
    pub name: &'static str,
    pub help: &'static str,
    pub metric_type: MetricType,
    pub variable_labels: &'static [&'static str],
}

impl MetricDescriptor {
    pub const fn new(
        subsystem: &'static str,
        name: &'static str,
        help: &'static str,
        metric_type: MetricType,
        variable_labels: &'static [&'static str],
    ) -> Self {
        Self {
            namespace: NAMESPACE,
            subsystem,
            name,
            help,
            metric_type,
            variable_labels,
        }
    }

    pub fn fq_name(&self) -> String {
        [self.namespace, self.subsystem, self.name]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("_")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Counter(f64),
    Gauge(f64),
    /// Buckets are `(upper bound in seconds, count)` pairs in ascending bound
    /// order, exported as given. The `+Inf` bucket is implied by `count`.
    Histogram {
        buckets: Vec<(f64, u64)>,
        count: u64,
        sum: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub descriptor: &'static MetricDescriptor,
    pub label_values: Vec<String>,
    pub value: MetricValue,
}

impl MetricSample {
    pub fn new(
        descriptor: &'static MetricDescriptor,
        label_values: Vec<String>,
        value: MetricValue,
    ) -> Self {
        debug_assert_eq!(
            label_values.len(),
            descriptor.variable_labels.len(),
            "label values do not match the label schema of {}",
            descriptor.name
        );

        Self {
            descriptor,
            label_values,
            value,
        }
    }

    /// Builds a counter or gauge sample, picking the value variant from the
    /// descriptor's kind. Histogram descriptors need [`MetricSample::new`].
    pub fn scalar(
        descriptor: &'static MetricDescriptor,
        label_values: Vec<String>,
        value: f64,
    ) -> Self {
        debug_assert!(
            descriptor.metric_type != MetricType::Histogram,
            "{} is a histogram and has no scalar value",
            descriptor.name
        );
        let value = match descriptor.metric_type {
            MetricType::Counter => MetricValue::Counter(value),
            MetricType::Gauge => MetricValue::Gauge(value),
            MetricType::Histogram => MetricValue::Histogram {
                buckets: Vec::new(),
                count: 0,
                sum: value,
            },
        };
        Self::new(descriptor, label_values, value)
    }

    pub fn unlabeled(descriptor: &'static MetricDescriptor, value: f64) -> Self {
        Self::scalar(descriptor, Vec::new(), value)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            MetricValue::Counter(value) | MetricValue::Gauge(value) => Some(value),
            MetricValue::Histogram { .. } => None,
        }
    }
}
