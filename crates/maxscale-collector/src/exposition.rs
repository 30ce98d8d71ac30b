use std::{collections::BTreeMap, fmt::Write};

use crate::types::{MetricDescriptor, MetricSample, MetricValue};

pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Renders samples in the Prometheus text exposition format.
///
/// Samples are grouped into one family per metric name; families are ordered
/// by name and keep their samples in emission order.
pub fn render_prometheus(samples: &[MetricSample]) -> String {
    let mut families: BTreeMap<String, (&MetricDescriptor, Vec<&MetricSample>)> = BTreeMap::new();
    for sample in samples {
        families
            .entry(sample.descriptor.fq_name())
            .or_insert_with(|| (sample.descriptor, Vec::new()))
            .1
            .push(sample);
    }

    let mut output = String::new();
    for (name, (descriptor, samples)) in families {
        let _ = writeln!(output, "# HELP {name} {}", escape(descriptor.help, false));
        let _ = writeln!(
            output,
            "# TYPE {name} {}",
            descriptor.metric_type.as_prometheus_type()
        );

        for sample in samples {
            let series = Series {
                labels: descriptor.variable_labels,
                values: &sample.label_values,
            };

            match &sample.value {
                MetricValue::Counter(value) | MetricValue::Gauge(value) => {
                    series.write(&mut output, &name, "", None, *value);
                }
                MetricValue::Histogram {
                    buckets,
                    count,
                    sum,
                } => {
                    for (bound, bucket_count) in buckets {
                        let le = bound.to_string();
                        let value = *bucket_count as f64;
                        series.write(&mut output, &name, "_bucket", Some(&le), value);
                    }
                    series.write(&mut output, &name, "_bucket", Some("+Inf"), *count as f64);
                    series.write(&mut output, &name, "_sum", None, *sum);
                    series.write(&mut output, &name, "_count", None, *count as f64);
                }
            }
        }
    }

    output
}

/// Label schema of one sample, zipped with its values when a line is written.
struct Series<'a> {
    labels: &'static [&'static str],
    values: &'a [String],
}

impl Series<'_> {
    fn write(&self, output: &mut String, name: &str, suffix: &str, le: Option<&str>, value: f64) {
        output.push_str(name);
        output.push_str(suffix);

        let mut pairs = self
            .labels
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
            .chain(le.map(|le| ("le", le)))
            .peekable();
        if pairs.peek().is_some() {
            output.push('{');
            for (index, (key, label_value)) in pairs.enumerate() {
                if index > 0 {
                    output.push(',');
                }
                let _ = write!(output, "{key}=\"{}\"", escape(label_value, true));
            }
            output.push('}');
        }

        let _ = writeln!(output, " {}", format_metric_value(value));
    }
}

fn format_metric_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let sign = if value > 0.0 { "+" } else { "-" };
        format!("{sign}Inf")
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Escapes backslash and newline; label values also escape double quotes.
fn escape(value: &str, quote: bool) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '"' if quote => escaped.push_str("\\\""),
            c => escaped.push(c),
        }
    }
    escaped
}
