use maxscale_common::error::{ExporterError, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::{catalog::Catalog, types::MetricSample};

#[derive(Debug, Clone, Deserialize)]
pub struct VariableRecord {
    #[serde(rename = "Variable_name")]
    pub name: String,
    #[serde(rename = "Value", default)]
    pub value: Value,
}

impl VariableRecord {
    /// Variables arrive as numbers or as numeric strings.
    pub fn numeric_value(&self) -> Option<f64> {
        match &self.value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Only variables with a catalog entry are read; their value must be numeric.
pub fn translate(records: &[VariableRecord], catalog: &Catalog) -> Result<Vec<MetricSample>> {
    let mut samples = Vec::new();

    for record in records {
        let Some(descriptor) = catalog.variable(&record.name) else {
            continue;
        };

        let value = record.numeric_value().ok_or_else(|| {
            ExporterError::decode(
                format!("variable {}", record.name),
                format!("value {} is not numeric", record.value),
            )
        })?;
        samples.push(MetricSample::unlabeled(descriptor, value));
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::resources::Resource;

    #[test]
    fn reads_known_variables() {
        let payload = json!([
            {"Variable_name": "MAXSCALE_VERSION", "Value": "2.0.5"},
            {"Variable_name": "MAXSCALE_THREADS", "Value": 4},
            {"Variable_name": "MAXSCALE_SESSIONS", "Value": "12"},
        ]);

        let samples = Resource::Variables
            .translate(payload, Catalog::global())
            .unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].descriptor.fq_name(), "maxscale_variables_thread");
        assert_eq!(samples[0].as_f64(), Some(4.0));
        assert_eq!(samples[1].descriptor.fq_name(), "maxscale_variables_sessions");
        assert_eq!(samples[1].as_f64(), Some(12.0));
    }

    #[test]
    fn non_numeric_known_variable_fails_the_resource() {
        let payload = json!([{"Variable_name": "MAXSCALE_NBPOLLS", "Value": "many"}]);
        let err = Resource::Variables
            .translate(payload, Catalog::global())
            .unwrap_err();
        assert!(matches!(err, ExporterError::Decode { .. }), "{err}");
    }
}
