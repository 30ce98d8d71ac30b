use serde::Deserialize;

use crate::{catalog::Catalog, types::MetricSample};

use super::null_as_default;

#[derive(Debug, Clone, Deserialize)]
pub struct StatusRecord {
    #[serde(rename = "Variable_name")]
    pub name: String,
    #[serde(rename = "Value", default, deserialize_with = "null_as_default")]
    pub value: f64,
}

/// Records without a catalog entry are skipped.
pub fn translate(records: &[StatusRecord], catalog: &Catalog) -> Vec<MetricSample> {
    records
        .iter()
        .filter_map(|record| {
            catalog
                .status(&record.name)
                .map(|descriptor| MetricSample::unlabeled(descriptor, record.value))
        })
        .collect()
}
