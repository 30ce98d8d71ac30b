use serde::Deserialize;

use crate::{
    catalog::{SERVICE_CURRENT_SESSIONS, SERVICE_TOTAL_SESSIONS},
    types::MetricSample,
};

use super::null_as_default;

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceRecord {
    #[serde(rename = "Service Name", default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "Router Module", default, deserialize_with = "null_as_default")]
    pub router: String,
    #[serde(rename = "No. Sessions", default, deserialize_with = "null_as_default")]
    pub sessions: f64,
    #[serde(rename = "Total Sessions", default, deserialize_with = "null_as_default")]
    pub total_sessions: f64,
}

pub fn translate(records: &[ServiceRecord]) -> Vec<MetricSample> {
    records
        .iter()
        .flat_map(|record| {
            let labels = vec![record.name.clone(), record.router.clone()];
            [
                MetricSample::scalar(&SERVICE_CURRENT_SESSIONS, labels.clone(), record.sessions),
                MetricSample::scalar(&SERVICE_TOTAL_SESSIONS, labels, record.total_sessions),
            ]
        })
        .collect()
}
