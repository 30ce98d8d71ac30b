use serde::Deserialize;

use crate::{
    catalog::{SERVER_CONNECTIONS, SERVER_MASTER, SERVER_UP},
    types::MetricSample,
};

use super::null_as_default;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerRecord {
    #[serde(rename = "Server", default, deserialize_with = "null_as_default")]
    pub server: String,
    #[serde(rename = "Address", default, deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(rename = "Connections", default, deserialize_with = "null_as_default")]
    pub connections: f64,
    #[serde(rename = "Status", default, deserialize_with = "null_as_default")]
    pub status: String,
}

pub fn translate(records: &[ServerRecord]) -> Vec<MetricSample> {
    let mut samples = Vec::with_capacity(records.len() * 3);

    for record in records {
        samples.push(MetricSample::scalar(
            &SERVER_CONNECTIONS,
            vec![record.server.clone(), record.address.clone()],
            record.connections,
        ));

        let status = normalize_status(&record.status);
        let up = if server_up(&status) { 1.0 } else { 0.0 };
        let master = if server_master(&status) { 1.0 } else { 0.0 };
        samples.push(MetricSample::scalar(
            &SERVER_UP,
            vec![record.server.clone(), record.address.clone(), status],
            up,
        ));
        samples.push(MetricSample::scalar(
            &SERVER_MASTER,
            vec![record.server.clone(), record.address.clone()],
            master,
        ));
    }

    samples
}

/// Turns `"Master, Running"` into `",Master,Running,"` so every flag can be
/// matched as `,flag,` regardless of its position.
pub fn normalize_status(status: &str) -> String {
    format!(",{},", status.replace(", ", ","))
}

pub fn server_up(normalized_status: &str) -> bool {
    !normalized_status.contains(",Down,") && normalized_status.contains(",Running,")
}

pub fn server_master(normalized_status: &str) -> bool {
    normalized_status.contains(",Master,")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::resources::{Resource, decode_records};

    fn record(status: &str) -> ServerRecord {
        ServerRecord {
            server: "server1".to_string(),
            address: "10.0.0.5".to_string(),
            connections: 4.0,
            status: status.to_string(),
        }
    }

    #[test]
    fn normalizes_flag_lists() {
        assert_eq!(normalize_status("Master, Running"), ",Master,Running,");
        assert_eq!(normalize_status("Running"), ",Running,");
        assert_eq!(normalize_status(""), ",,");
    }

    #[test]
    fn up_requires_running_without_down() {
        assert!(server_up(&normalize_status("Slave, Running")));
        assert!(server_up(&normalize_status("Running, Master")));
        assert!(!server_up(&normalize_status("Down")));
        assert!(!server_up(&normalize_status("Running, Down")));
        assert!(!server_up(&normalize_status("Maintenance")));
        assert!(!server_up(&normalize_status("NotRunning")));
    }

    #[test]
    fn emits_connections_and_up_per_server() {
        let samples = translate(&[record("Master, Running"), record("Down")]);
        assert_eq!(samples.len(), 6);

        assert_eq!(samples[0].descriptor.fq_name(), "maxscale_server_connections");
        assert_eq!(samples[0].label_values, ["server1", "10.0.0.5"]);
        assert_eq!(samples[0].as_f64(), Some(4.0));

        assert_eq!(samples[1].descriptor.fq_name(), "maxscale_server_up");
        assert_eq!(samples[1].label_values, ["server1", "10.0.0.5", ",Master,Running,"]);
        assert_eq!(samples[1].as_f64(), Some(1.0));

        assert_eq!(samples[2].descriptor.fq_name(), "maxscale_server_master");
        assert_eq!(samples[2].label_values, ["server1", "10.0.0.5"]);
        assert_eq!(samples[2].as_f64(), Some(1.0));

        assert_eq!(samples[4].as_f64(), Some(0.0));
        assert_eq!(samples[5].as_f64(), Some(0.0));
    }

    #[test]
    fn master_flag_matches_whole_flag_only() {
        assert!(server_master(&normalize_status("Master, Running")));
        assert!(server_master(&normalize_status("Running, Master")));
        assert!(!server_master(&normalize_status("Slave, Running")));
        assert!(!server_master(&normalize_status("Relay Master, Running")));
        assert!(!server_master(&normalize_status("Master Stickiness, Running")));
    }

    #[test]
    fn decodes_maxinfo_records() {
        let payload = json!([
            {"Server": "server1", "Address": "127.0.0.1", "Port": 3306, "Connections": 2, "Status": "Master, Running"},
            {"Server": "server2", "Address": "127.0.0.2", "Port": 3306, "Connections": null, "Status": "Down"}
        ]);

        let records: Vec<ServerRecord> = decode_records(Resource::Servers, payload).unwrap();
        assert_eq!(records[0].connections, 2.0);
        assert_eq!(records[1].connections, 0.0);
        assert_eq!(records[1].status, "Down");
    }
}
