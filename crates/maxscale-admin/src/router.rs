use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use maxscale_collector::Collector;
use tower_http::trace::TraceLayer;

use crate::{handlers, process::ProcessCollector};

pub const METRICS_PATH: &str = "/metrics";
pub const DEFAULT_SCRAPE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct AdminState {
    pub collector: Collector,
    pub process: ProcessCollector,
    pub default_scrape_timeout: Duration,
}

impl AdminState {
    pub fn new(collector: Collector, pid_file: Option<PathBuf>) -> Self {
        Self {
            collector,
            process: ProcessCollector::new(pid_file),
            default_scrape_timeout: DEFAULT_SCRAPE_TIMEOUT,
        }
    }

    pub fn with_scrape_timeout(mut self, timeout: Duration) -> Self {
        self.default_scrape_timeout = timeout;
        self
    }
}

pub fn exporter_router(state: Arc<AdminState>) -> Router {
    Router::new()
        .route("/", get(handlers::index::index_page))
        .route(METRICS_PATH, get(handlers::metrics::prometheus_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use maxscale_collector::{JsonSource, ScrapeState};
    use maxscale_common::error::{ExporterError, Result};
    use serde_json::{Value, json};
    use tokio::time::Instant;
    use tower::ServiceExt;

    use super::*;

    struct ServersOnly;

    #[async_trait]
    impl JsonSource for ServersOnly {
        async fn get_json(&self, path: &str, _deadline: Option<Instant>) -> Result<Value> {
            match path {
                "/servers" => Ok(json!([
                    {"Server": "server1", "Address": "127.0.0.1", "Port": 3306, "Connections": 1, "Status": "Slave, Running"}
                ])),
                _ => Err(ExporterError::Network {
                    url: path.to_string(),
                    message: "connection refused".to_string(),
                }),
            }
        }
    }

    fn app() -> Router {
        let collector = Collector::new(Arc::new(ServersOnly), Arc::new(ScrapeState::new()));
        exporter_router(Arc::new(AdminState::new(collector, None)))
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn metrics_endpoint_reports_partial_failure() {
        let (status, content_type, body) = get_body(app(), "/metrics?runtime=false").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some(maxscale_collector::TEXT_CONTENT_TYPE));
        assert!(body.contains(
            "maxscale_server_up{server=\"server1\",address=\"127.0.0.1\",status=\",Slave,Running,\"} 1\n"
        ));
        assert!(body.contains("maxscale_up 0\n"));
        assert!(body.contains("maxscale_exporter_total_scrapes 1\n"));
        assert!(!body.contains("\nprocess_"));
    }

    #[tokio::test]
    async fn oversized_scrape_timeout_header_is_served() {
        for timeout in ["1e20", "9.3e18"] {
            let response = app()
                .oneshot(
                    Request::builder()
                        .uri("/metrics?runtime=false")
                        .header(crate::handlers::metrics::SCRAPE_TIMEOUT_HEADER, timeout)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn runtime_metrics_are_included_by_default() {
        let (_, _, body) = get_body(app(), "/metrics").await;
        assert!(body.contains("# TYPE process_resident_memory_bytes gauge\n"));
    }

    #[tokio::test]
    async fn index_links_to_metrics() {
        let (status, content_type, body) = get_body(app(), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap_or_default().starts_with("text/html"));
        assert!(body.contains("<a href=\"/metrics\">Metrics</a>"));
    }
}
