use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use maxscale_collector::{TEXT_CONTENT_TYPE, render_prometheus};
use serde::Deserialize;
use tokio::time::Instant;

use crate::router::AdminState;

pub const SCRAPE_TIMEOUT_HEADER: &str = "x-prometheus-scrape-timeout-seconds";

#[derive(Debug, Default, Deserialize)]
pub struct MetricsQuery {
    /// Include the exporter's own `process_*` metrics. Defaults to true.
    runtime: Option<bool>,
}

pub async fn prometheus_metrics(
    State(state): State<Arc<AdminState>>,
    Query(query): Query<MetricsQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let timeout = scrape_timeout(&headers, state.default_scrape_timeout);
    let collection = state.collector.collect(Instant::now().checked_add(timeout)).await;

    let mut samples = collection.samples;
    samples.extend(state.process.collect(query.runtime.unwrap_or(true)));
    let payload = render_prometheus(&samples);

    let mut response = Response::new(Body::from(payload));
    *response.status_mut() = StatusCode::OK;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(TEXT_CONTENT_TYPE),
    );

    response
}

/// The scraper's advertised timeout, capped at the configured default.
fn scrape_timeout(headers: &HeaderMap, default: Duration) -> Duration {
    headers
        .get(SCRAPE_TIMEOUT_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|seconds| *seconds > 0.0)
        .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
        .map_or(default, |timeout| timeout.min(default))
}
