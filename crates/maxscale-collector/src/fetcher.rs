use std::{borrow::Cow, time::Duration};

use async_trait::async_trait;
use maxscale_common::error::{ExporterError, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A source of decoded JSON resources, addressed by path relative to the API root.
///
/// Implementations return the payload with the `{"data": ...}` envelope
/// already removed.
#[async_trait]
pub trait JsonSource: Send + Sync {
    async fn get_json(&self, path: &str, deadline: Option<Instant>) -> Result<Value>;
}

#[derive(Clone)]
pub struct HttpJsonSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpJsonSource {
    pub fn new(address: &str, api_prefix: &str) -> Result<Self> {
        let base_url = build_base_url(address, api_prefix)?;

        Ok(Self {
            base_url,
            client: reqwest::Client::builder()
                .timeout(DEFAULT_REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn fetch_body(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, CONTENT_TYPE_JSON)
            .send()
            .await
            .map_err(|err| network_error(url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExporterError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if content_type != CONTENT_TYPE_JSON {
            return Err(ExporterError::ContentType {
                url: url.to_string(),
                content_type: content_type.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| network_error(url, err))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl JsonSource for HttpJsonSource {
    async fn get_json(&self, path: &str, deadline: Option<Instant>) -> Result<Value> {
        let url = self.url(path);
        debug!(url = %url, "fetching maxscale resource");

        let body = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, self.fetch_body(&url))
                .await
                .map_err(|_| ExporterError::Network {
                    url: url.clone(),
                    message: "scrape deadline exceeded".to_string(),
                })??,
            None => self.fetch_body(&url).await?,
        };

        decode_payload(&url, &body)
    }
}

/// Normalizes, parses and unwraps one raw response body.
pub fn decode_payload(context: &str, raw: &[u8]) -> Result<Value> {
    let normalized = normalize_nulls(raw);
    let value = serde_json::from_slice::<Value>(&normalized)
        .map_err(|err| ExporterError::decode(context, err))?;
    Ok(unwrap_envelope(value))
}

/// MaxScale emits the bare token `NULL` for missing numbers, which is not JSON.
pub fn normalize_nulls(raw: &[u8]) -> Cow<'_, [u8]> {
    const TOKEN: &[u8] = b"NULL";

    if !raw.windows(TOKEN.len()).any(|window| window == TOKEN) {
        return Cow::Borrowed(raw);
    }

    let mut normalized = Vec::with_capacity(raw.len());
    let mut rest = raw;
    while let Some((first, tail)) = rest.split_first() {
        if rest.starts_with(TOKEN) {
            normalized.extend_from_slice(b"null");
            rest = &rest[TOKEN.len()..];
        } else {
            normalized.push(*first);
            rest = tail;
        }
    }

    Cow::Owned(normalized)
}

pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut object) => match object.remove("data") {
            Some(inner) => inner,
            None => Value::Object(object),
        },
        other => other,
    }
}

fn build_base_url(address: &str, api_prefix: &str) -> Result<String> {
    let address = address.trim().trim_end_matches('/');
    let endpoint = if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{address}")
    };

    let parsed = url::Url::parse(&endpoint).map_err(|err| {
        ExporterError::InvalidArgument(format!("invalid maxscale address {address:?}: {err}"))
    })?;
    if parsed.host_str().is_none() {
        return Err(ExporterError::InvalidArgument(format!(
            "maxscale address {address:?} has no host"
        )));
    }

    let prefix = api_prefix.trim().trim_matches('/');
    if prefix.is_empty() {
        Ok(endpoint)
    } else {
        Ok(format!("{endpoint}/{prefix}"))
    }
}

fn network_error(url: &str, err: reqwest::Error) -> ExporterError {
    ExporterError::Network {
        url: url.to_string(),
        message: err.to_string(),
    }
}
