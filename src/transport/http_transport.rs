use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::base::{Transport, TransportError};
use super::request::{ApiRequest, ApiResponse};
use crate::config::ApiConfig;

/// The reqwest-backed transport. Joins the configured base URL with each
/// request path and applies the configured timeout; a timed-out exchange
/// surfaces as a plain network failure.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_in_ms))
            .build()
            .expect("failed to build HTTP client");

        HttpTransport {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path());
        debug!(method = %request.method(), url = %url, "dispatching request");

        let mut builder = self
            .client
            .request(request.method().clone(), url.as_str())
            .headers(request.headers().clone());
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::NoResponse(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::NoResponse(e.to_string()))?;

        Ok(ApiResponse::new(status, headers, body))
    }
}
