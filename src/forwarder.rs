use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::info;

use crate::config::{validate_url, Config};
use crate::error::{ConfigError, ForwardError, RelayError};
use crate::models::{GenerationRequest, GenerationResult};
use crate::payload::{new_task_uuid, ForwardPayload};
use crate::report;

/// Posts generation results to the video REST endpoint.
#[derive(Debug, Clone)]
pub struct Forwarder {
    endpoint: Option<String>,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(endpoint: Option<String>) -> Self {
        Self { endpoint, timeout: Duration::from_secs(30) }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.endpoint.clone()).with_timeout(config.forward_timeout)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// An explicit endpoint wins over the configured one.
    pub fn resolve_endpoint(&self, explicit: Option<&str>) -> Result<String, ConfigError> {
        if let Some(raw) = explicit.filter(|e| !e.trim().is_empty()) {
            return validate_url("endpoint", raw.trim());
        }
        let raw = self
            .endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or(ConfigError::MissingEndpoint)?;
        validate_url("VIDEO_API_ENDPOINT", raw.trim())
    }

    /// Tags `result` with a fresh task UUID and delivers it.
    ///
    /// Only a missing/invalid endpoint yields a fatal error; delivery
    /// failures come back as [`RelayError::Forward`] after being reported.
    pub async fn forward(
        &self,
        result: &GenerationResult,
        request: &GenerationRequest,
        endpoint: Option<&str>,
    ) -> Result<Value, RelayError> {
        let payload = ForwardPayload::build(new_task_uuid(), result, request);
        let url = self.resolve_endpoint(endpoint)?;

        info!(task_uuid = %payload.task_uuid, "📤 Sending video data to {}", url);
        let outcome = self.post(&url, &payload).await;
        report::forward_outcome(&payload, &outcome);
        outcome.map_err(RelayError::from)
    }

    /// One POST, no retry. The client lives only for this call.
    pub async fn post(&self, url: &str, payload: &ForwardPayload) -> Result<Value, ForwardError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ForwardError::Transport)?;

        let response = client
            .post(url)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(ForwardError::Transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ForwardError::Rejected { status: status.as_u16(), body });
        }

        let body = response.text().await.map_err(ForwardError::Transport)?;
        serde_json::from_str(&body).map_err(|e| ForwardError::Decode(format!("{e}: {body}")))
    }
}
