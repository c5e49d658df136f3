use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::{Config, DEFAULT_PROVIDER_BASE};
use crate::error::{ConfigError, ProviderError};
use crate::models::{GenerationRequest, GenerationResult};
use crate::provider::VideoProvider;

const TASK_VIDEO_INFERENCE: &str = "videoInference";
const TASK_GET_RESPONSE: &str = "getResponse";

#[derive(Debug, Clone)]
pub struct RunwareClientBuilder {
    api_key: Option<String>,
    base_url: String,
    poll_interval: Duration,
    timeout: Duration,
    request_timeout: Duration,
}

impl Default for RunwareClientBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_PROVIDER_BASE.to_string(),
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(600),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl RunwareClientBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Upper bound on the whole generation, polling included.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Upper bound on each individual HTTP call.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<RunwareClient, ConfigError> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let client = Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(RunwareClient {
            client,
            api_key,
            base_url: self.base_url,
            poll_interval: self.poll_interval,
            timeout: self.timeout,
        })
    }
}

/// REST client for the Runware task API.
pub struct RunwareClient {
    client: Client,
    api_key: String,
    base_url: String,
    poll_interval: Duration,
    timeout: Duration,
}

impl RunwareClient {
    pub fn builder() -> RunwareClientBuilder {
        RunwareClientBuilder::default()
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::builder()
            .api_key(config.api_key.clone())
            .base_url(config.provider_base.clone())
            .poll_interval(config.poll_interval)
            .timeout(config.provider_timeout)
            .build()
    }

    async fn post_tasks<T: Serialize + ?Sized>(&self, tasks: &T) -> Result<RunwareResponse, ProviderError> {
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(tasks)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("❌ Runware API error response ({}): {}", status, text);
            return Err(parse_error(status.as_u16(), &text));
        }

        let parsed: RunwareResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Malformed(format!("{e}: {text}")))?;

        if let Some(err) = parsed.errors.first() {
            return Err(ProviderError::Task {
                code: err.code.clone().unwrap_or_else(|| "unknown".into()),
                message: err.message.clone().unwrap_or_default(),
            });
        }
        Ok(parsed)
    }

    async fn poll_until_complete(
        &self,
        task_uuid: Uuid,
        expected: usize,
        mut collected: Vec<GenerationResult>,
        start: Instant,
    ) -> Result<Vec<GenerationResult>, ProviderError> {
        let poll = [GetResponseTask { task_type: TASK_GET_RESPONSE, task_uuid }];

        while collected.len() < expected {
            if start.elapsed() > self.timeout {
                return Err(ProviderError::Timeout(self.timeout));
            }
            tokio::time::sleep(self.poll_interval).await;

            let response = self.post_tasks(&poll).await?;
            absorb(response.data, task_uuid, &mut collected)?;
            debug!(
                task_uuid = %task_uuid,
                received = collected.len(),
                expected,
                elapsed_secs = start.elapsed().as_secs(),
                "polling Runware video inference"
            );
        }

        collected.truncate(expected);
        Ok(collected)
    }
}

#[async_trait]
impl VideoProvider for RunwareClient {
    async fn submit_video_generation(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GenerationResult>, ProviderError> {
        let task_uuid = Uuid::new_v4();
        let task = VideoInferenceTask::from_request(task_uuid, request);
        info!(
            task_uuid = %task_uuid,
            model = request.model(),
            "🎬 Submitting video inference ({}x{}, {} result(s))",
            request.width(),
            request.height(),
            request.number_results()
        );

        let start = Instant::now();
        let ack = self.post_tasks(&[task]).await?;
        let mut collected = Vec::new();
        absorb(ack.data, task_uuid, &mut collected)?;

        let expected = request.number_results() as usize;
        if collected.len() < expected {
            info!("⏳ Task accepted, waiting for {} video(s)...", expected - collected.len());
        }
        self.poll_until_complete(task_uuid, expected, collected, start).await
    }

    fn name(&self) -> &str {
        "Runware"
    }
}

fn parse_error(status: u16, text: &str) -> ProviderError {
    let message = serde_json::from_str::<RunwareResponse>(text)
        .ok()
        .and_then(|r| r.errors.into_iter().next())
        .and_then(|e| e.message)
        .unwrap_or_else(|| text.to_string());

    if status == 401 || status == 403 {
        return ProviderError::Auth(message);
    }
    ProviderError::Api { status, message }
}

/// Folds task items into `out`. Items tagged with another task, other task
/// types, still-processing items and duplicates are skipped.
fn absorb(items: Vec<TaskItem>, task_uuid: Uuid, out: &mut Vec<GenerationResult>) -> Result<(), ProviderError> {
    let ours = task_uuid.to_string();
    for item in items {
        if item.task_type.as_deref().is_some_and(|t| t != TASK_VIDEO_INFERENCE) {
            continue;
        }
        if item.task_uuid.as_deref().is_some_and(|id| !id.eq_ignore_ascii_case(&ours)) {
            continue;
        }

        match item.status.as_deref() {
            Some(s @ ("error" | "failed")) => {
                return Err(ProviderError::Task {
                    code: s.to_string(),
                    message: item.error.unwrap_or_else(|| "video generation failed".into()),
                });
            }
            Some("processing") | Some("pending") | Some("queued") => continue,
            None if item.video_url.is_none() => continue,
            _ => {}
        }

        let duplicate = out.iter().any(|r| {
            r.video_url == item.video_url.as_deref().unwrap_or_default()
                || (item.video_uuid.is_some() && r.video_uuid == item.video_uuid)
        });
        if duplicate {
            continue;
        }

        let (Some(video_url), Some(status)) = (item.video_url, item.status) else {
            return Err(ProviderError::Malformed(
                "result is missing videoURL or status".into(),
            ));
        };
        info!("🎥 Video ready: {}", video_url);
        out.push(GenerationResult {
            video_url,
            cost: item.cost,
            seed: item.seed,
            status,
            video_uuid: item.video_uuid,
        });
    }
    Ok(())
}

// --- Wire types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoInferenceTask<'a> {
    task_type: &'static str,
    #[serde(rename = "taskUUID")]
    task_uuid: Uuid,
    positive_prompt: &'a str,
    model: &'a str,
    width: u32,
    height: u32,
    number_results: u32,
    include_cost: bool,
    delivery_method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fps: Option<u32>,
}

impl<'a> VideoInferenceTask<'a> {
    fn from_request(task_uuid: Uuid, req: &'a GenerationRequest) -> Self {
        Self {
            task_type: TASK_VIDEO_INFERENCE,
            task_uuid,
            positive_prompt: req.prompt(),
            model: req.model(),
            width: req.width(),
            height: req.height(),
            number_results: req.number_results(),
            include_cost: req.include_cost(),
            delivery_method: "async",
            duration: req.duration(),
            fps: req.fps(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GetResponseTask {
    task_type: &'static str,
    #[serde(rename = "taskUUID")]
    task_uuid: Uuid,
}

#[derive(Debug, Deserialize)]
struct RunwareResponse {
    #[serde(default)]
    data: Vec<TaskItem>,
    #[serde(default)]
    errors: Vec<TaskErrorItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskItem {
    task_type: Option<String>,
    #[serde(rename = "taskUUID")]
    task_uuid: Option<String>,
    status: Option<String>,
    #[serde(rename = "videoURL")]
    video_url: Option<String>,
    #[serde(rename = "videoUUID")]
    video_uuid: Option<String>,
    cost: Option<f64>,
    seed: Option<i64>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskErrorItem {
    code: Option<String>,
    message: Option<String>,
}
