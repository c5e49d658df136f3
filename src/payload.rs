//! Forward payload shaping. Pure: no I/O, no logging.

use serde::Serialize;
use uuid::Uuid;

use crate::models::{GenerationRequest, GenerationResult};

/// Fresh correlation id for one forwarded result.
pub fn new_task_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Flat record posted to the forwarding endpoint.
///
/// Every key is always serialized; a missing source value becomes `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardPayload {
    #[serde(rename = "taskUUID")]
    pub task_uuid: Uuid,
    #[serde(rename = "videoURL")]
    pub video_url: Option<String>,
    pub cost: Option<f64>,
    pub seed: Option<i64>,
    pub status: Option<String>,
    pub prompt: Option<String>,
    pub model: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ForwardPayload {
    pub const KEYS: [&'static str; 9] = [
        "taskUUID", "videoURL", "cost", "seed", "status", "prompt", "model", "width", "height",
    ];

    pub fn build(task_uuid: Uuid, result: &GenerationResult, request: &GenerationRequest) -> Self {
        Self {
            task_uuid,
            video_url: Some(result.video_url.clone()),
            cost: result.cost,
            seed: result.seed,
            status: Some(result.status.clone()),
            prompt: Some(request.prompt().to_string()),
            model: Some(request.model().to_string()),
            width: Some(request.width()),
            height: Some(request.height()),
        }
    }
}
