//! Human-readable progress and outcome reporting, routed through `tracing`.

use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::ForwardError;
use crate::models::{GenerationRequest, GenerationResult};
use crate::payload::ForwardPayload;
use crate::pipeline::RunSummary;

pub fn submission_started(provider: &str, request: &GenerationRequest) {
    let preview: String = request.prompt().chars().take(100).collect();
    info!("🚀 Generating video with {} (model {}): {}", provider, request.model(), preview);
}

pub fn results_received(results: &[GenerationResult]) {
    info!("✅ Provider returned {} video(s)", results.len());
    for video in results {
        info!("Video URL: {}", video.video_url);
        info!("Cost: {}", display_opt(video.cost));
        info!("Seed: {}", display_opt(video.seed));
        info!("Status: {}", video.status);
    }
}

pub fn forward_outcome(payload: &ForwardPayload, outcome: &Result<Value, ForwardError>) {
    match outcome {
        Ok(body) => info!(task_uuid = %payload.task_uuid, "✅ Video data delivered: {}", body),
        Err(ForwardError::Rejected { status, body }) => error!(
            task_uuid = %payload.task_uuid,
            "❌ Endpoint rejected video data: status {} body {}",
            status,
            body
        ),
        Err(e) => error!(task_uuid = %payload.task_uuid, "❌ Failed to send video data: {}", e),
    }
}

pub fn summary(summary: &RunSummary) {
    if summary.failed() == 0 {
        info!("🎉 Forwarded {} of {} video(s)", summary.delivered(), summary.results.len());
    } else {
        warn!(
            "⚠️ Forwarded {} of {} video(s), {} failed",
            summary.delivered(),
            summary.results.len(),
            summary.failed()
        );
    }
}

fn display_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "n/a".into())
}
