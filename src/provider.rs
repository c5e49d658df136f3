//! Video provider seam.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::models::{GenerationRequest, GenerationResult};

/// A service that turns a [`GenerationRequest`] into finished videos.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Submits the request and waits for every result. Either all
    /// `number_results` videos come back, or the call fails.
    async fn submit_video_generation(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GenerationResult>, ProviderError>;

    /// Display name used in logs.
    fn name(&self) -> &str;
}
