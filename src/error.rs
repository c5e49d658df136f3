use std::time::Duration;
use thiserror::Error;

/// Missing or unusable settings. Always raised before any network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PROVIDER_API_KEY not set (or empty). Please check your .env file.")]
    MissingApiKey,
    #[error("no forwarding endpoint: pass one explicitly or set VIDEO_API_ENDPOINT")]
    MissingEndpoint,
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
    #[error("invalid generation request: {0}")]
    InvalidRequest(String),
    #[error("failed to initialise HTTP client: {0}")]
    HttpClient(String),
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::Invalid { key: key.to_string(), reason: reason.into() }
    }
}

/// Failures talking to the video provider. These abort the flow.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The provider accepted the request but reported a task failure.
    #[error("generation failed ({code}): {message}")]
    Task { code: String, message: String },

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
}

/// Failures delivering a payload to the forwarding endpoint. Recoverable:
/// they are reported and handed back to the caller, never retried.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("endpoint responded with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("endpoint returned a non-JSON body: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("forward error: {0}")]
    Forward(#[from] ForwardError),
}

impl RelayError {
    /// Configuration and provider failures end the run; forward failures do not.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Forward(_))
    }
}
