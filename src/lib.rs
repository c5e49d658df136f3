//! Submit a video generation task to Runware and forward every finished
//! video, tagged with a fresh task UUID, to a REST endpoint.

pub mod config;
pub mod error;
pub mod forwarder;
pub mod models;
pub mod payload;
pub mod pipeline;
pub mod provider;
pub mod report;
pub mod runware;

pub use config::Config;
pub use error::{ConfigError, ForwardError, ProviderError, RelayError};
pub use forwarder::Forwarder;
pub use models::{GenerationRequest, GenerationResult};
pub use payload::ForwardPayload;
pub use provider::VideoProvider;
pub use runware::RunwareClient;
