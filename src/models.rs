use crate::error::ConfigError;

pub const DEFAULT_PROMPT: &str =
    "A majestic eagle soaring through mountain peaks at golden hour, cinematic view";
pub const DEFAULT_MODEL: &str = "google:3@1";
pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;

/// A single video generation job. Built once through [`GenerationRequestBuilder`]
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    prompt: String,
    model: String,
    width: u32,
    height: u32,
    number_results: u32,
    include_cost: bool,
    duration: Option<f64>,
    fps: Option<u32>,
}

impl GenerationRequest {
    pub fn builder(prompt: impl Into<String>) -> GenerationRequestBuilder {
        GenerationRequestBuilder::new(prompt)
    }

    pub fn prompt(&self) -> &str { &self.prompt }
    pub fn model(&self) -> &str { &self.model }
    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }
    pub fn number_results(&self) -> u32 { self.number_results }
    pub fn include_cost(&self) -> bool { self.include_cost }
    /// Clip length in seconds, when the caller asked for one.
    pub fn duration(&self) -> Option<f64> { self.duration }
    pub fn fps(&self) -> Option<u32> { self.fps }
}

#[derive(Debug, Clone)]
pub struct GenerationRequestBuilder {
    prompt: String,
    model: String,
    width: u32,
    height: u32,
    number_results: u32,
    include_cost: bool,
    duration: Option<f64>,
    fps: Option<u32>,
}

impl GenerationRequestBuilder {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: DEFAULT_MODEL.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            number_results: 1,
            include_cost: true,
            duration: None,
            fps: None,
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn number_results(mut self, count: u32) -> Self {
        self.number_results = count;
        self
    }

    pub fn include_cost(mut self, include: bool) -> Self {
        self.include_cost = include;
        self
    }

    pub fn duration(mut self, secs: f64) -> Self {
        self.duration = Some(secs);
        self
    }

    pub fn fps(mut self, fps: u32) -> Self {
        self.fps = Some(fps);
        self
    }

    pub fn build(self) -> Result<GenerationRequest, ConfigError> {
        if self.prompt.trim().is_empty() {
            return Err(ConfigError::InvalidRequest("prompt must not be empty".into()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidRequest("model identifier must not be empty".into()));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidRequest(format!(
                "dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.number_results == 0 {
            return Err(ConfigError::InvalidRequest("result count must be at least 1".into()));
        }
        if let Some(d) = self.duration {
            if !d.is_finite() || d <= 0.0 {
                return Err(ConfigError::InvalidRequest(format!("duration must be positive, got {d}")));
            }
        }
        if self.fps == Some(0) {
            return Err(ConfigError::InvalidRequest("fps must be positive".into()));
        }

        Ok(GenerationRequest {
            prompt: self.prompt,
            model: self.model,
            width: self.width,
            height: self.height,
            number_results: self.number_results,
            include_cost: self.include_cost,
            duration: self.duration,
            fps: self.fps,
        })
    }
}

/// One finished video as reported by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub video_url: String,
    pub cost: Option<f64>,
    pub seed: Option<i64>,
    pub status: String,
    /// Provider-side id of the video, only used for logging.
    pub video_uuid: Option<String>,
}
