use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;
use crate::models::{GenerationRequest, DEFAULT_HEIGHT, DEFAULT_MODEL, DEFAULT_PROMPT, DEFAULT_WIDTH};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/videos";
pub const DEFAULT_PROVIDER_BASE: &str = "https://api.runware.ai/v1";

/// Runtime settings, read once at startup.
///
/// | Env Var                     | Default                              |
/// |-----------------------------|--------------------------------------|
/// | `PROVIDER_API_KEY`          | required (`RUNWARE_API_KEY` accepted)|
/// | `VIDEO_API_ENDPOINT`        | `http://localhost:3000/api/videos`   |
/// | `PROVIDER_API_BASE`         | `https://api.runware.ai/v1`          |
/// | `PROVIDER_TIMEOUT_SECS`     | `600`                                |
/// | `PROVIDER_POLL_INTERVAL_MS` | `2000`                               |
/// | `FORWARD_TIMEOUT_SECS`      | `30`                                 |
/// | `VIDEO_PROMPT`              | eagle demo prompt                    |
/// | `VIDEO_MODEL`               | `google:3@1`                         |
/// | `VIDEO_WIDTH` / `VIDEO_HEIGHT` | `1280` / `720`                    |
/// | `VIDEO_NUMBER_RESULTS`      | `1`                                  |
/// | `VIDEO_INCLUDE_COST`        | `true`                               |
/// | `VIDEO_DURATION` / `VIDEO_FPS` | unset                             |
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    /// `None` when `VIDEO_API_ENDPOINT` is set but blank.
    pub endpoint: Option<String>,
    pub provider_base: String,
    pub provider_timeout: Duration,
    pub poll_interval: Duration,
    pub forward_timeout: Duration,
    pub request: GenerationRequest,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("PROVIDER_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .or_else(|| lookup("RUNWARE_API_KEY").filter(|k| !k.trim().is_empty()))
            .ok_or(ConfigError::MissingApiKey)?;

        let endpoint = match lookup("VIDEO_API_ENDPOINT") {
            None => Some(DEFAULT_ENDPOINT.to_string()),
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(validate_url("VIDEO_API_ENDPOINT", v.trim())?),
        };

        let provider_base = match lookup("PROVIDER_API_BASE") {
            Some(v) if !v.trim().is_empty() => validate_url("PROVIDER_API_BASE", v.trim())?,
            _ => DEFAULT_PROVIDER_BASE.to_string(),
        };

        let provider_timeout = Duration::from_secs(parse_positive(&lookup, "PROVIDER_TIMEOUT_SECS", 600)?);
        let poll_interval = Duration::from_millis(parse_positive(&lookup, "PROVIDER_POLL_INTERVAL_MS", 2000)?);
        let forward_timeout = Duration::from_secs(parse_positive(&lookup, "FORWARD_TIMEOUT_SECS", 30)?);

        let text_or = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let mut builder = GenerationRequest::builder(text_or("VIDEO_PROMPT", DEFAULT_PROMPT))
            .model(text_or("VIDEO_MODEL", DEFAULT_MODEL))
            .dimensions(
                parse_or(&lookup, "VIDEO_WIDTH", DEFAULT_WIDTH)?,
                parse_or(&lookup, "VIDEO_HEIGHT", DEFAULT_HEIGHT)?,
            )
            .number_results(parse_or(&lookup, "VIDEO_NUMBER_RESULTS", 1u32)?)
            .include_cost(parse_or(&lookup, "VIDEO_INCLUDE_COST", true)?);
        if let Some(d) = parse_opt::<f64, _>(&lookup, "VIDEO_DURATION")? {
            builder = builder.duration(d);
        }
        if let Some(fps) = parse_opt::<u32, _>(&lookup, "VIDEO_FPS")? {
            builder = builder.fps(fps);
        }

        Ok(Self {
            api_key,
            endpoint,
            provider_base,
            provider_timeout,
            poll_interval,
            forward_timeout,
            request: builder.build()?,
        })
    }

    /// First few characters of the key, safe to log.
    pub fn masked_api_key(&self) -> String {
        let visible: String = self.api_key.chars().take(4).collect();
        format!("{visible}***")
    }
}

pub(crate) fn validate_url(key: &str, raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::invalid(key, format!("{raw:?} is not a URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(key, format!("unsupported scheme {:?}", url.scheme())));
    }
    Ok(raw.to_string())
}

fn parse_opt<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::invalid(key, format!("{v:?}: {e}"))),
        _ => Ok(None),
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_opt(lookup, key)?.unwrap_or(default))
}

/// Like [`parse_or`], but zero is rejected.
fn parse_positive<F>(lookup: &F, key: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_or(lookup, key, default)? {
        0 => Err(ConfigError::invalid(key, "must be positive")),
        n => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = Config::from_lookup(lookup_from(&[("PROVIDER_API_KEY", "rw-secret-key")])).unwrap();
        assert_eq!(config.api_key, "rw-secret-key");
        assert_eq!(config.endpoint.as_deref(), Some(DEFAULT_ENDPOINT));
        assert_eq!(config.provider_base, DEFAULT_PROVIDER_BASE);
        assert_eq!(config.provider_timeout, Duration::from_secs(600));
        assert_eq!(config.poll_interval, Duration::from_millis(2000));
        assert_eq!(config.forward_timeout, Duration::from_secs(30));
        assert_eq!(config.request.model(), DEFAULT_MODEL);
        assert_eq!(config.request.prompt(), DEFAULT_PROMPT);
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));

        let err = Config::from_lookup(lookup_from(&[("PROVIDER_API_KEY", "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn legacy_key_name_is_accepted() {
        let config = Config::from_lookup(lookup_from(&[("RUNWARE_API_KEY", "legacy")])).unwrap();
        assert_eq!(config.api_key, "legacy");
    }

    #[test]
    fn blank_endpoint_means_not_configured() {
        let config = Config::from_lookup(lookup_from(&[
            ("PROVIDER_API_KEY", "k"),
            ("VIDEO_API_ENDPOINT", ""),
        ]))
        .unwrap();
        assert_eq!(config.endpoint, None);
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("PROVIDER_API_KEY", "k"),
            ("VIDEO_API_ENDPOINT", "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "VIDEO_API_ENDPOINT"));
    }

    #[test]
    fn request_overrides_are_read() {
        let config = Config::from_lookup(lookup_from(&[
            ("PROVIDER_API_KEY", "k"),
            ("VIDEO_PROMPT", "A dog climbing a tree"),
            ("VIDEO_MODEL", "bytedance:1@1"),
            ("VIDEO_WIDTH", "864"),
            ("VIDEO_HEIGHT", "480"),
            ("VIDEO_NUMBER_RESULTS", "2"),
            ("VIDEO_INCLUDE_COST", "false"),
            ("VIDEO_DURATION", "5"),
            ("VIDEO_FPS", "24"),
        ]))
        .unwrap();
        let req = &config.request;
        assert_eq!(req.prompt(), "A dog climbing a tree");
        assert_eq!(req.model(), "bytedance:1@1");
        assert_eq!((req.width(), req.height()), (864, 480));
        assert_eq!(req.number_results(), 2);
        assert!(!req.include_cost());
        assert_eq!(req.duration(), Some(5.0));
        assert_eq!(req.fps(), Some(24));
    }

    #[test]
    fn unparseable_number_names_the_variable() {
        let err = Config::from_lookup(lookup_from(&[
            ("PROVIDER_API_KEY", "k"),
            ("VIDEO_WIDTH", "wide"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "VIDEO_WIDTH"));
    }

    #[test]
    fn masked_key_hides_the_secret() {
        let config = Config::from_lookup(lookup_from(&[("PROVIDER_API_KEY", "abcdefghijkl")])).unwrap();
        assert_eq!(config.masked_api_key(), "abcd***");
    }

    #[test]
    fn zero_durations_are_rejected() {
        for key in ["PROVIDER_TIMEOUT_SECS", "PROVIDER_POLL_INTERVAL_MS", "FORWARD_TIMEOUT_SECS"] {
            let err = Config::from_lookup(lookup_from(&[("PROVIDER_API_KEY", "k"), (key, "0")]))
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: ref k, ref reason } if k == key && reason == "must be positive"),
                "{key} accepted zero: {err:?}"
            );
        }
    }

    #[test]
    fn blank_prompt_and_model_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("PROVIDER_API_KEY", "k"),
            ("VIDEO_PROMPT", "  "),
            ("VIDEO_MODEL", ""),
        ]))
        .unwrap();
        assert_eq!(config.request.prompt(), DEFAULT_PROMPT);
        assert_eq!(config.request.model(), DEFAULT_MODEL);
    }
}
