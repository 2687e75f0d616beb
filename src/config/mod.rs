//! Configuration (layered: CLI overrides > process env > `.env` file).

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::{ParleyError, Result};

/// Default OpenAI-compatible endpoint for Gemini models.
pub const DEFAULT_MODEL_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";
/// Default model served through the compatibility endpoint.
pub const DEFAULT_MODEL_ID: &str = "gemini-2.0-flash";
/// Default OpenWeatherMap API root.
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
/// Default upper bound on one chat turn.
pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(120);

const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
const OPENWEATHER_API_KEY: &str = "OPENWEATHER_API_KEY";
const GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";
const GEMINI_MODEL: &str = "GEMINI_MODEL";
const OPENWEATHER_BASE_URL: &str = "OPENWEATHER_BASE_URL";
const TURN_TIMEOUT_SECS: &str = "PARLEY_TURN_TIMEOUT_SECS";

/// Process-wide settings, resolved once at startup.
#[derive(Clone)]
pub struct ParleyConfig {
    model_api_key: String,
    weather_api_key: Option<String>,
    model_base_url: String,
    model_id: String,
    weather_base_url: String,
    turn_timeout: Option<Duration>,
}

impl fmt::Debug for ParleyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParleyConfig")
            .field("model_api_key", &"<redacted>")
            .field(
                "weather_api_key",
                &self.weather_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("model_base_url", &self.model_base_url)
            .field("model_id", &self.model_id)
            .field("weather_base_url", &self.weather_base_url)
            .field("turn_timeout", &self.turn_timeout)
            .finish()
    }
}

impl ParleyConfig {
    /// Create a config with defaults for everything but the model credential.
    pub fn new(model_api_key: impl Into<String>) -> Self {
        Self {
            model_api_key: model_api_key.into(),
            weather_api_key: None,
            model_base_url: DEFAULT_MODEL_BASE_URL.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            weather_base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            turn_timeout: Some(DEFAULT_TURN_TIMEOUT),
        }
    }

    /// Load from environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from a specific dotenv file, falling back to the process environment.
    ///
    /// The file is read without touching the process environment.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            ParleyError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        let mut vars = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| {
                ParleyError::Configuration(format!("invalid line in {}: {e}", path.display()))
            })?;
            vars.insert(key, value);
        }
        Self::from_lookup(|key| vars.get(key).cloned().or_else(|| std::env::var(key).ok()))
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// Fails only when `GEMINI_API_KEY` is missing or empty, or when a
    /// value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let model_api_key = get(GEMINI_API_KEY).ok_or_else(|| {
            ParleyError::Configuration(format!(
                "{GEMINI_API_KEY} is not set. Please ensure it is defined in your .env file."
            ))
        })?;

        let mut config = Self::new(model_api_key);
        config.weather_api_key = get(OPENWEATHER_API_KEY);
        if let Some(url) = get(GEMINI_BASE_URL) {
            config.model_base_url = url;
        }
        if let Some(model) = get(GEMINI_MODEL) {
            config.model_id = model;
        }
        if let Some(url) = get(OPENWEATHER_BASE_URL) {
            config.weather_base_url = url;
        }
        if let Some(raw) = get(TURN_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ParleyError::Configuration(format!(
                    "{TURN_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'"
                ))
            })?;
            config.turn_timeout = timeout_from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_model_base_url(mut self, url: impl Into<String>) -> Self {
        self.model_base_url = url.into();
        self
    }

    pub fn with_weather_api_key(mut self, key: Option<String>) -> Self {
        self.weather_api_key = key;
        self
    }

    pub fn with_weather_base_url(mut self, url: impl Into<String>) -> Self {
        self.weather_base_url = url.into();
        self
    }

    /// Set the per-turn timeout; `None` waits indefinitely.
    pub fn with_turn_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.turn_timeout = timeout;
        self
    }

    pub fn model_api_key(&self) -> &str {
        &self.model_api_key
    }

    pub fn weather_api_key(&self) -> Option<&str> {
        self.weather_api_key.as_deref()
    }

    pub fn model_base_url(&self) -> &str {
        &self.model_base_url
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn weather_base_url(&self) -> &str {
        &self.weather_base_url
    }

    pub fn turn_timeout(&self) -> Option<Duration> {
        self.turn_timeout
    }
}

/// Zero seconds disables the timeout.
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
