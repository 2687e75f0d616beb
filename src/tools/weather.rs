//! `get_weather`: current conditions from OpenWeatherMap.
//!
//! Failures never escape this tool. Upstream rejections and transport or
//! decoding errors are rendered as sentences the model can relay.

use async_trait::async_trait;
use serde::Deserialize;
use strum::Display;
use tracing::{debug, warn};

use super::arguments::ToolArguments;
use super::tool::{Tool, ToolExecutionContext};
use super::types::AgentToolParameters;
use crate::config::{ParleyConfig, DEFAULT_WEATHER_BASE_URL};
use crate::error::{ParleyError, Result};

pub const WEATHER_TOOL_NAME: &str = "get_weather";
pub const DEFAULT_UNIT: &str = "Celsius";

/// Unit system requested from the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum UnitSystem {
    Metric,
    Imperial,
}

impl UnitSystem {
    /// `celsius` in any case selects metric; every other label selects imperial.
    pub fn from_label(unit: &str) -> Self {
        if unit.to_lowercase() == "celsius" {
            Self::Metric
        } else {
            Self::Imperial
        }
    }
}

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    #[serde(alias = "Location")]
    location: String,
    #[serde(default = "default_unit", alias = "Unit")]
    unit: String,
}

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    weather: Vec<Condition>,
    main: Readings,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

// Kept as raw JSON numbers so `21` and `21.5` print exactly as sent.
#[derive(Debug, Deserialize)]
struct Readings {
    temp: serde_json::Number,
    feels_like: serde_json::Number,
}

/// Weather lookup tool backed by the OpenWeatherMap current-weather API.
pub struct WeatherTool {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    parameters: AgentToolParameters,
}

impl WeatherTool {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            // No timeout: a lookup waits as long as the upstream takes.
            client: reqwest::Client::new(),
            base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            api_key,
            parameters: AgentToolParameters::object()
                .string("location", "City to look up, e.g. \"Karachi\"", true)
                .string_with_default(
                    "unit",
                    "Temperature unit label: Celsius or Fahrenheit",
                    DEFAULT_UNIT,
                )
                .build(),
        }
    }

    pub fn from_config(config: &ParleyConfig) -> Self {
        Self::new(config.weather_api_key().map(str::to_string))
            .with_base_url(config.weather_base_url())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch the current weather as a sentence. Never fails.
    pub async fn get_weather(&self, location: &str, unit: &str) -> String {
        match self.fetch(location, unit).await {
            Ok(sentence) => sentence,
            Err(e) => {
                warn!(location, error = %e, "weather lookup failed");
                format!("Error fetching weather: {e}")
            }
        }
    }

    async fn fetch(&self, location: &str, unit: &str) -> Result<String> {
        let units = UnitSystem::from_label(unit);
        let url = format!("{}/weather", self.base_url.trim_end_matches('/'));

        let mut query = vec![("q", location.to_string())];
        if let Some(ref key) = self.api_key {
            query.push(("appid", key.clone()));
        }
        query.push(("units", units.to_string()));

        debug!(location, %units, "fetching weather");
        let resp = self.client.get(&url).query(&query).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        let data: serde_json::Value = serde_json::from_str(&body)?;

        if status != 200 {
            let reason = match data.get("message") {
                Some(serde_json::Value::String(message)) => message.clone(),
                Some(serde_json::Value::Null) | None => "Unknown error".to_string(),
                Some(other) => other.to_string(),
            };
            return Ok(format!(
                "Couldn't fetch weather for {location}. Reason: {reason}"
            ));
        }

        let current: CurrentWeather = serde_json::from_value(data)?;
        let description = current
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .ok_or_else(|| ParleyError::InvalidState("weather list is empty".into()))?;

        Ok(format!(
            "The weather in {location} is currently {description} with a temperature of {}°{unit}, feels like {}°{unit}.",
            current.main.temp, current.main.feels_like
        ))
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        WEATHER_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Fetch current weather for a given city using OpenWeatherMap API, return the weather."
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        _ctx: &ToolExecutionContext,
    ) -> std::result::Result<serde_json::Value, ParleyError> {
        let args: WeatherArgs = args.deserialize()?;
        let sentence = self.get_weather(&args.location, &args.unit).await;
        Ok(serde_json::Value::String(sentence))
    }
}

impl std::fmt::Debug for WeatherTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherTool")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
