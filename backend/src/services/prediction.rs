use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::models::{ExpertSettings, Greenhouse};
use crate::services::validation::{validate_settings, SetpointBounds};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Error types for setpoint prediction. The kinds are deliberately distinct:
/// a missing API key, a failed request and a malformed model response need
/// different operator reactions.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// The adapter is not configured (missing or placeholder API key).
    Config(String),
    /// The request could not be completed (network, HTTP status).
    Transport(String),
    /// The model answered, but not with a usable setpoint pair.
    Schema(String),
}

impl std::fmt::Display for PredictionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredictionError::Config(msg) => write!(f, "Prediction not configured: {}", msg),
            PredictionError::Transport(msg) => write!(f, "Prediction request failed: {}", msg),
            PredictionError::Schema(msg) => write!(f, "Unusable model response: {}", msg),
        }
    }
}

impl std::error::Error for PredictionError {}

/// Produces a candidate day/night setpoint pair from a greenhouse snapshot.
#[async_trait]
pub trait PredictionProvider: Send + Sync {
    async fn predict(&self, greenhouse: &Greenhouse) -> Result<ExpertSettings, PredictionError>;
}

/// Prediction adapter backed by the Gemini `generateContent` API.
pub struct GeminiPredictor {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    bounds: SetpointBounds,
}

impl GeminiPredictor {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url: GEMINI_BASE_URL.to_string(),
            bounds: SetpointBounds::default(),
        }
    }

    /// Read `GEMINI_API_KEY` / `GEMINI_MODEL` from the environment. An unset
    /// key still yields a predictor; it fails with a config error on use.
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
        let model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        if api_key.is_empty() {
            log::warn!("GEMINI_API_KEY is not set; setpoint prediction will be unavailable");
        }
        Self::new(api_key, model)
    }
}

#[async_trait]
impl PredictionProvider for GeminiPredictor {
    async fn predict(&self, greenhouse: &Greenhouse) -> Result<ExpertSettings, PredictionError> {
        if self.api_key.is_empty() {
            return Err(PredictionError::Config(
                "GEMINI_API_KEY is not set".to_string(),
            ));
        }

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(greenhouse) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
            }
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PredictionError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| PredictionError::Transport(e.to_string()))?;

        let generated: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| PredictionError::Schema(e.to_string()))?;

        let text = generated
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| {
                PredictionError::Schema("response contains no candidate text".to_string())
            })?;

        let prediction = parse_prediction(&text)?;
        validate_settings(&prediction, &self.bounds)
            .map_err(|e| PredictionError::Schema(format!("model setpoints rejected: {}", e)))?;
        Ok(prediction)
    }
}

/// The prompt asks the model to analyze the snapshot
/// and return optimal day and night settings, where the temperature
/// differential (dry bulb vs wet bulb) is the humidity-control proxy.
fn build_prompt(greenhouse: &Greenhouse) -> String {
    format!(
        "Analyze the provided greenhouse data and generate the optimal \
         environment settings to maximize crop yield.\n\
         \n\
         Greenhouse name: {name}\n\
         Current crop: assume a typical crop based on the name \
         (e.g. 'tomato' for a 'Tomato House').\n\
         Current sensor data:\n\
         - Temperature: {temp} C\n\
         - Humidity: {humidity} %\n\
         - CO2: {co2} ppm\n\
         - Time of day: {time_of_day}\n\
         \n\
         Based on this, provide optimal settings for both 'day' and 'night'. \
         'temp_diff' is the ideal difference between dry-bulb and wet-bulb \
         temperature, used as a proxy for humidity control.",
        name = greenhouse.name,
        temp = greenhouse.sensor_data.temp,
        humidity = greenhouse.sensor_data.humidity,
        co2 = greenhouse.sensor_data.co2,
        time_of_day = if greenhouse.sensor_data.is_day { "day" } else { "night" },
    )
}

fn response_schema() -> serde_json::Value {
    let setpoint = json!({
        "type": "OBJECT",
        "properties": {
            "temp_min": { "type": "NUMBER" },
            "temp_max": { "type": "NUMBER" },
            "temp_diff_min": { "type": "NUMBER" },
            "temp_diff_max": { "type": "NUMBER" }
        },
        "required": ["temp_min", "temp_max", "temp_diff_min", "temp_diff_max"]
    });
    json!({
        "type": "OBJECT",
        "properties": { "day": setpoint, "night": setpoint },
        "required": ["day", "night"]
    })
}

/// Parse the model's JSON text into a setpoint pair. Both `day` and `night`
/// must be present with all four fields.
pub fn parse_prediction(text: &str) -> Result<ExpertSettings, PredictionError> {
    serde_json::from_str(text.trim()).map_err(|e| PredictionError::Schema(e.to_string()))
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: String,
}
