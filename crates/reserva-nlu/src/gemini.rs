//! Google Gemini NLU adapter.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use reserva_core::config::NluConfig;
use reserva_core::validation;

use crate::adapter::NluAdapter;
use crate::error::NluError;
use crate::prompt::build_prompt;
use crate::types::{NluGuess, RawGuess};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Calls the Gemini `generateContent` endpoint and parses its JSON answer.
pub struct GeminiAdapter {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl GeminiAdapter {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build an adapter from the `[nlu]` config section.
    pub fn from_config(api_key: impl Into<String>, config: &NluConfig) -> Self {
        Self::new(api_key)
            .with_base_url(config.base_url.clone())
            .with_model(config.model.clone())
            .with_timeout(Duration::from_secs(config.timeout_secs))
    }

    /// Set a custom base URL (proxies, test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Per-request timeout. A timeout is reported like any other failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Request URL. The key travels in the `x-goog-api-key` header so it
    /// never appears in URLs carried by transport errors.
    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Analyze `text` relative to `today`, surfacing every failure.
    pub async fn try_analyze(&self, text: &str, today: NaiveDate) -> Result<NluGuess, NluError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(text, today) }] }],
            "generationConfig": { "responseMimeType": "application/json" }
        });

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NluError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateContentResponse = response.json().await?;
        let raw_text = payload.first_text().ok_or(NluError::EmptyResponse)?;
        tracing::debug!(model = %self.model, raw = %raw_text, "Gemini raw output");
        parse_guess(&raw_text)
    }
}

#[async_trait]
impl NluAdapter for GeminiAdapter {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn analyze(&self, text: &str) -> NluGuess {
        match self.try_analyze(text, validation::today()).await {
            Ok(guess) => {
                tracing::debug!(intent = ?guess.intent, notes = %guess.notes, "Gemini guess");
                guess
            }
            Err(e) => {
                tracing::warn!(error = %e, "Gemini analysis failed, falling back to unknown intent");
                NluGuess::unknown(format!("NLU unavailable: {}", e))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Parse model output into a guess, tolerating Markdown code fences and
/// prose around the JSON object.
pub fn parse_guess(raw: &str) -> Result<NluGuess, NluError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| NluError::Parse("no JSON object in output".to_string()))?;
    let parsed: RawGuess = serde_json::from_str(json)?;
    Ok(parsed.into_guess())
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // Drop the optional language tag on the opening fence.
        text = rest.split_once('\n').map_or(rest, |(_, body)| body);
        text = text.trim_end().trim_end_matches("```");
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
