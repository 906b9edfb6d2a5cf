use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::rotation::KeyRing;
use super::types::{
    error_for_status, transport_error, CompletionRequest, LLMResponse, ProviderAdapter, ProviderError,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

pub struct GeminiConfig {
    pub api_keys: Vec<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub timeout: Duration,
    /// Lets the model ground its answer with Google Search.
    pub google_search: bool,
}

pub struct GeminiAdapter {
    cfg: GeminiConfig,
    keys: KeyRing,
    client: Client,
}

impl GeminiAdapter {
    pub fn new(mut cfg: GeminiConfig) -> Result<Self, ProviderError> {
        if cfg.base_url.is_empty() {
            cfg.base_url = DEFAULT_BASE_URL.to_string();
        }
        if cfg.model.is_empty() {
            cfg.model = DEFAULT_MODEL.to_string();
        }
        if cfg.temperature == 0.0 {
            cfg.temperature = 0.5;
        }
        if cfg.max_output_tokens == 0 {
            cfg.max_output_tokens = 8192;
        }
        let client = Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|err| ProviderError::new("client_error", &err.to_string(), false))?;
        Ok(Self {
            keys: KeyRing::new(cfg.api_keys.clone()),
            cfg,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.cfg.base_url.trim_end_matches('/'),
            self.cfg.model
        )
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<LLMResponse, ProviderError> {
        let key = self
            .keys
            .next()
            .ok_or_else(|| ProviderError::new("auth_error", "no Gemini API keys", false))?;
        let payload = build_payload(&request, &self.cfg);

        debug!(lookup = %request.lookup, model = %self.cfg.model, "sending gemini request");
        let resp = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", key)
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        let body = resp.text().await.map_err(transport_error)?;
        if status.is_client_error() || status.is_server_error() {
            return Err(error_for_status(status.as_u16(), &body));
        }

        let raw: Value = serde_json::from_str(&body)
            .map_err(|_| ProviderError::malformed("gemini response is not valid json"))?;
        let content = extract_text(&raw)?;
        Ok(LLMResponse {
            content,
            raw: Some(raw),
        })
    }
}

fn build_payload(request: &CompletionRequest, cfg: &GeminiConfig) -> Value {
    let mut payload = json!({
        "contents": [
            {"parts": [{"text": request.prompt}]}
        ],
        "generationConfig": {
            "temperature": request.temperature.unwrap_or(cfg.temperature),
            "maxOutputTokens": request.max_output_tokens.unwrap_or(cfg.max_output_tokens),
        }
    });
    if cfg.google_search {
        payload["tools"] = json!([{"google_search": {}}]);
    }
    payload
}

/// Joins the non-empty `text` parts of the first candidate with newlines.
fn extract_text(raw: &Value) -> Result<String, ProviderError> {
    let first = raw
        .get("candidates")
        .and_then(|v| v.as_array())
        .and_then(|list| list.first())
        .ok_or_else(|| ProviderError::malformed("gemini response has no candidates"))?;
    let parts = first
        .get("content")
        .and_then(|content| content.get("parts"))
        .and_then(|v| v.as_array())
        .filter(|parts| !parts.is_empty())
        .ok_or_else(|| ProviderError::malformed("gemini response has no content parts"))?;

    let text = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|v| v.as_str()))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if text.is_empty() {
        return Err(ProviderError::malformed("gemini response has no text"));
    }
    Ok(text)
}
