use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::rotation::KeyRing;
use super::types::{
    error_for_status, transport_error, CompletionRequest, LLMResponse, ProviderAdapter, ProviderError,
};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAiConfig {
    pub api_keys: Vec<String>,
    pub endpoint: String,
    pub model: String,
    pub temperature: f64,
    pub timeout: Duration,
}

/// Chat-completions backend asked for a JSON object response.
pub struct OpenAiAdapter {
    cfg: OpenAiConfig,
    keys: KeyRing,
    client: Client,
}

impl OpenAiAdapter {
    pub fn new(mut cfg: OpenAiConfig) -> Result<Self, ProviderError> {
        if cfg.endpoint.is_empty() {
            cfg.endpoint = DEFAULT_ENDPOINT.to_string();
        }
        if cfg.model.is_empty() {
            cfg.model = "gpt-4o".to_string();
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
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<LLMResponse, ProviderError> {
        let key = self
            .keys
            .next()
            .ok_or_else(|| ProviderError::new("auth_error", "no OpenAI API keys", false))?;
        let payload = json!({
            "model": self.cfg.model,
            "messages": [{"role": "user", "content": request.prompt}],
            "temperature": request.temperature.unwrap_or(self.cfg.temperature),
            "response_format": {"type": "json_object"},
        });

        debug!(lookup = %request.lookup, model = %self.cfg.model, "sending openai request");
        let resp = self
            .client
            .post(&self.cfg.endpoint)
            .bearer_auth(key)
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
            .map_err(|_| ProviderError::malformed("openai response is not valid json"))?;
        let content = extract_content(&raw)?;
        Ok(LLMResponse {
            content,
            raw: Some(raw),
        })
    }
}

fn extract_content(raw: &Value) -> Result<String, ProviderError> {
    raw.pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| ProviderError::malformed("openai response has no message content"))
}
