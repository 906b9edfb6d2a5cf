use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const MALFORMED: &str = "malformed";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    /// Which lookup issued the request; used for logging and by test doubles.
    pub lookup: String,
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(lookup: &str, prompt: String) -> Self {
        Self {
            prompt,
            lookup: lookup.to_string(),
            temperature: None,
            max_output_tokens: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub raw: Option<Value>,
}

#[derive(Clone, Debug, Error)]
#[error("{code}: {message}")]
pub struct ProviderError {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl ProviderError {
    pub fn new(code: &str, message: &str, retryable: bool) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            retryable,
        }
    }

    pub fn malformed(message: &str) -> Self {
        Self::new(MALFORMED, message, false)
    }

    pub fn is_malformed(&self) -> bool {
        self.code == MALFORMED
    }
}

/// Maps an error status from a generation backend onto a `ProviderError`.
///
/// Overload and temporary unavailability (429, 5xx) are retryable; every
/// other client error is final.
pub fn error_for_status(status: u16, body: &str) -> ProviderError {
    let lowered = body.to_lowercase();
    match status {
        401 | 403 => ProviderError::new("auth_error", body, false),
        429 => ProviderError::new("rate_limit", body, true),
        500..=599 => ProviderError::new("server_error", body, true),
        _ if lowered.contains("resource_exhausted") => ProviderError::new("rate_limit", body, true),
        _ => ProviderError::new("api_error", body, false),
    }
}

pub fn transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::new("timeout", &err.to_string(), true)
    } else {
        ProviderError::new("network_error", &err.to_string(), true)
    }
}

#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn complete(&self, request: CompletionRequest) -> Result<LLMResponse, ProviderError>;
}
