use std::env;
use std::sync::Arc;

use crate::config::GeneratorConfig;
use crate::credit::{CreditLedger, InMemoryCreditLedger};
use crate::error::ConfigError;
use crate::generation::{Gateway, GenerationOrchestrator};
use crate::llm::{AiClient, GeminiAdapter, GeminiConfig, OpenAiAdapter, OpenAiConfig, ProviderAdapter};
use crate::pool::WorkerPool;
use crate::scrape::{CatalogSource, HttpCatalogSource, ScrapingClient};
use crate::task::TaskRegistry;

fn load_keys_with(primary: &str, prefix: &str, lookup: impl Fn(&str) -> Option<String>) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(raw) = lookup(primary) {
        for item in raw.split(',') {
            let trimmed = item.trim();
            if !trimmed.is_empty() {
                keys.push(trimmed.to_string());
            }
        }
    }
    for idx in 2..=10 {
        if let Some(value) = lookup(&format!("{}_{}", prefix, idx)) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                keys.push(trimmed.to_string());
            }
        }
    }
    keys
}

fn load_keys_from_env(primary: &str, prefix: &str) -> Vec<String> {
    load_keys_with(primary, prefix, |key| env::var(key).ok())
}

pub fn load_gemini_keys() -> Vec<String> {
    load_keys_from_env("GEMINI_API_KEY", "GEMINI_API_KEY")
}

pub fn load_openai_keys() -> Vec<String> {
    load_keys_from_env("OPENAI_API_KEY", "OPENAI_API_KEY")
}

pub fn build_adapter(cfg: &GeneratorConfig) -> Result<Arc<dyn ProviderAdapter>, ConfigError> {
    match cfg.provider.as_str() {
        "gemini" => {
            let api_keys = load_gemini_keys();
            if api_keys.is_empty() {
                return Err(missing_key("gemini", "GEMINI_API_KEY"));
            }
            let adapter = GeminiAdapter::new(GeminiConfig {
                api_keys,
                base_url: String::new(),
                model: cfg.model.clone(),
                temperature: cfg.temperature,
                max_output_tokens: cfg.max_output_tokens,
                timeout: cfg.request_timeout,
                google_search: true,
            })
            .map_err(|err| ConfigError::Client(err.to_string()))?;
            Ok(Arc::new(adapter))
        }
        "openai" => {
            let api_keys = load_openai_keys();
            if api_keys.is_empty() {
                return Err(missing_key("openai", "OPENAI_API_KEY"));
            }
            // The default model name belongs to the gemini family.
            let model = if cfg.model.starts_with("gemini") {
                String::new()
            } else {
                cfg.model.clone()
            };
            let adapter = OpenAiAdapter::new(OpenAiConfig {
                api_keys,
                endpoint: String::new(),
                model,
                temperature: cfg.temperature,
                timeout: cfg.request_timeout,
            })
            .map_err(|err| ConfigError::Client(err.to_string()))?;
            Ok(Arc::new(adapter))
        }
        other => Err(ConfigError::UnknownProvider(other.to_string())),
    }
}

fn missing_key(provider: &str, env: &str) -> ConfigError {
    ConfigError::MissingApiKey {
        provider: provider.to_string(),
        env: env.to_string(),
    }
}

/// Wires the full service from configuration and the process environment.
pub fn build_gateway(cfg: &GeneratorConfig) -> Result<Gateway, ConfigError> {
    let adapter = build_adapter(cfg)?;
    let source = HttpCatalogSource::new(cfg.scrape.clone()).map_err(|err| ConfigError::Client(err.to_string()))?;
    let ledger = Arc::new(InMemoryCreditLedger::new(cfg.initial_credit));
    Ok(build_gateway_with(cfg, adapter, Arc::new(source), ledger))
}

/// Wires the service around caller-supplied collaborators.
pub fn build_gateway_with(
    cfg: &GeneratorConfig,
    adapter: Arc<dyn ProviderAdapter>,
    source: Arc<dyn CatalogSource>,
    ledger: Arc<dyn CreditLedger>,
) -> Gateway {
    let ai = Arc::new(AiClient::new(adapter, cfg.retry.clone()));
    let pool = WorkerPool::new(cfg.pool.max_workers, cfg.pool.queue_capacity);
    let orchestrator = GenerationOrchestrator::new(ai, ScrapingClient::new(source), ledger, pool);
    Gateway::new(
        Arc::new(orchestrator),
        TaskRegistry::new(cfg.registry.clone()),
        cfg.wait_timeout,
    )
}
