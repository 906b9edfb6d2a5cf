use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::llm::RetryPolicy;
use crate::scrape::ScrapeConfig;
use crate::task::RegistryConfig;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Sizes the async runtime.
    pub core_workers: usize,
    pub max_workers: usize,
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            core_workers: 4,
            max_workers: 10,
            queue_capacity: 50,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub provider: String,
    pub model: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub registry: RegistryConfig,
    pub wait_timeout: Duration,
    pub pool: PoolConfig,
    pub scrape: ScrapeConfig,
    pub initial_credit: i64,
    pub port: u16,
    pub log_json: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.5,
            max_output_tokens: 8192,
            request_timeout: Duration::from_secs(20),
            retry: RetryPolicy::default(),
            registry: RegistryConfig::default(),
            wait_timeout: Duration::from_secs(60),
            pool: PoolConfig::default(),
            scrape: ScrapeConfig::default(),
            initial_credit: 10,
            port: 8080,
            log_json: true,
        }
    }
}

impl GeneratorConfig {
    /// Defaults overridden by `SPECGEN_*` variables. Values that fail to
    /// parse keep the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let parsed = |key: &str| var(key).and_then(|v| v.parse::<u64>().ok());

        Self {
            provider: var("SPECGEN_PROVIDER")
                .map(|v| v.to_ascii_lowercase())
                .unwrap_or(d.provider),
            model: var("SPECGEN_MODEL").unwrap_or(d.model),
            temperature: parse_or(var("SPECGEN_TEMPERATURE"), d.temperature),
            max_output_tokens: parse_or(var("SPECGEN_MAX_OUTPUT_TOKENS"), d.max_output_tokens),
            request_timeout: parsed("SPECGEN_REQUEST_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(d.request_timeout),
            retry: RetryPolicy {
                max_attempts: parse_or(var("SPECGEN_RETRY_MAX_ATTEMPTS"), d.retry.max_attempts),
                delay: parsed("SPECGEN_RETRY_DELAY_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(d.retry.delay),
            },
            registry: RegistryConfig {
                retention: parsed("SPECGEN_TASK_RETENTION_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(d.registry.retention),
                capacity: parse_or(var("SPECGEN_TASK_CAPACITY"), d.registry.capacity),
                sweep_interval: parsed("SPECGEN_TASK_SWEEP_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(d.registry.sweep_interval),
            },
            wait_timeout: parsed("SPECGEN_WAIT_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(d.wait_timeout),
            pool: PoolConfig {
                core_workers: parse_or(var("SPECGEN_POOL_CORE"), d.pool.core_workers),
                max_workers: parse_or(var("SPECGEN_POOL_MAX"), d.pool.max_workers),
                queue_capacity: parse_or(var("SPECGEN_POOL_QUEUE"), d.pool.queue_capacity),
            },
            scrape: ScrapeConfig {
                base_url: var("SPECGEN_SCRAPE_URL").unwrap_or(d.scrape.base_url),
                timeout: parsed("SPECGEN_SCRAPE_TIMEOUT_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(d.scrape.timeout),
                jitter: parsed("SPECGEN_SCRAPE_JITTER_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(d.scrape.jitter),
            },
            initial_credit: parse_or(var("SPECGEN_INITIAL_CREDIT"), d.initial_credit),
            port: parse_or(var("PORT"), d.port),
            log_json: var("SPECGEN_LOG_JSON")
                .map(|v| !matches!(v.as_str(), "0" | "false" | "no"))
                .unwrap_or(d.log_json),
        }
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.parse().ok()).unwrap_or(default)
}
