#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use specgen_rs::credit::{CreditLedger, InMemoryCreditLedger, LedgerError};
use specgen_rs::helpers::build_gateway_with;
use specgen_rs::llm::{CompletionRequest, LLMResponse, ProviderAdapter, ProviderError};
use specgen_rs::scrape::{CatalogSource, ScrapeError};
use specgen_rs::{Gateway, GeneratorConfig};

pub const MAIN: &str = "main_spec";
pub const CERT: &str = "certification";
pub const GENERAL: &str = "general_spec";

struct Reply {
    delay: Duration,
    result: Result<String, ProviderError>,
}

/// Generation backend answering from per-lookup scripts.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, lookup: &str, result: Result<String, ProviderError>) -> Self {
        self.reply_after(lookup, Duration::ZERO, result)
    }

    pub fn reply_after(self, lookup: &str, delay: Duration, result: Result<String, ProviderError>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(lookup.to_string())
            .or_default()
            .push_back(Reply { delay, result });
        self
    }

    pub fn calls(&self, lookup: &str) -> usize {
        self.calls.lock().unwrap().get(lookup).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<LLMResponse, ProviderError> {
        *self.calls.lock().unwrap().entry(request.lookup.clone()).or_default() += 1;
        let next = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&request.lookup)
            .and_then(|queue| queue.pop_front());
        let Some(reply) = next else {
            return Err(ProviderError::new("api_error", "script exhausted", false));
        };
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result.map(|content| LLMResponse { content, raw: None })
    }
}

/// Catalog answering every search with the same page or error.
pub struct FakeCatalog {
    page: Result<String, ScrapeError>,
    delay: Duration,
}

impl FakeCatalog {
    pub fn page(html: String) -> Self {
        Self {
            page: Ok(html),
            delay: Duration::ZERO,
        }
    }

    pub fn timing_out() -> Self {
        Self {
            page: Err(ScrapeError::Timeout),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn search(&self, _query: &str) -> Result<String, ScrapeError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.page.clone()
    }
}

/// In-memory ledger that counts `adjust` calls and can be told to fail them.
pub struct CountingLedger {
    inner: InMemoryCreditLedger,
    adjustments: AtomicUsize,
    fail_adjust: bool,
}

impl CountingLedger {
    pub fn new(initial_credit: i64) -> Self {
        Self {
            inner: InMemoryCreditLedger::new(initial_credit),
            adjustments: AtomicUsize::new(0),
            fail_adjust: false,
        }
    }

    pub fn failing(initial_credit: i64) -> Self {
        Self {
            fail_adjust: true,
            ..Self::new(initial_credit)
        }
    }

    pub fn adjustments(&self) -> usize {
        self.adjustments.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CreditLedger for CountingLedger {
    async fn balance(&self, principal: &str) -> Result<i64, LedgerError> {
        self.inner.balance(principal).await
    }

    async fn adjust(&self, principal: &str, delta: i64) -> Result<i64, LedgerError> {
        self.adjustments.fetch_add(1, Ordering::SeqCst);
        if self.fail_adjust {
            return Err(LedgerError::Unavailable("ledger offline".to_string()));
        }
        self.inner.adjust(principal, delta).await
    }
}

pub fn spec_reply(model: &str, country: &str) -> Result<String, ProviderError> {
    Ok(format!(
        "Here is the data:\n```json\n{{\"productName\":\"Air purifier\",\"specification\":\"40m2, HEPA\",\
         \"modelName\":\"{}\",\"manufacturer\":\"Samsung\",\"countryOfOrigin\":\"{}\"}}\n```",
        model, country
    ))
}

pub fn cert_reply() -> Result<String, ProviderError> {
    Ok("{\"katsCertificationNumber\":\"HU07123-20001\",\"kcCertificationNumber\":\"R-R-SEC-AX40\"}".to_string())
}

pub fn general_reply() -> Result<String, ProviderError> {
    Ok("{\"productName\":\"Office desk\",\"specification\":\"1200x600x720mm\",\"manufacturer\":null}".to_string())
}

pub fn transient() -> Result<String, ProviderError> {
    Err(ProviderError::new("server_error", "503 model overloaded", true))
}

pub fn catalog_page(label: &str, country_code: &str) -> String {
    format!(
        r#"<html><body><ul class="search bb_d7dbe4">
<li><div class="searchListImgTit">Air purifier <span class="searchKeyword">AX40</span> ({country_code})</div>
<div class="searchLabel_blue"><span class="labelNum">{label}</span></div></li>
</ul></body></html>"#
    )
}

pub fn config(wait_timeout: Duration) -> GeneratorConfig {
    GeneratorConfig {
        wait_timeout,
        ..GeneratorConfig::default()
    }
}

pub fn gateway(
    cfg: &GeneratorConfig,
    backend: Arc<ScriptedBackend>,
    catalog: FakeCatalog,
    ledger: Arc<CountingLedger>,
) -> Gateway {
    build_gateway_with(cfg, backend, Arc::new(catalog), ledger)
}
