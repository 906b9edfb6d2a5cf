use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{info, warn};

use super::lookups::{CertificationLookup, GeneralSpecLookup, Lookup, MainSpecLookup};
use super::retry::{RetryFailure, RetryPolicy};
use super::types::{CompletionRequest, ProviderAdapter};
use crate::error::GenerationError;
use crate::result::{CertificationNumbers, GeneralSpecResult, MainSpec};

/// Issues generation-backend lookups with the transient-failure retry policy.
pub struct AiClient {
    adapter: Arc<dyn ProviderAdapter>,
    retry: RetryPolicy,
    retries: AtomicU64,
}

impl AiClient {
    pub fn new(adapter: Arc<dyn ProviderAdapter>, retry: RetryPolicy) -> Self {
        Self {
            adapter,
            retry,
            retries: AtomicU64::new(0),
        }
    }

    /// Attempts made beyond the first one, across all lookups.
    pub fn retry_count(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }

    pub async fn fetch_main_spec(
        &self,
        model: &str,
        spec_example: &str,
        product_name_example: Option<&str>,
    ) -> Result<MainSpec, GenerationError> {
        self.lookup(MainSpecLookup {
            model,
            spec_example,
            product_name_example,
        })
        .await
    }

    pub async fn fetch_certification(&self, model: &str) -> Result<CertificationNumbers, GenerationError> {
        self.lookup(CertificationLookup { model }).await
    }

    pub async fn fetch_general_spec(
        &self,
        product_name: &str,
        spec_example: &str,
    ) -> Result<GeneralSpecResult, GenerationError> {
        self.lookup(GeneralSpecLookup {
            product_name,
            spec_example,
        })
        .await
    }

    async fn lookup<L: Lookup>(&self, lookup: L) -> Result<L::Output, GenerationError> {
        let started = Instant::now();
        let request = CompletionRequest::new(L::KIND, lookup.prompt());

        let response = self
            .retry
            .run(L::KIND, |attempt| {
                if attempt > 1 {
                    self.retries.fetch_add(1, Ordering::Relaxed);
                }
                self.adapter.complete(request.clone())
            })
            .await
            .map_err(|failure| {
                warn!(
                    lookup = L::KIND,
                    provider = self.adapter.name(),
                    attempts = failure.attempts,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %failure.error,
                    "generation lookup failed"
                );
                into_generation_error(failure)
            })?;

        let parsed = lookup.parse(&response.content).map_err(|reason| {
            warn!(
                lookup = L::KIND,
                body_len = response.content.len(),
                reason = %reason,
                "generation response did not parse"
            );
            GenerationError::MalformedUpstreamResponse(reason)
        })?;

        info!(
            lookup = L::KIND,
            provider = self.adapter.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "generation lookup completed"
        );
        Ok(parsed)
    }
}

fn into_generation_error(failure: RetryFailure) -> GenerationError {
    let RetryFailure { error, attempts } = failure;
    if error.is_malformed() {
        GenerationError::MalformedUpstreamResponse(error.message)
    } else if error.retryable {
        GenerationError::UpstreamUnavailable {
            attempts,
            cause: error.to_string(),
        }
    } else {
        GenerationError::UpstreamRejected(error.to_string())
    }
}
