use std::sync::Arc;

use tokio::task::{AbortHandle, JoinError, JoinHandle};
use tokio::time::Instant;
use tracing::{error, info, warn};

use super::handle::{self, GenerationHandle, Outcome};
use super::request::{GeneralSpecRequest, GenerationRequest, Principal};
use crate::credit::CreditLedger;
use crate::error::GenerationError;
use crate::llm::AiClient;
use crate::pool::WorkerPool;
use crate::result::{CertificationNumbers, GeneralSpecResult, GenerationResult};
use crate::scrape::ScrapingClient;

/// Fans one request out to the four lookups, merges them and charges the
/// principal once per successful run.
#[derive(Clone)]
pub struct GenerationOrchestrator {
    ai: Arc<AiClient>,
    scraper: ScrapingClient,
    ledger: Arc<dyn CreditLedger>,
    pool: WorkerPool,
}

/// Aborts every tracked sub-lookup that is still outstanding when dropped.
#[derive(Default)]
struct SubTasks(Vec<AbortHandle>);

impl SubTasks {
    fn track<T>(&mut self, handle: JoinHandle<T>) -> JoinHandle<T> {
        self.0.push(handle.abort_handle());
        handle
    }
}

impl Drop for SubTasks {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

impl GenerationOrchestrator {
    pub fn new(
        ai: Arc<AiClient>,
        scraper: ScrapingClient,
        ledger: Arc<dyn CreditLedger>,
        pool: WorkerPool,
    ) -> Self {
        Self {
            ai,
            scraper,
            ledger,
            pool,
        }
    }

    pub fn ai(&self) -> &AiClient {
        &self.ai
    }

    pub fn ledger(&self) -> &Arc<dyn CreditLedger> {
        &self.ledger
    }

    /// Starts one orchestration in the background. Never fails here; every
    /// failure arrives through the handle.
    pub fn start(&self, request: GenerationRequest) -> GenerationHandle {
        let (completion, handle) = handle::channel();
        let this = self.clone();
        tokio::spawn(async move {
            let started = Instant::now();
            let outcome = tokio::select! {
                biased;
                _ = completion.cancelled() => Err(GenerationError::Cancelled),
                outcome = this.run(&request) => outcome,
            };
            let elapsed_ms = started.elapsed().as_millis() as u64;
            let succeeded = outcome.is_ok();
            match &outcome {
                Ok(_) => info!(model = request.model(), principal = %request.principal().id, elapsed_ms, "generation completed"),
                Err(GenerationError::Cancelled) => info!(model = request.model(), elapsed_ms, "generation cancelled"),
                Err(err) => warn!(model = request.model(), elapsed_ms, error = %err, "generation failed"),
            }
            if completion.settle(outcome) && succeeded {
                this.charge(request.principal()).await;
            }
        });
        handle
    }

    /// Single general-product lookup, awaited inline and charged once on
    /// success.
    pub async fn generate_general(&self, request: GeneralSpecRequest) -> Result<GeneralSpecResult, GenerationError> {
        let ai = self.ai.clone();
        let product_name = request.product_name.clone();
        let spec_example = request.spec_example.clone();
        let lookup = self.pool.spawn("general_spec", async move {
            ai.fetch_general_spec(&product_name, &spec_example).await
        })?;
        let result = lookup.await.map_err(join_failure)??;
        self.charge(&request.principal).await;
        Ok(result)
    }

    async fn run(&self, request: &GenerationRequest) -> Outcome {
        let mut subtasks = SubTasks::default();
        let model = request.model().to_string();

        let main = {
            let ai = self.ai.clone();
            let model = model.clone();
            let spec_example = request.spec_example().to_string();
            let name_example = request.product_name_example().map(str::to_string);
            subtasks.track(self.pool.spawn("main_spec", async move {
                ai.fetch_main_spec(&model, &spec_example, name_example.as_deref()).await
            })?)
        };
        let certification = {
            let ai = self.ai.clone();
            let model = model.clone();
            self.optional("certification", async move { ai.fetch_certification(&model).await })
                .map(|h| subtasks.track(h))
        };
        let classification = {
            let scraper = self.scraper.clone();
            let model = model.clone();
            self.optional("classification", async move { scraper.scrape_classification(&model).await })
                .map(|h| subtasks.track(h))
        };
        let country = {
            let scraper = self.scraper.clone();
            let model = model.clone();
            self.optional("country_of_origin", async move { scraper.scrape_country(&model).await })
                .map(|h| subtasks.track(h))
        };

        // A main-spec failure returns here; dropping `subtasks` aborts the rest.
        let spec = main.await.map_err(join_failure)??;

        let certification = join_certification(&model, certification).await;
        let classification = join_scrape("classification", &model, classification).await;
        let country = join_scrape("country_of_origin", &model, country).await;

        let mut result = GenerationResult::from_main_spec(spec);
        if let Some(cert) = certification {
            result = result.with_certification(cert);
        }
        Ok(result
            .with_classification(classification)
            .with_country_of_origin(country))
    }

    fn optional<F, T>(&self, kind: &'static str, fut: F) -> Option<JoinHandle<T>>
    where
        F: std::future::Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        // Saturation was already logged by the pool; the field stays absent.
        self.pool.spawn(kind, fut).ok()
    }

    async fn charge(&self, principal: &Principal) {
        match self.ledger.adjust(&principal.id, -1).await {
            Ok(balance) => info!(principal = %principal.id, balance, "credit charged"),
            Err(err) => error!(principal = %principal.id, error = %err, "credit charge failed"),
        }
    }
}

async fn join_certification(
    model: &str,
    handle: Option<JoinHandle<Result<CertificationNumbers, GenerationError>>>,
) -> Option<CertificationNumbers> {
    match handle?.await {
        Ok(Ok(cert)) => Some(cert),
        Ok(Err(err)) => {
            warn!(kind = "certification", model, error = %err, "optional lookup failed, leaving fields absent");
            None
        }
        Err(err) => {
            warn!(kind = "certification", model, error = %err, "optional lookup did not finish");
            None
        }
    }
}

async fn join_scrape(kind: &'static str, model: &str, handle: Option<JoinHandle<Option<String>>>) -> Option<String> {
    match handle?.await {
        Ok(value) => value,
        Err(err) => {
            warn!(kind, model, error = %err, "optional lookup did not finish");
            None
        }
    }
}

fn join_failure(err: JoinError) -> GenerationError {
    if err.is_cancelled() {
        GenerationError::Cancelled
    } else {
        GenerationError::Internal(err.to_string())
    }
}
