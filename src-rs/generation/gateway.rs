use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::handle::WaitInterrupted;
use super::orchestrator::GenerationOrchestrator;
use super::request::{GeneralSpecRequest, GenerationRequest, Principal};
use crate::result::{GeneralSpecResult, GenerationResult};
use crate::task::{TaskId, TaskRegistry, TaskResult};

/// What a bounded-wait submission produced.
#[derive(Clone, Debug, PartialEq)]
pub enum GatewayOutcome {
    /// Settled successfully inside the wait window.
    Finished(GenerationResult),
    /// Settled with an error inside the wait window.
    Failed { task_id: TaskId, message: String },
    /// Still running when the window elapsed; poll `task_id` later.
    Accepted { task_id: TaskId },
    /// Cancelled, or the wait was interrupted, before an outcome arrived.
    Cancelled { task_id: TaskId },
    /// Refused before any task was created.
    InsufficientCredit { remaining: i64 },
}

#[derive(Clone, Debug, PartialEq)]
pub enum GeneralOutcome {
    Finished(GeneralSpecResult),
    Failed { message: String },
    InsufficientCredit { remaining: i64 },
}

pub struct Gateway {
    orchestrator: Arc<GenerationOrchestrator>,
    registry: TaskRegistry,
    default_timeout: Duration,
}

impl Gateway {
    pub fn new(orchestrator: Arc<GenerationOrchestrator>, registry: TaskRegistry, default_timeout: Duration) -> Self {
        Self {
            orchestrator,
            registry,
            default_timeout,
        }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn orchestrator(&self) -> &GenerationOrchestrator {
        &self.orchestrator
    }

    pub async fn submit(&self, request: GenerationRequest) -> GatewayOutcome {
        self.submit_and_maybe_wait(request, self.default_timeout).await
    }

    /// Starts the generation, tracks it, and waits at most `timeout` for it.
    pub async fn submit_and_maybe_wait(&self, request: GenerationRequest, timeout: Duration) -> GatewayOutcome {
        if let Some(remaining) = self.exhausted_credit(request.principal()).await {
            return GatewayOutcome::InsufficientCredit { remaining };
        }

        let model = request.model().to_string();
        let handle = self.orchestrator.start(request);
        let task_id = self.registry.submit(handle.clone());
        info!(task_id = %task_id, model = %model, timeout_ms = timeout.as_millis() as u64, "generation submitted");

        match tokio::time::timeout(timeout, handle.wait()).await {
            Err(_) => {
                info!(task_id = %task_id, "wait window elapsed, handing back task id");
                GatewayOutcome::Accepted { task_id }
            }
            Ok(Err(WaitInterrupted)) => GatewayOutcome::Cancelled { task_id },
            Ok(Ok(Err(err))) if err.is_cancelled() => GatewayOutcome::Cancelled { task_id },
            Ok(Ok(Ok(result))) => GatewayOutcome::Finished(result),
            Ok(Ok(Err(err))) => GatewayOutcome::Failed {
                task_id,
                message: err.to_string(),
            },
        }
    }

    pub fn poll(&self, task_id: &str) -> TaskResult {
        self.registry.poll(task_id)
    }

    pub fn cancel(&self, task_id: &str) -> bool {
        self.registry.cancel(task_id)
    }

    pub async fn generate_general(&self, request: GeneralSpecRequest) -> GeneralOutcome {
        if let Some(remaining) = self.exhausted_credit(&request.principal).await {
            return GeneralOutcome::InsufficientCredit { remaining };
        }
        match self.orchestrator.generate_general(request).await {
            Ok(result) => GeneralOutcome::Finished(result),
            Err(err) => GeneralOutcome::Failed {
                message: err.to_string(),
            },
        }
    }

    pub async fn balance(&self, principal: &Principal) -> Result<i64, crate::credit::LedgerError> {
        self.orchestrator.ledger().balance(&principal.id).await
    }

    /// Advisory pre-flight check; the post-success charge is still the only
    /// charging point. A ledger outage does not block generation.
    async fn exhausted_credit(&self, principal: &Principal) -> Option<i64> {
        match self.orchestrator.ledger().balance(&principal.id).await {
            Ok(balance) if balance <= 0 => {
                info!(principal = %principal.id, balance, "refusing generation, no credit left");
                Some(balance)
            }
            Ok(_) => None,
            Err(err) => {
                warn!(principal = %principal.id, error = %err, "credit pre-check failed, continuing");
                None
            }
        }
    }
}
