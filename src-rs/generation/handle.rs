use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::error::GenerationError;
use crate::result::GenerationResult;

pub type Outcome = Result<GenerationResult, GenerationError>;

const RUNNING: u8 = 0;
const SETTLED: u8 = 1;
const CANCELLED: u8 = 2;

/// Single-fire guard deciding whether an orchestration finished or was
/// cancelled. Exactly one transition out of `RUNNING` ever succeeds.
#[derive(Debug, Default)]
pub struct Settlement(AtomicU8);

impl Settlement {
    pub fn try_settle(&self) -> bool {
        self.transition(SETTLED)
    }

    pub fn try_cancel(&self) -> bool {
        self.transition(CANCELLED)
    }

    fn transition(&self, to: u8) -> bool {
        self.0
            .compare_exchange(RUNNING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// The orchestration ended without publishing an outcome (its task was
/// aborted or panicked).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("orchestration ended without an outcome")]
pub struct WaitInterrupted;

/// Caller side of one orchestration. Cheap to clone; every clone observes
/// the same frozen outcome.
#[derive(Clone, Debug)]
pub struct GenerationHandle {
    outcome: watch::Receiver<Option<Outcome>>,
    settlement: Arc<Settlement>,
    cancel: CancellationToken,
}

/// Orchestration side of a handle. Publishes the outcome exactly once.
#[derive(Debug)]
pub struct Completion {
    outcome: watch::Sender<Option<Outcome>>,
    settlement: Arc<Settlement>,
    cancel: CancellationToken,
}

pub fn channel() -> (Completion, GenerationHandle) {
    let (tx, rx) = watch::channel(None);
    let settlement = Arc::new(Settlement::default());
    let cancel = CancellationToken::new();
    (
        Completion {
            outcome: tx,
            settlement: settlement.clone(),
            cancel: cancel.clone(),
        },
        GenerationHandle {
            outcome: rx,
            settlement,
            cancel,
        },
    )
}

impl GenerationHandle {
    /// Non-blocking view of the outcome, `None` while still running.
    pub fn peek(&self) -> Option<Outcome> {
        self.outcome.borrow().clone()
    }

    pub async fn wait(&self) -> Result<Outcome, WaitInterrupted> {
        let mut rx = self.outcome.clone();
        loop {
            if let Some(outcome) = rx.borrow_and_update().as_ref() {
                return Ok(outcome.clone());
            }
            if rx.changed().await.is_err() {
                return rx.borrow().clone().ok_or(WaitInterrupted);
            }
        }
    }

    /// Requests cancellation. True only for the call that won the
    /// settlement race against a finishing orchestration.
    pub fn try_cancel(&self) -> bool {
        if self.settlement.try_cancel() {
            self.cancel.cancel();
            true
        } else {
            false
        }
    }
}

impl Completion {
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }

    /// Publishes `outcome` if the orchestration wins settlement, otherwise
    /// publishes `Cancelled`. Returns whether `outcome` won.
    pub fn settle(&self, outcome: Outcome) -> bool {
        if self.settlement.try_settle() {
            self.outcome.send_replace(Some(outcome));
            true
        } else {
            self.outcome.send_replace(Some(Err(GenerationError::Cancelled)));
            false
        }
    }
}
