use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::GenerationError;

/// Bounded executor for sub-lookups: `max_workers` run at once and up to
/// `queue_capacity` more wait for a slot. Anything beyond is refused.
#[derive(Clone)]
pub struct WorkerPool {
    slots: Arc<Semaphore>,
    admission: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(max_workers: usize, queue_capacity: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            slots: Arc::new(Semaphore::new(max_workers)),
            admission: Arc::new(Semaphore::new(max_workers + queue_capacity)),
        }
    }

    pub fn spawn<F, T>(&self, label: &'static str, fut: F) -> Result<JoinHandle<T>, GenerationError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let admitted = match self.admission.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!(kind = label, "worker pool saturated, refusing sub-lookup");
                return Err(GenerationError::PoolSaturated);
            }
        };
        let slots = self.slots.clone();
        Ok(tokio::spawn(async move {
            let _admitted = admitted;
            // The slot semaphore is never closed, so acquisition only waits.
            let _slot = slots.acquire_owned().await.ok();
            fut.await
        }))
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(10, 50)
    }
}
