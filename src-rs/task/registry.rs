use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use super::types::{StoredStatus, TaskEntry, TaskId, TaskResult};
use crate::generation::GenerationHandle;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    /// How long a finished task stays pollable, measured from completion.
    pub retention: Duration,
    pub capacity: usize,
    pub sweep_interval: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            retention: Duration::from_secs(10 * 60),
            capacity: 1000,
            sweep_interval: Duration::from_secs(30),
        }
    }
}

/// In-memory id → task map with completion-relative retention and an
/// oldest-inserted-first capacity bound.
#[derive(Clone)]
pub struct TaskRegistry {
    inner: Arc<Inner>,
}

struct Inner {
    cfg: RegistryConfig,
    tasks: DashMap<TaskId, TaskEntry>,
    seq: AtomicU64,
    /// Serializes eviction plus insert so the capacity bound holds under
    /// concurrent submits. Reads never take it.
    admission: Mutex<()>,
}

impl TaskRegistry {
    pub fn new(cfg: RegistryConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                cfg,
                tasks: DashMap::new(),
                seq: AtomicU64::new(0),
                admission: Mutex::new(()),
            }),
        }
    }

    /// Tracks `handle` under a fresh id and returns immediately. A background
    /// observer records the terminal state once the handle settles.
    pub fn submit(&self, handle: GenerationHandle) -> TaskId {
        let id = Uuid::new_v4().to_string();
        let seq = {
            // Nothing inside panics; a poisoned guard still covers a consistent map.
            let _admitted = self
                .inner
                .admission
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            self.inner.make_room();
            let seq = self.inner.seq.fetch_add(1, Ordering::SeqCst);
            self.inner
                .tasks
                .insert(id.clone(), TaskEntry::new(seq, handle.clone()));
            seq
        };
        debug!(task_id = %id, seq, "task registered");

        let registry: Weak<Inner> = Arc::downgrade(&self.inner);
        let observed = id.clone();
        tokio::spawn(async move {
            let outcome = handle.wait().await;
            if let Some(inner) = registry.upgrade() {
                inner.finish(&observed, StoredStatus::from_wait(outcome));
            }
        });
        id
    }

    /// Non-blocking snapshot. Expired or unknown ids answer `NotFound`.
    pub fn poll(&self, id: &str) -> TaskResult {
        let now = Instant::now();
        let retention = self.inner.cfg.retention;
        let expired = match self.inner.tasks.get_mut(id) {
            None => return TaskResult::not_found(),
            Some(mut entry) => {
                if entry.is_expired(now, retention) {
                    true
                } else {
                    // The observer may not have run yet; the handle is authoritative.
                    if entry.is_running() {
                        if let Some(outcome) = entry.handle.peek() {
                            entry.finish(StoredStatus::from_wait(Ok(outcome)));
                        }
                    }
                    return entry.snapshot();
                }
            }
        };
        if expired {
            self.inner
                .tasks
                .remove_if(id, |_, entry| entry.is_expired(now, retention));
            debug!(task_id = %id, "task expired on read");
        }
        TaskResult::not_found()
    }

    /// True only when this call cancelled a still-running task.
    pub fn cancel(&self, id: &str) -> bool {
        let Some(mut entry) = self.inner.tasks.get_mut(id) else {
            return false;
        };
        if !entry.is_running() || !entry.handle.try_cancel() {
            return false;
        }
        entry.finish(StoredStatus::Cancelled);
        info!(task_id = %id, "task cancelled");
        true
    }

    /// Removes every entry whose retention has lapsed. Returns how many.
    pub fn sweep(&self) -> usize {
        self.inner.sweep()
    }

    /// Runs `sweep` every `sweep_interval` until the registry is dropped.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let registry = Arc::downgrade(&self.inner);
        let every = self.inner.cfg.sweep_interval.max(Duration::from_millis(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(inner) = registry.upgrade() else {
                    break;
                };
                inner.sweep();
            }
        })
    }

    pub fn len(&self) -> usize {
        self.inner.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.tasks.is_empty()
    }
}

impl Inner {
    fn finish(&self, id: &str, status: StoredStatus) {
        if let Some(mut entry) = self.tasks.get_mut(id) {
            entry.finish(status);
        }
    }

    fn sweep(&self) -> usize {
        let now = Instant::now();
        let retention = self.cfg.retention;
        let before = self.tasks.len();
        self.tasks.retain(|_, entry| !entry.is_expired(now, retention));
        let removed = before.saturating_sub(self.tasks.len());
        if removed > 0 {
            debug!(removed, remaining = self.tasks.len(), "swept expired tasks");
        }
        removed
    }

    /// Evicts oldest-inserted entries, running or not, until one more fits.
    /// Callers hold `admission`.
    fn make_room(&self) {
        let capacity = self.cfg.capacity.max(1);
        while self.tasks.len() >= capacity {
            let oldest = self
                .tasks
                .iter()
                .min_by_key(|entry| entry.seq)
                .map(|entry| entry.key().clone());
            let Some(oldest) = oldest else {
                break;
            };
            if let Some((id, entry)) = self.tasks.remove(&oldest) {
                if entry.is_running() && entry.handle.try_cancel() {
                    info!(task_id = %id, "evicted running task at capacity, cancelled it");
                } else {
                    debug!(task_id = %id, "evicted task at capacity");
                }
            }
        }
    }
}
