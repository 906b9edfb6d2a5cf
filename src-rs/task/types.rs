use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::generation::{GenerationHandle, Outcome, WaitInterrupted};
use crate::result::GenerationResult;

pub type TaskId = String;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Running,
    Completed,
    Failed,
    Cancelled,
    NotFound,
}

/// Poll answer. `result` is present only for `COMPLETED`, `error` only for
/// `FAILED`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub status: TaskState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GenerationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskResult {
    fn bare(status: TaskState) -> Self {
        Self {
            status,
            result: None,
            error: None,
            created_at: None,
            completed_at: None,
        }
    }

    pub fn running() -> Self {
        Self::bare(TaskState::Running)
    }

    pub fn completed(result: GenerationResult) -> Self {
        Self {
            result: Some(result),
            ..Self::bare(TaskState::Completed)
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::bare(TaskState::Failed)
        }
    }

    pub fn cancelled() -> Self {
        Self::bare(TaskState::Cancelled)
    }

    pub fn not_found() -> Self {
        Self::bare(TaskState::NotFound)
    }
}

/// What the registry keeps per task. `NotFound` is never stored.
#[derive(Clone, Debug)]
pub(crate) enum StoredStatus {
    Running,
    Completed(GenerationResult),
    Failed(String),
    Cancelled,
}

impl StoredStatus {
    pub(crate) fn from_wait(outcome: Result<Outcome, WaitInterrupted>) -> Self {
        match outcome {
            Ok(Ok(result)) => StoredStatus::Completed(result),
            Err(WaitInterrupted) => StoredStatus::Cancelled,
            Ok(Err(err)) if err.is_cancelled() => StoredStatus::Cancelled,
            Ok(Err(err)) => StoredStatus::Failed(err.to_string()),
        }
    }
}

#[derive(Debug)]
pub(crate) struct TaskEntry {
    pub seq: u64,
    pub created_at: DateTime<Utc>,
    pub status: StoredStatus,
    /// Monotonic completion instant, drives retention.
    pub finished: Option<Instant>,
    pub completed_at: Option<DateTime<Utc>>,
    pub handle: GenerationHandle,
}

impl TaskEntry {
    pub fn new(seq: u64, handle: GenerationHandle) -> Self {
        Self {
            seq,
            created_at: Utc::now(),
            status: StoredStatus::Running,
            finished: None,
            completed_at: None,
            handle,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.status, StoredStatus::Running)
    }

    /// Moves a running entry to its terminal status; terminal entries are
    /// never rewritten.
    pub fn finish(&mut self, status: StoredStatus) -> bool {
        if !self.is_running() || matches!(status, StoredStatus::Running) {
            return false;
        }
        self.status = status;
        self.finished = Some(Instant::now());
        self.completed_at = Some(Utc::now());
        true
    }

    pub fn is_expired(&self, now: Instant, retention: std::time::Duration) -> bool {
        self.finished
            .map(|finished| now.saturating_duration_since(finished) >= retention)
            .unwrap_or(false)
    }

    pub fn snapshot(&self) -> TaskResult {
        let mut snapshot = match &self.status {
            StoredStatus::Running => TaskResult::running(),
            StoredStatus::Completed(result) => TaskResult::completed(result.clone()),
            StoredStatus::Failed(message) => TaskResult::failed(message.clone()),
            StoredStatus::Cancelled => TaskResult::cancelled(),
        };
        snapshot.created_at = Some(self.created_at);
        snapshot.completed_at = self.completed_at;
        snapshot
    }
}
