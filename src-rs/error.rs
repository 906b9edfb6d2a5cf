use thiserror::Error;

/// Failure taxonomy of a generation run.
///
/// `Clone` because one frozen outcome is handed to every poller of a task.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("upstream unavailable after {attempts} attempt(s): {cause}")]
    UpstreamUnavailable { attempts: u32, cause: String },

    #[error("malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    #[error("upstream rejected the request: {0}")]
    UpstreamRejected(String),

    #[error("generation cancelled")]
    Cancelled,

    #[error("worker pool saturated")]
    PoolSaturated,

    #[error("internal error: {0}")]
    Internal(String),
}

impl GenerationError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, GenerationError::Cancelled)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{provider} provider selected but no {env} found")]
    MissingApiKey { provider: String, env: String },

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("failed to build http client: {0}")]
    Client(String),
}
