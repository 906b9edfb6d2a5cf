use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::types::ProviderError;

/// Fixed-delay retry for transient backend failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RetryFailure {
    pub error: ProviderError,
    pub attempts: u32,
}

impl RetryPolicy {
    /// Runs `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. `op` receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, RetryFailure>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let budget = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) if error.retryable && attempt < budget => {
                    warn!(
                        lookup = label,
                        attempt,
                        delay_ms = self.delay.as_millis() as u64,
                        error = %error,
                        "transient upstream failure, will retry"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(RetryFailure { error, attempts: attempt }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn transient() -> ProviderError {
        ProviderError::new("server_error", "overloaded", true)
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_on_third_attempt_with_fixed_delay() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();
        let result = RetryPolicy::default()
            .run("main_spec", |_| {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(transient())
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_budget() {
        let calls = AtomicU32::new(0);
        let failure = RetryPolicy::default()
            .run("certification", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(transient()) }
            })
            .await
            .unwrap_err();
        assert_eq!(failure.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn final_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let failure = RetryPolicy::default()
            .run("main_spec", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(ProviderError::new("auth_error", "bad key", false)) }
            })
            .await
            .unwrap_err();
        assert_eq!(failure.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
