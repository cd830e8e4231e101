use std::future::Future;
use std::time::Duration;

use log::{debug, warn};

use crate::errors::{MarketDataError, ProviderErrorCode};

/// Retry behaviour for provider calls.
///
/// Each attempt is bounded by `timeout`; between attempts the delay grows
/// linearly (`base_delay`, `2 * base_delay`, ...). Only transient errors are
/// retried; terminal errors surface immediately.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before retrying after the given 1-based attempt number.
    fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Runs `operation` under this policy. `label` names the call in log
    /// output; `provider` attributes timeout errors.
    pub async fn run<T, F, Fut>(
        &self,
        provider: &'static str,
        label: &str,
        mut operation: F,
    ) -> Result<T, MarketDataError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, MarketDataError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            let result = match tokio::time::timeout(self.timeout, operation()).await {
                Ok(result) => result,
                Err(_) => Err(MarketDataError::provider(
                    provider,
                    ProviderErrorCode::Timeout,
                    format!("{} timed out after {:?}", label, self.timeout),
                )),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(error) if error.retry_class().is_retryable() && attempt < attempts => {
                    let delay = self.delay(attempt);
                    debug!(
                        "Transient failure on {} (attempt {}/{}), retrying in {:?}: {}",
                        label, attempt, attempts, delay, error
                    );
                    last_error = Some(error);
                    tokio::time::sleep(delay).await;
                }
                Err(error) => {
                    if attempt > 1 {
                        warn!("{} failed after {} attempts: {}", label, attempt, error);
                    }
                    return Err(error);
                }
            }
        }

        // Unreachable: the loop always returns on the last attempt.
        Err(last_error
            .unwrap_or_else(|| MarketDataError::Internal(format!("{} retry loop exhausted", label))))
    }
}
