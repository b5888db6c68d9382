//! Retry logic for HTTP operations

use crate::llm::LlmError;
use std::time::Duration;

use super::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt (2 retries => 3 attempts)
    pub max_retries: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_RETRY_DELAY,
            max_delay: Duration::from_secs(240),
        }
    }
}

impl RetryConfig {
    /// Backoff before retry number `retry` (counted from 1): `base_delay * 2^retry`
    pub fn delay_for(&self, retry: usize) -> Duration {
        let factor = 2_u32.saturating_pow(retry.min(31) as u32);
        std::cmp::min(self.base_delay.saturating_mul(factor), self.max_delay)
    }
}

/// Execute an operation with retry logic, logging each backoff
pub async fn execute_with_retry<F, Fut, T>(operation: F, config: &RetryConfig) -> Result<T, LlmError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, LlmError>> + Send,
{
    execute_with_retry_observed(operation, config, |retry, delay, error| {
        tracing::warn!(
            "Backend call failed ({}), retry {} in {}ms",
            error,
            retry,
            delay.as_millis()
        );
    })
    .await
}

/// Execute an operation with retry logic, reporting every backoff to `on_backoff`
pub async fn execute_with_retry_observed<F, Fut, T, O>(
    operation: F,
    config: &RetryConfig,
    mut on_backoff: O,
) -> Result<T, LlmError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, LlmError>> + Send,
    O: FnMut(usize, Duration, &LlmError),
{
    let mut retry = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) => {
                if retry >= config.max_retries || !error.is_retryable() {
                    return Err(error);
                }

                retry += 1;
                let delay = config.delay_for(retry);
                on_backoff(retry, delay, &error);
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn failing() -> LlmError {
        LlmError::RequestFailed {
            status: 500,
            message: "test server error".to_string(),
        }
    }

    #[test]
    fn test_delay_is_exponential_from_first_retry() {
        let config = RetryConfig {
            max_retries: 2,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
        };
        assert_eq!(config.delay_for(1), Duration::from_millis(200));
        assert_eq!(config.delay_for(2), Duration::from_millis(400));
        assert_eq!(config.delay_for(20), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_success_on_third_attempt() {
        let attempt_count = Arc::new(AtomicUsize::new(0));
        let attempt_count_clone = attempt_count.clone();

        let operation = move || {
            let count = attempt_count_clone.clone();
            async move {
                if count.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(failing())
                } else {
                    Ok("success".to_string())
                }
            }
        };

        let config = RetryConfig::default();
        let mut delays = Vec::new();
        let started = tokio::time::Instant::now();

        let result = execute_with_retry_observed(operation, &config, |_, delay, _| delays.push(delay)).await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
        assert_eq!(delays, vec![Duration::from_millis(2000), Duration::from_millis(4000)]);
        assert!(started.elapsed() >= Duration::from_millis(6000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up_after_three_attempts() {
        let attempt_count = Arc::new(AtomicUsize::new(0));
        let attempt_count_clone = attempt_count.clone();

        let operation = move || {
            let count = attempt_count_clone.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Err::<String, _>(failing())
            }
        };

        let mut backoffs = 0;
        let result = execute_with_retry_observed(operation, &RetryConfig::default(), |_, _, _| backoffs += 1).await;

        assert!(matches!(result, Err(LlmError::RequestFailed { status: 500, .. })));
        assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
        assert_eq!(backoffs, 2);
    }

    #[tokio::test]
    async fn test_configuration_error_stops_immediately() {
        let attempt_count = Arc::new(AtomicUsize::new(0));
        let attempt_count_clone = attempt_count.clone();

        let operation = move || {
            let count = attempt_count_clone.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Err::<String, _>(LlmError::MissingApiKey {
                    provider: "openai".to_string(),
                })
            }
        };

        let result = execute_with_retry(operation, &RetryConfig::default()).await;
        assert!(matches!(result, Err(LlmError::MissingApiKey { .. })));
        assert_eq!(attempt_count.load(Ordering::SeqCst), 1);
    }
}
