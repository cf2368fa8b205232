//! Bounded retry for rate-limited service calls.
//!
//! [`RetryPolicy`] knows nothing about HTTP or the inference service: it runs
//! an action, retries only when the action reports a rate limit, and waits a
//! linearly growing delay in between. The wait is a tokio sleep, so other
//! invocations keep running while one is backing off.

use crate::config::RetryConfig;
use crate::error::{ServiceError, TerminalError};
use std::future::Future;
use std::time::Duration;

/// Per-invocation retry bookkeeping. Lives only for one [`RetryPolicy::run`].
#[derive(Debug, Clone, Copy)]
struct RetryState {
    attempt: u32,
}

/// Retry schedule for rate-limited calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(2000))
    }
}

impl RetryPolicy {
    /// `max_attempts` counts the first call; values below 1 are raised to 1.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait applied after the given (1-based) failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Run `action` until it succeeds, fails for a reason other than rate
    /// limiting, or the attempt budget is spent.
    pub async fn run<T, F, Fut>(&self, mut action: F) -> Result<T, TerminalError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let mut state = RetryState { attempt: 0 };

        loop {
            state.attempt += 1;

            match action().await {
                Ok(value) => {
                    if state.attempt > 1 {
                        tracing::debug!("Succeeded on attempt {}", state.attempt);
                    }
                    return Ok(value);
                }
                Err(e) if e.is_rate_limited() => {
                    if state.attempt >= self.max_attempts {
                        tracing::warn!(
                            "Rate limited on all {} attempt(s), giving up",
                            state.attempt
                        );
                        return Err(TerminalError::RateLimited {
                            attempts: state.attempt,
                        });
                    }
                    let delay = self.delay_for(state.attempt);
                    tracing::warn!(
                        "Attempt {}/{} rate limited, retrying in {delay:?}",
                        state.attempt,
                        self.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::debug!("Attempt {} failed without retry: {e}", state.attempt);
                    return Err(TerminalError::Failed(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn rate_limited() -> ServiceError {
        ServiceError::with_status("HTTP 429: too many requests", 429)
    }

    #[test]
    fn test_delay_schedule_is_linear() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(6000));
    }

    #[test]
    fn test_zero_attempts_raised_to_one() {
        let policy = RetryPolicy::new(0, Duration::from_millis(10));
        assert_eq!(policy.max_attempts(), 1);
    }

    #[test]
    fn test_from_config() {
        let policy = RetryPolicy::from_config(&RetryConfig {
            max_attempts: 5,
            base_delay_ms: 100,
        });
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_returns_immediately() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = RetryPolicy::default()
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, ServiceError>(42) }
            })
            .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_attempts_when_always_rate_limited() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<(), _> = RetryPolicy::default()
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(rate_limited()) }
            })
            .await;

        assert_eq!(result, Err(TerminalError::RateLimited { attempts: 3 }));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 2000ms after attempt 1, 4000ms after attempt 2, no wait after the last
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(6000), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(6100), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_rate_limits() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = RetryPolicy::default()
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(rate_limited())
                    } else {
                        Ok("answer")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("answer"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(6000), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(6100), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<(), _> = RetryPolicy::default()
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ServiceError::with_status("HTTP 500", 500)) }
            })
            .await;

        assert_eq!(
            result,
            Err(TerminalError::Failed(ServiceError::with_status("HTTP 500", 500)))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_after_rate_limit_stops() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = RetryPolicy::default()
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(rate_limited())
                    } else {
                        Err(ServiceError::new("connection reset"))
                    }
                }
            })
            .await;

        assert!(matches!(result, Err(TerminalError::Failed(e)) if e.message == "connection reset"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_does_not_block_other_tasks() {
        let policy = RetryPolicy::default();
        let backing_off =
            tokio::spawn(async move { policy.run(|| async { Err::<(), _>(rate_limited()) }).await });

        // A second task finishes long before the first one gives up.
        let quick = tokio::spawn(async {
            RetryPolicy::default()
                .run(|| async { Ok::<_, ServiceError>(1) })
                .await
        });
        assert_eq!(quick.await.unwrap(), Ok(1));
        assert!(!backing_off.is_finished());

        assert_eq!(
            backing_off.await.unwrap(),
            Err(TerminalError::RateLimited { attempts: 3 })
        );
    }
}
