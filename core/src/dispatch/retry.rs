use std::future::Future;
use std::time::Duration;

use rand::Rng;

use super::limiter::Dispatcher;
use crate::config::RetryConfig;
use crate::error::{DirectoryError, RemoteError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again; `wait` is the remote-imposed delay, if any.
    Retry { wait: Option<Duration> },
    Stop,
}

/// Pure retry classification of a failed attempt.
pub fn classify(err: &DirectoryError) -> RetryDecision {
    match err {
        DirectoryError::Throttled { retry_after } => RetryDecision::Retry {
            wait: Some(*retry_after),
        },
        DirectoryError::Transient { .. } => RetryDecision::Retry { wait: None },
        _ => RetryDecision::Stop,
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
    jitter: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration, jitter: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            jitter,
        }
    }

    pub fn reads(cfg: &RetryConfig) -> Self {
        Self::new(
            cfg.read_max_attempts,
            Duration::from_millis(cfg.backoff_ms),
            Duration::from_millis(cfg.jitter_ms),
        )
    }

    pub fn writes(cfg: &RetryConfig) -> Self {
        Self::new(
            cfg.write_max_attempts,
            Duration::from_millis(cfg.backoff_ms),
            Duration::from_millis(cfg.jitter_ms),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `make_call` through `dispatcher` until it succeeds, fails terminally,
    /// or the attempt budget is spent. The error of the last attempt is returned.
    pub async fn run<T, F, Fut>(
        &self,
        dispatcher: &Dispatcher,
        op: &str,
        mut make_call: F,
    ) -> Result<T, DirectoryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let err = match dispatcher.dispatch(op, make_call()).await.into_result() {
                Ok(v) => return Ok(v),
                Err(err) => err,
            };

            let wait = match classify(&err) {
                RetryDecision::Stop => {
                    tracing::debug!(
                        target: "taskbridge.retry",
                        op = op,
                        attempt = attempt,
                        error = %err,
                        "terminal failure, not retrying"
                    );
                    return Err(err);
                }
                RetryDecision::Retry { wait } => wait,
            };

            if attempt >= self.max_attempts {
                tracing::warn!(
                    target: "taskbridge.retry",
                    op = op,
                    attempt = attempt,
                    max_attempts = self.max_attempts,
                    error = %err,
                    "retry budget exhausted"
                );
                return Err(err);
            }

            let delay = wait.unwrap_or(self.backoff) + self.sample_jitter();
            tracing::warn!(
                target: "taskbridge.retry",
                op = op,
                attempt = attempt,
                max_attempts = self.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "attempt failed, retrying"
            );
            if !dispatcher.pause(delay).await {
                return Err(DirectoryError::Cancelled);
            }
        }
    }

    fn sample_jitter(&self) -> Duration {
        let max = self.jitter.as_millis() as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LimiterConfig;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_dispatcher() -> Dispatcher {
        Dispatcher::new(&LimiterConfig {
            min_interval_ms: 0,
            max_concurrent: 1,
            throttle_fallback_ms: 0,
        })
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    #[tokio::test]
    async fn client_error_is_attempted_once() {
        let dispatcher = fast_dispatcher();
        let attempts = AtomicU32::new(0);
        let result: Result<(), _> = policy(3)
            .run(&dispatcher, "missing", || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(RemoteError::status(404, "not found")) }
            })
            .await;

        assert!(matches!(
            result,
            Err(DirectoryError::TerminalClient { status: 404, .. })
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.calls_started(), 1);
    }

    #[tokio::test]
    async fn transient_failures_then_success() {
        let dispatcher = fast_dispatcher();
        let attempts = AtomicU32::new(0);
        let result = policy(3)
            .run(&dispatcher, "flaky", || {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(RemoteError::status(503, "unavailable"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(dispatcher.calls_started(), 3);
    }

    #[tokio::test]
    async fn exhausted_budget_returns_last_error() {
        let dispatcher = fast_dispatcher();
        let result: Result<(), _> = policy(2)
            .run(&dispatcher, "down", || async {
                Err(RemoteError::status(500, "boom"))
            })
            .await;

        assert!(matches!(
            result,
            Err(DirectoryError::Transient {
                status: Some(500),
                ..
            })
        ));
        assert_eq!(dispatcher.calls_started(), 2);
    }

    #[tokio::test]
    async fn throttle_is_retried_with_remote_wait() {
        let dispatcher = fast_dispatcher();
        let attempts = AtomicU32::new(0);
        let result = policy(2)
            .run(&dispatcher, "busy", || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(RemoteError::throttled(Some("0")))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(dispatcher.calls_started(), 2);
    }

    #[test]
    fn classification_is_pure() {
        assert_eq!(
            classify(&DirectoryError::Throttled {
                retry_after: Duration::from_secs(1)
            }),
            RetryDecision::Retry {
                wait: Some(Duration::from_secs(1))
            }
        );
        assert_eq!(
            classify(&DirectoryError::ProtocolViolation("x".into())),
            RetryDecision::Stop
        );
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        assert_eq!(policy(0).max_attempts(), 1);
        let p = RetryPolicy::new(4, Duration::from_millis(10), Duration::from_millis(5));
        for _ in 0..20 {
            assert!(p.sample_jitter() <= Duration::from_millis(5));
        }
    }
}
