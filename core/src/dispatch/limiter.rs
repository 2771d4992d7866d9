use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::outcome::DispatchOutcome;
use crate::config::LimiterConfig;
use crate::error::RemoteError;

/// Process-wide gate in front of the directory API.
///
/// Calls are admitted in submission order (both the semaphore and the mutex
/// are fair), at most `max_concurrent` at a time, and successive call starts
/// are at least `min_interval` apart. Throttle responses are never retried
/// here; they come back as [`DispatchOutcome::Throttled`] with the wait the
/// caller should honor.
pub struct Dispatcher {
    permits: Semaphore,
    last_start: Mutex<Option<Instant>>,
    min_interval: Duration,
    throttle_fallback: Duration,
    cancel: CancellationToken,
    started: AtomicU64,
}

impl Dispatcher {
    pub fn new(cfg: &LimiterConfig) -> Self {
        Self::with_cancellation(cfg, CancellationToken::new())
    }

    pub fn with_cancellation(cfg: &LimiterConfig, cancel: CancellationToken) -> Self {
        Self {
            permits: Semaphore::new(cfg.max_concurrent.max(1)),
            last_start: Mutex::new(None),
            min_interval: Duration::from_millis(cfg.min_interval_ms),
            throttle_fallback: Duration::from_millis(cfg.throttle_fallback_ms),
            cancel,
            started: AtomicU64::new(0),
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Number of calls that actually reached the remote.
    pub fn calls_started(&self) -> u64 {
        self.started.load(Ordering::Relaxed)
    }

    pub async fn dispatch<T, Fut>(&self, op: &str, call: Fut) -> DispatchOutcome<T>
    where
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return DispatchOutcome::Cancelled,
            permit = self.permits.acquire() => match permit {
                Ok(permit) => permit,
                Err(_) => return DispatchOutcome::Cancelled,
            },
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return DispatchOutcome::Cancelled,
            _ = self.claim_start_slot() => {}
        }

        let seq = self.started.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(target: "taskbridge.dispatch", op = op, seq = seq, "dispatching call");

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return DispatchOutcome::Cancelled,
            result = call => result,
        };
        drop(permit);

        match result {
            Ok(v) => DispatchOutcome::Success(v),
            Err(err) => {
                let outcome = DispatchOutcome::from_remote(err, self.throttle_fallback);
                if let DispatchOutcome::Throttled { retry_after } = &outcome {
                    tracing::warn!(
                        target: "taskbridge.dispatch",
                        op = op,
                        seq = seq,
                        wait_ms = retry_after.as_millis() as u64,
                        "remote throttled call"
                    );
                }
                outcome
            }
        }
    }

    /// Sleep for `delay` unless cancelled first. Returns false on cancellation.
    pub async fn pause(&self, delay: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }

    async fn claim_start_slot(&self) {
        let mut last = self.last_start.lock().await;
        if let Some(prev) = *last {
            tokio::time::sleep_until(prev + self.min_interval).await;
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn limiter(min_interval_ms: u64, max_concurrent: usize) -> LimiterConfig {
        LimiterConfig {
            min_interval_ms,
            max_concurrent,
            throttle_fallback_ms: 400,
        }
    }

    #[tokio::test]
    async fn successive_starts_are_spaced() {
        let dispatcher = Dispatcher::new(&limiter(40, 1));
        let begin = std::time::Instant::now();
        for i in 0..3 {
            let out = dispatcher
                .dispatch("spaced", async move { Ok::<_, RemoteError>(i) })
                .await;
            assert_eq!(out, DispatchOutcome::Success(i));
        }
        assert!(begin.elapsed() >= Duration::from_millis(80));
        assert_eq!(dispatcher.calls_started(), 3);
    }

    #[tokio::test]
    async fn calls_are_serviced_in_submission_order() {
        let dispatcher = Dispatcher::new(&limiter(0, 1));
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let futs = (0..8).map(|i| {
            let order = order.clone();
            let dispatcher = &dispatcher;
            async move {
                dispatcher
                    .dispatch("fifo", async move {
                        tokio::task::yield_now().await;
                        order.lock().unwrap().push(i);
                        Ok::<_, RemoteError>(())
                    })
                    .await
            }
        });
        futures::future::join_all(futs).await;

        assert_eq!(*order.lock().unwrap(), (0..8).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn in_flight_calls_respect_concurrency_cap() {
        let dispatcher = Arc::new(Dispatcher::new(&limiter(0, 2)));
        let in_flight = Arc::new(AtomicU64::new(0));
        let peak = Arc::new(AtomicU64::new(0));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let dispatcher = dispatcher.clone();
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            handles.push(tokio::spawn(async move {
                dispatcher
                    .dispatch("capped", async move {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        Ok::<_, RemoteError>(())
                    })
                    .await
            }));
        }
        for h in handles {
            assert!(h.await.unwrap().is_success());
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn single_permit_serializes_and_spaces_concurrent_callers() {
        let dispatcher = Arc::new(Dispatcher::new(&limiter(30, 1)));
        let in_flight = Arc::new(AtomicU64::new(0));
        let peak = Arc::new(AtomicU64::new(0));
        let starts = Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let dispatcher = dispatcher.clone();
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            let starts = starts.clone();
            handles.push(tokio::spawn(async move {
                dispatcher
                    .dispatch("serial", async move {
                        starts.lock().unwrap().push(std::time::Instant::now());
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        Ok::<_, RemoteError>(())
                    })
                    .await
            }));
        }
        for h in handles {
            assert!(h.await.unwrap().is_success());
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
        let mut starts = starts.lock().unwrap().clone();
        starts.sort();
        assert_eq!(starts.len(), 4);
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(25));
        }
    }

    #[tokio::test]
    async fn throttle_surfaces_wait_without_retrying() {
        let dispatcher = Dispatcher::new(&limiter(0, 1));
        let out: DispatchOutcome<()> = dispatcher
            .dispatch("throttled", async { Err(RemoteError::throttled(None)) })
            .await;
        assert_eq!(
            out,
            DispatchOutcome::Throttled {
                retry_after: Duration::from_millis(400)
            }
        );
        assert_eq!(dispatcher.calls_started(), 1);
    }

    #[tokio::test]
    async fn cancellation_aborts_pending_wait() {
        let dispatcher = Arc::new(Dispatcher::new(&limiter(60_000, 1)));
        let first = dispatcher
            .dispatch("first", async { Ok::<_, RemoteError>(()) })
            .await;
        assert!(first.is_success());

        let waiting = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                dispatcher
                    .dispatch("second", async { Ok::<_, RemoteError>(()) })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        dispatcher.cancel();

        let out = tokio::time::timeout(Duration::from_secs(5), waiting)
            .await
            .expect("cancelled dispatch must not hang")
            .unwrap();
        assert_eq!(out, DispatchOutcome::Cancelled);
        assert_eq!(dispatcher.calls_started(), 1);
        assert!(!dispatcher.pause(Duration::from_secs(60)).await);
    }
}
