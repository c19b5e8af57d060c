//! Retry with exponential backoff, cut short by window shutdown.

use crate::app::shutdown::Shutdown;
use rand::RngExt;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Failure of a single attempt.
#[derive(Debug)]
pub enum Attempt<E> {
    /// Worth trying again after a backoff.
    Retry(E),
    /// Give up immediately.
    Stop(E),
}

impl<E> From<E> for Attempt<E> {
    fn from(err: E) -> Self {
        Attempt::Retry(err)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    #[error("cancelled")]
    Cancelled,
    #[error("{0}")]
    Stopped(E),
    #[error("gave up after retrying: {0}")]
    Exhausted(E),
}

/// Run `op` up to `attempts` times. The wait after the first failure is
/// `delay` plus up to half again of random jitter, and doubles from there.
///
/// The shutdown signal is checked before every attempt and raced against
/// every wait; once it fires no further attempt is made.
pub async fn retry<T, E, F, Fut>(
    attempts: u32,
    delay: Duration,
    shutdown: &Shutdown,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, Attempt<E>>>,
{
    let attempts = attempts.max(1);
    let mut delay = delay;
    let mut attempt = 1;
    loop {
        if shutdown.is_triggered() {
            return Err(RetryError::Cancelled);
        }

        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(Attempt::Stop(e)) => return Err(RetryError::Stopped(e)),
            Err(Attempt::Retry(e)) if attempt >= attempts => {
                return Err(RetryError::Exhausted(e))
            }
            Err(Attempt::Retry(e)) => {
                delay = with_jitter(delay);
                debug!(attempt, error = %e, wait_ms = delay.as_millis() as u64, "attempt failed");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.triggered() => return Err(RetryError::Cancelled),
        }
        delay = delay.saturating_mul(2);
        attempt += 1;
    }
}

fn with_jitter(delay: Duration) -> Duration {
    let nanos = delay.as_nanos().min(u64::MAX as u128) as u64;
    if nanos == 0 {
        return delay;
    }
    let jitter = rand::rng().random_range(0..nanos);
    delay + Duration::from_nanos(jitter / 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_succeeds_after_failures() {
        let shutdown = Shutdown::new();
        let calls = Arc::new(AtomicU32::new(0));
        let result = retry(5, Duration::from_millis(1), &shutdown, |attempt| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if attempt < 3 {
                    Err(Attempt::Retry("not yet"))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_returns_last_error() {
        let shutdown = Shutdown::new();
        let result: Result<(), _> = retry(3, Duration::from_millis(1), &shutdown, |attempt| async move {
            Err(Attempt::Retry(format!("failure {}", attempt)))
        })
        .await;
        match result {
            Err(RetryError::Exhausted(e)) => assert_eq!(e, "failure 3"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stop_ends_immediately() {
        let shutdown = Shutdown::new();
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry(5, Duration::from_millis(1), &shutdown, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Attempt::Stop("fatal")) }
        })
        .await;
        assert!(matches!(result, Err(RetryError::Stopped("fatal"))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_attempt_after_shutdown() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let calls = AtomicU32::new(0);
        let result: Result<(), RetryError<&str>> =
            retry(5, Duration::from_millis(1), &shutdown, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .await;
        assert!(matches!(result, Err(RetryError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_backoff() {
        let shutdown = Shutdown::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.trigger();
        });

        let calls = AtomicU32::new(0);
        let result: Result<(), _> = tokio::time::timeout(
            Duration::from_secs(2),
            retry(5, Duration::from_secs(30), &shutdown, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Attempt::Retry("down")) }
            }),
        )
        .await
        .expect("backoff should be cut short");
        assert!(matches!(result, Err(RetryError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_jitter_adds_at_most_half() {
        let base = Duration::from_millis(100);
        for _ in 0..100 {
            let d = with_jitter(base);
            assert!(d >= base && d < base + base / 2);
        }
        assert_eq!(with_jitter(Duration::ZERO), Duration::ZERO);
    }
}
