//! Bounded exponential backoff
//!
//! Only `Err` results are retried. ERP business rejections travel as `Ok`
//! values and pass straight through.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Max retry attempts
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Initial retry delay
const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(5);
const DEFAULT_MULTIPLIER: f64 = 1.5;
const MAX_DELAY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total invocations, including the first one
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration, multiplier: f64) -> Self {
        Self {
            max_attempts,
            initial_delay,
            multiplier,
        }
    }

    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO, 1.0)
    }

    /// Delay before the next attempt; never shrinks, capped at 60s
    pub fn next_delay(&self, current: Duration) -> Duration {
        let factor = if self.multiplier.is_finite() {
            self.multiplier.max(1.0)
        } else {
            1.0
        };
        Duration::try_from_secs_f64(current.as_secs_f64() * factor)
            .unwrap_or(Duration::MAX)
            .min(MAX_DELAY.max(current))
    }
}

/// Run `op` until it succeeds or `policy.max_attempts` is used up
///
/// Returns the last error when every attempt failed.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_delay;
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts => {
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "{label} failed, retrying: {e}"
                );
                tokio::time::sleep(delay).await;
                delay = policy.next_delay(delay);
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(attempts = attempt, "{label} failed after all attempts: {e}");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn assert_close(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual < expected + Duration::from_millis(5),
            "expected ~{expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay, Duration::from_secs(5));
        assert_eq!(
            policy.next_delay(Duration::from_secs(5)),
            Duration::from_millis(7500)
        );
    }

    #[test]
    fn test_next_delay_never_shrinks() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1), 0.5);
        assert_eq!(policy.next_delay(Duration::from_secs(1)), Duration::from_secs(1));
        let policy = RetryPolicy::new(3, Duration::from_secs(50), 2.0);
        assert_eq!(policy.next_delay(Duration::from_secs(50)), Duration::from_secs(60));
    }

    #[test]
    fn test_huge_multiplier_saturates_at_cap() {
        let policy = RetryPolicy::new(3, Duration::from_secs(5), 1e300);
        assert_eq!(policy.next_delay(Duration::from_secs(5)), Duration::from_secs(60));
        assert_eq!(policy.next_delay(Duration::ZERO), Duration::ZERO);
        let policy = RetryPolicy::new(3, Duration::from_secs(5), f64::MAX);
        assert_eq!(policy.next_delay(Duration::from_secs(60)), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_twice_then_succeeds() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();
        let mut stamps = Vec::new();

        let result: Result<u32, String> = with_retry(&RetryPolicy::default(), "op", || {
            stamps.push(started.elapsed());
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { if n <= 2 { Err(format!("boom {n}")) } else { Ok(n) } }
        })
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_close(stamps[1] - stamps[0], Duration::from_secs(5));
        assert_close(stamps[2] - stamps[1], Duration::from_millis(7500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_once_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = with_retry(&RetryPolicy::default(), "op", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n == 0 { Err("down".to_string()) } else { Ok(()) } }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = with_retry(&RetryPolicy::default(), "op", || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Err(format!("failure {n}")) }
        })
        .await;

        assert_eq!(result, Err("failure 3".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_ok_values_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<bool, String> = with_retry(&RetryPolicy::default(), "op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(false) }
        })
        .await;

        assert_eq!(result, Ok(false));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
