use std::cell::Cell;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use backon::{ConstantBuilder, Retryable};
use log::warn;

const DEFAULT_MAX_ATTEMPTS: usize = 20;
const DEFAULT_DELAY_SECONDS: u64 = 2;

/// Fixed-delay retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: usize,
    /// Pause after each failed attempt except the last
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, Duration::from_secs(DEFAULT_DELAY_SECONDS))
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Constant backoff making `max_attempts` attempts in total.
    pub fn into_backoff(self) -> ConstantBuilder {
        ConstantBuilder::default()
            .with_delay(self.delay)
            .with_max_times(self.max_attempts.saturating_sub(1))
    }
}

/// Run `operation` until it succeeds or `policy.max_attempts` attempts have failed.
///
/// Returns the first success, or the error of the final attempt. `what` names the
/// operation in the retry warnings.
pub async fn retry_with_delay<T, E, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempt = Cell::new(1);

    operation
        .retry(policy.into_backoff())
        .sleep(tokio::time::sleep)
        .notify(|e: &E, delay: Duration| {
            warn!(
                "{what} failed ({e}), retrying in {}s ({}/{})...",
                delay.as_secs_f64(),
                attempt.get(),
                policy.max_attempts
            );
            attempt.set(attempt.get() + 1);
        })
        .await
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use tokio::time::Instant;
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    /// Fails the first `failures` calls, then succeeds with the attempt number.
    fn failing_times(failures: usize, calls: &Cell<usize>) -> impl FnMut() -> std::future::Ready<Result<usize, String>> + '_ {
        move || {
            calls.set(calls.get() + 1);
            let attempt = calls.get();
            std::future::ready(if attempt <= failures {
                Err(format!("disk busy #{attempt}"))
            } else {
                Ok(attempt)
            })
        }
    }

    #[test]
    fn test_backoff_pauses_only_between_attempts() {
        use backon::BackoffBuilder;

        let delays: Vec<Duration> = RetryPolicy::default().into_backoff().build().collect();
        assert_eq!(delays, vec![Duration::from_secs(2); 19]);

        let single: Vec<Duration> = RetryPolicy::new(1, Duration::from_secs(5))
            .into_backoff()
            .build()
            .collect();
        assert!(single.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_first_time_without_waiting() {
        let calls = Cell::new(0);
        let start = Instant::now();

        let result = retry_with_delay(&RetryPolicy::default(), "write", failing_times(0, &calls)).await;

        assert_eq!(assert_ok!(result), 1);
        assert_eq!(calls.get(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_last_attempt() {
        let calls = Cell::new(0);
        let start = Instant::now();

        let result = retry_with_delay(&RetryPolicy::default(), "write", failing_times(19, &calls)).await;

        assert_eq!(assert_ok!(result), 20);
        assert_eq!(calls.get(), 20);
        assert!(start.elapsed() >= Duration::from_secs(38));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let calls = Cell::new(0);
        let start = Instant::now();

        let result = retry_with_delay(&RetryPolicy::default(), "write", failing_times(usize::MAX, &calls)).await;

        assert_eq!(assert_err!(result), "disk busy #20");
        assert_eq!(calls.get(), 20);
        // no pause after the final failure
        assert!(start.elapsed() < Duration::from_secs(40));
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::new(0, Duration::from_secs(60));

        let result = retry_with_delay(&policy, "write", failing_times(5, &calls)).await;

        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }
}
