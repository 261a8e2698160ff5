//! Retry policy values.

use std::fmt;
use std::time::Duration;

use crate::core::constants::{DEFAULT_MAX_CALLS, DEFAULT_RETRY_DELAY};
use crate::core::{Operation, RetryPredicate, always_retry};

/// How many times to attempt an operation and how long to wait in between.
pub struct RetryPolicy<E> {
    /// Total attempts including the first. Values below 1 behave as 1.
    pub max_calls: u32,
    /// Base backoff.
    pub delay: Duration,
    /// Decides whether a failure is retryable.
    pub is_retry_error: RetryPredicate<E>,
}

impl<E: 'static> Default for RetryPolicy<E> {
    fn default() -> Self {
        Self {
            max_calls: DEFAULT_MAX_CALLS,
            delay: DEFAULT_RETRY_DELAY,
            is_retry_error: always_retry(),
        }
    }
}

impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        Self {
            max_calls: self.max_calls,
            delay: self.delay,
            is_retry_error: self.is_retry_error.clone(),
        }
    }
}

impl<E> fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_calls", &self.max_calls)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl<E: 'static> RetryPolicy<E> {
    /// Policy making `max_calls` attempts with the default delay.
    pub fn new(max_calls: u32) -> Self {
        Self {
            max_calls,
            ..Self::default()
        }
    }
}

impl<E> RetryPolicy<E> {
    /// Set the base backoff.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the retryable-failure predicate.
    pub fn is_retry_error(mut self, predicate: RetryPredicate<E>) -> Self {
        self.is_retry_error = predicate;
        self
    }

    /// Attempts actually made (at least one).
    pub fn attempts(&self) -> u32 {
        self.max_calls.max(1)
    }

    /// Wait after failed attempt `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.delay.saturating_mul(attempt)
    }

    /// Longest total time spent waiting between attempts.
    ///
    /// Attempt execution time is not included.
    pub fn total_backoff(&self) -> Duration {
        (1..self.attempts())
            .map(|attempt| self.backoff(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }

    /// Whether a failure of attempt `attempt` should be followed by another attempt.
    pub fn should_retry(&self, error: &E, attempt: u32) -> bool {
        (self.is_retry_error)(error) && attempt < self.attempts()
    }
}

impl<E: Send + 'static> RetryPolicy<E> {
    /// Decorate `op` with this policy. See [`decorate_with_retry`](super::decorate_with_retry).
    pub fn decorate<I, T>(&self, op: Operation<I, T, E>) -> Operation<I, T, E>
    where
        I: Clone + Send + 'static,
        T: Send + 'static,
    {
        super::decorate_with_retry(op, self.max_calls, self.delay, self.is_retry_error.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::<()>::default();
        assert_eq!(policy.max_calls, 1);
        assert_eq!(policy.delay, Duration::from_millis(1000));
        assert!((policy.is_retry_error)(&()));
        assert_eq!(policy.total_backoff(), Duration::ZERO);
    }

    #[test]
    fn test_backoff_is_linear() {
        let policy = RetryPolicy::<()>::new(4).delay(Duration::from_millis(10));
        assert_eq!(policy.backoff(1), Duration::from_millis(10));
        assert_eq!(policy.backoff(2), Duration::from_millis(20));
        assert_eq!(policy.backoff(3), Duration::from_millis(30));
        assert_eq!(policy.total_backoff(), Duration::from_millis(60));
    }

    #[test]
    fn test_should_retry() {
        let policy =
            RetryPolicy::<u32>::new(3).is_retry_error(Arc::new(|code: &u32| *code >= 500));
        assert!(policy.should_retry(&503, 1));
        assert!(policy.should_retry(&503, 2));
        assert!(!policy.should_retry(&503, 3));
        assert!(!policy.should_retry(&404, 1));
    }

    #[test]
    fn test_zero_max_calls_means_one_attempt() {
        let policy = RetryPolicy::<()>::new(0);
        assert_eq!(policy.attempts(), 1);
        assert!(!policy.should_retry(&(), 1));
    }
}
