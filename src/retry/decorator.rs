//! Retry decorator and the state machine driving each call.

use std::sync::Arc;
use std::time::Duration;

use super::policy::RetryPolicy;
use crate::core::{BoxFuture, Operation, RetryPredicate};

/// Where a single decorated call stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Waiting on attempt `n` (1-based).
    Attempting(u32),
    /// An attempt resolved; the call settled with its value.
    Succeeded,
    /// The call settled with a failure.
    Failed,
}

/// What to do after an attempt settles.
#[derive(Debug)]
pub enum RetryStep<T, E> {
    /// Settle the call with this result. Happens exactly once per call.
    Settle(Result<T, E>),
    /// Wait, then start the next attempt. `error` is the failure being retried.
    Retry {
        /// Backoff before the next attempt.
        wait: Duration,
        /// Failure of the attempt that just settled.
        error: E,
    },
}

/// Attempt sequence of one top-level call.
///
/// Each call to a decorated operation owns its own sequence; nothing is
/// shared between calls.
pub struct RetrySequence<I, T, E> {
    op: Operation<I, T, E>,
    input: I,
    policy: RetryPolicy<E>,
    state: RetryState,
}

impl<I, T, E> RetrySequence<I, T, E>
where
    I: Clone + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    /// Start a sequence whose first attempt is already in flight.
    pub fn new(op: Operation<I, T, E>, input: I, policy: RetryPolicy<E>) -> Self {
        Self {
            op,
            input,
            policy,
            state: RetryState::Attempting(1),
        }
    }

    /// Current state.
    pub fn state(&self) -> RetryState {
        self.state
    }

    /// Feed the outcome of the current attempt.
    ///
    /// Outcomes fed after the sequence settled are returned unchanged.
    pub fn advance(&mut self, outcome: Result<T, E>) -> RetryStep<T, E> {
        let attempt = match self.state {
            RetryState::Attempting(attempt) => attempt,
            RetryState::Succeeded | RetryState::Failed => return RetryStep::Settle(outcome),
        };

        match outcome {
            Ok(value) => {
                self.state = RetryState::Succeeded;
                RetryStep::Settle(Ok(value))
            }
            Err(error) if self.policy.should_retry(&error, attempt) => {
                let wait = self.policy.backoff(attempt);
                tracing::debug!(
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    "attempt failed, scheduling retry"
                );
                self.state = RetryState::Attempting(attempt + 1);
                RetryStep::Retry { wait, error }
            }
            Err(error) => {
                if attempt >= self.policy.attempts() {
                    tracing::warn!(attempts = attempt, "retries exhausted");
                } else {
                    tracing::debug!(attempt, "failure is not retryable");
                }
                self.state = RetryState::Failed;
                RetryStep::Settle(Err(error))
            }
        }
    }

    /// Drive the sequence to completion, starting from the in-flight first attempt.
    ///
    /// If a retried attempt reports "nothing to do", the call settles with
    /// the failure that triggered that retry.
    pub async fn run(mut self, first: BoxFuture<Result<T, E>>) -> Result<T, E> {
        let mut pending = first;
        loop {
            let outcome = pending.await;
            match self.advance(outcome) {
                RetryStep::Settle(result) => return result,
                RetryStep::Retry { wait, error } => {
                    tokio::time::sleep(wait).await;
                    match (self.op)(self.input.clone()) {
                        Some(next) => pending = next,
                        None => {
                            self.state = RetryState::Failed;
                            return Err(error);
                        }
                    }
                }
            }
        }
    }
}

/// Wrap `op` so failures are retried with linear backoff.
///
/// The wrapped operation is called exactly like `op`. Each call makes up to
/// `max_calls` attempts; failed attempt `n` is followed by a wait of
/// `n * delay`. A failure `is_retry_error` rejects settles the call at once.
/// The last failure is returned unchanged.
///
/// With `max_calls <= 1` the same operation is returned, not a wrapper. When
/// `op` returns `None` for a call, the wrapper returns `None` too.
pub fn decorate_with_retry<I, T, E>(
    op: Operation<I, T, E>,
    max_calls: u32,
    delay: Duration,
    is_retry_error: RetryPredicate<E>,
) -> Operation<I, T, E>
where
    I: Clone + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    if max_calls <= 1 {
        return op;
    }

    let policy = RetryPolicy {
        max_calls,
        delay,
        is_retry_error,
    };

    Arc::new(move |input: I| -> Option<BoxFuture<Result<T, E>>> {
        let first = op(input.clone())?;
        let sequence = RetrySequence::new(op.clone(), input, policy.clone());
        Some(Box::pin(sequence.run(first)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{always_retry, operation};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn never_retry<E>() -> RetryPredicate<E> {
        Arc::new(|_: &E| false)
    }

    /// Operation failing its first `failures` calls, recording call times.
    fn flaky(
        failures: u32,
        calls: Arc<AtomicU32>,
        times: Arc<Mutex<Vec<Instant>>>,
    ) -> Operation<(), &'static str, String> {
        operation(move |_: ()| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            times.lock().unwrap().push(Instant::now());
            async move {
                if n <= failures {
                    Err(format!("failure {n}"))
                } else {
                    Ok("done")
                }
            }
        })
    }

    #[test]
    fn test_single_call_returns_same_operation() {
        let op = operation(|x: u32| async move { Ok::<_, ()>(x + 1) });
        let wrapped = decorate_with_retry(op.clone(), 1, Duration::from_millis(10), always_retry());
        assert!(Arc::ptr_eq(&op, &wrapped));

        let wrapped = decorate_with_retry(op.clone(), 0, Duration::from_millis(10), always_retry());
        assert!(Arc::ptr_eq(&op, &wrapped));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success_with_linear_backoff() {
        let calls = Arc::new(AtomicU32::new(0));
        let times = Arc::new(Mutex::new(Vec::new()));
        let op = flaky(2, calls.clone(), times.clone());

        let wrapped = decorate_with_retry(op, 3, Duration::from_millis(10), always_retry());
        let result = wrapped(()).expect("work started").await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let times = times.lock().unwrap();
        let first_wait = times[1] - times[0];
        let second_wait = times[2] - times[1];
        assert!(first_wait >= Duration::from_millis(10) && first_wait < Duration::from_millis(20));
        assert!(second_wait >= Duration::from_millis(20) && second_wait < Duration::from_millis(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_failure_short_circuits() {
        let calls = Arc::new(AtomicU32::new(0));
        let times = Arc::new(Mutex::new(Vec::new()));
        let op = flaky(u32::MAX, calls.clone(), times);

        let wrapped = decorate_with_retry(op, 5, Duration::from_millis(10), never_retry());
        let result = wrapped(()).expect("work started").await;

        assert_eq!(result, Err("failure 1".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_return_last_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let times = Arc::new(Mutex::new(Vec::new()));
        let op = flaky(u32::MAX, calls.clone(), times);

        let wrapped = decorate_with_retry(op, 3, Duration::from_millis(10), always_retry());
        let started = Instant::now();
        let result = wrapped(()).expect("work started").await;

        assert_eq!(result, Err("failure 3".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_predicate_sees_each_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let times = Arc::new(Mutex::new(Vec::new()));
        let op = flaky(u32::MAX, calls.clone(), times);

        // Only the first failure is retryable.
        let predicate: RetryPredicate<String> = Arc::new(|err: &String| err == "failure 1");
        let wrapped = decorate_with_retry(op, 5, Duration::from_millis(10), predicate);
        let result = wrapped(()).expect("work started").await;

        assert_eq!(result, Err("failure 2".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_noop_result_is_propagated() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let op: Operation<(), (), ()> = Arc::new(move |_: ()| -> Option<BoxFuture<Result<(), ()>>> {
            counter.fetch_add(1, Ordering::SeqCst);
            None
        });

        let wrapped = decorate_with_retry(op, 3, Duration::from_millis(10), always_retry());
        assert!(wrapped(()).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_noop_on_retry_settles_with_previous_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let op: Operation<(), (), String> = Arc::new(move |_: ()| -> Option<BoxFuture<Result<(), String>>> {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            if n == 1 {
                Some(Box::pin(async { Err("busy".to_string()) }))
            } else {
                None
            }
        });

        let wrapped = decorate_with_retry(op, 3, Duration::from_millis(10), always_retry());
        let result = wrapped(()).expect("work started").await;

        assert_eq!(result, Err("busy".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_have_independent_sequences() {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = Arc::new(Mutex::new(Vec::<u32>::new()));
        let (counter, log) = (calls.clone(), seen.clone());

        // Fails the first time each input is seen.
        let op = operation(move |id: u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            let first_time = {
                let mut log = log.lock().unwrap();
                let first = !log.contains(&id);
                log.push(id);
                first
            };
            async move { if first_time { Err(id) } else { Ok(id * 10) } }
        });

        let wrapped = decorate_with_retry(op, 2, Duration::from_millis(10), always_retry());
        let a = wrapped(1).expect("work started");
        let b = wrapped(2).expect("work started");
        let (a, b) = tokio::join!(a, b);

        assert_eq!(a, Ok(10));
        assert_eq!(b, Ok(20));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_state_machine_transitions() {
        let op = operation(|_: ()| async { Ok::<u8, u8>(0) });
        let policy = RetryPolicy::new(2).delay(Duration::from_millis(5));
        let mut sequence = RetrySequence::new(op, (), policy);
        assert_eq!(sequence.state(), RetryState::Attempting(1));

        match sequence.advance(Err(1)) {
            RetryStep::Retry { wait, error } => {
                assert_eq!(wait, Duration::from_millis(5));
                assert_eq!(error, 1);
            }
            step => panic!("expected retry, got {step:?}"),
        }
        assert_eq!(sequence.state(), RetryState::Attempting(2));

        assert!(matches!(sequence.advance(Err(2)), RetryStep::Settle(Err(2))));
        assert_eq!(sequence.state(), RetryState::Failed);
    }

    #[test]
    fn test_state_machine_non_retryable_settles_first_attempt() {
        let op = operation(|_: ()| async { Ok::<u8, u8>(0) });
        let policy = RetryPolicy::new(3).is_retry_error(never_retry());
        let mut sequence = RetrySequence::new(op, (), policy);

        assert!(matches!(sequence.advance(Err(9)), RetryStep::Settle(Err(9))));
        assert_eq!(sequence.state(), RetryState::Failed);
    }

    #[test]
    fn test_state_machine_success() {
        let op = operation(|_: ()| async { Ok::<u8, u8>(0) });
        let mut sequence = RetrySequence::new(op, (), RetryPolicy::new(3));
        assert!(matches!(sequence.advance(Ok(7)), RetryStep::Settle(Ok(7))));
        assert_eq!(sequence.state(), RetryState::Succeeded);
    }
}
