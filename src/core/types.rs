//! Shared value types.
//!
//! State is owned by the surrounding container. This crate only ever sees
//! snapshots of it, as ordered JSON objects.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{Map, Value};

/// Immutable view of container state at one point in time.
///
/// Field order is insertion order.
pub type Snapshot = Map<String, Value>;

/// Arguments an action was called with.
pub type Args = Vec<Value>;

/// Ambient properties handed to every action.
pub type Props = Value;

/// Boxed future returned by asynchronous operations.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// An asynchronous operation over input `I`.
///
/// Returning `None` instead of a future is the "nothing to do" result: no
/// work was started and no retry will be scheduled.
pub type Operation<I, T, E> = Arc<dyn Fn(I) -> Option<BoxFuture<Result<T, E>>> + Send + Sync>;

/// Predicate deciding whether a failure should be retried.
pub type RetryPredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Everything a canonical promise operation receives on each call.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation<A> {
    /// Call arguments.
    pub args: Args,
    /// State at call time.
    pub state: Snapshot,
    /// Ambient properties.
    pub props: Props,
    /// Handle to sibling actions.
    pub actions: A,
}

impl<A> Invocation<A> {
    /// Create an invocation.
    pub fn new(args: Args, state: Snapshot, props: Props, actions: A) -> Self {
        Self {
            args,
            state,
            props,
            actions,
        }
    }
}

/// Wrap a closure returning a future as an [`Operation`] that always starts work.
pub fn operation<I, T, E, F, Fut>(f: F) -> Operation<I, T, E>
where
    I: 'static,
    T: 'static,
    E: 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    Arc::new(move |input: I| -> Option<BoxFuture<Result<T, E>>> { Some(Box::pin(f(input))) })
}

/// Predicate that treats every failure as retryable.
pub fn always_retry<E: 'static>() -> RetryPredicate<E> {
    Arc::new(|_: &E| true)
}
