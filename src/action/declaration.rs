//! Structural action declarations.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{Args, BoxFuture, Invocation, Operation, Props, RetryPredicate, Snapshot};

/// Synchronous transition: `(old state, args, props) -> new state`.
pub type SyncFn = Arc<dyn Fn(&Snapshot, &Args, &Props) -> Snapshot + Send + Sync>;

/// Canonical asynchronous operation of a promise action.
pub type PromiseFn<A, E> = Operation<Invocation<A>, Value, E>;

/// Refresh accessor of a factory action: `(state, props, actions)`, no call arguments.
pub type FactoryFn<A, E> =
    Arc<dyn Fn(Snapshot, Props, A) -> Option<BoxFuture<Result<Value, E>>> + Send + Sync>;

/// How overlapping in-flight calls of the same action are reconciled.
///
/// Only carried here; the state container enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictPolicy {
    /// Reject re-entrant calls while one is in flight.
    #[default]
    Ignore,
    /// Hand re-entrant callers the in-flight result.
    Reuse,
    /// Run every call and keep every result.
    KeepAll,
    /// Run every call, keep only the latest result.
    KeepLast,
    /// Run calls concurrently without coordination.
    Parallel,
}

/// A user-authored action declaration, before classification.
pub enum ActionDecl<A, E> {
    /// A callable value.
    Callable(SyncFn),
    /// A record of optional fields.
    Record(ActionRecord<A, E>),
}

/// Record-shaped declaration. Every field is optional; which ones are
/// present decides the variant.
pub struct ActionRecord<A, E> {
    /// Promise-producing operation.
    pub promise: Option<PromiseFn<A, E>>,
    /// Argument-less refresh accessor.
    pub promise_get: Option<FactoryFn<A, E>>,
    /// Total attempts, including the first.
    pub retry_count: Option<u32>,
    /// Conflict policy tag.
    pub conflict_policy: Option<ConflictPolicy>,
    /// Decides whether a failure is retryable.
    pub is_retry_error: Option<RetryPredicate<E>>,
    /// Base backoff between attempts.
    pub delay: Option<Duration>,
    /// Named synchronous hooks (advanced sync actions).
    pub hooks: BTreeMap<String, SyncFn>,
}

impl<A, E> Default for ActionRecord<A, E> {
    fn default() -> Self {
        Self {
            promise: None,
            promise_get: None,
            retry_count: None,
            conflict_policy: None,
            is_retry_error: None,
            delay: None,
            hooks: BTreeMap::new(),
        }
    }
}

impl<A, E> ActionRecord<A, E> {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the promise operation.
    pub fn promise(mut self, op: PromiseFn<A, E>) -> Self {
        self.promise = Some(op);
        self
    }

    /// Set the refresh accessor.
    pub fn promise_get(mut self, op: FactoryFn<A, E>) -> Self {
        self.promise_get = Some(op);
        self
    }

    /// Set the total number of attempts.
    pub fn retry_count(mut self, count: u32) -> Self {
        self.retry_count = Some(count);
        self
    }

    /// Set the conflict policy.
    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = Some(policy);
        self
    }

    /// Set the retryable-failure predicate.
    pub fn is_retry_error(mut self, predicate: RetryPredicate<E>) -> Self {
        self.is_retry_error = Some(predicate);
        self
    }

    /// Set the base backoff.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Add a named synchronous hook.
    pub fn hook(mut self, name: impl Into<String>, hook: SyncFn) -> Self {
        self.hooks.insert(name.into(), hook);
        self
    }

    /// Whether the record owns `promise`.
    pub fn owns_promise(&self) -> bool {
        self.promise.is_some()
    }

    /// Whether the record owns `promise_get`.
    pub fn owns_promise_get(&self) -> bool {
        self.promise_get.is_some()
    }
}

impl<A, E> fmt::Debug for ActionRecord<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRecord")
            .field("promise", &self.promise.is_some())
            .field("promise_get", &self.promise_get.is_some())
            .field("retry_count", &self.retry_count)
            .field("conflict_policy", &self.conflict_policy)
            .field("is_retry_error", &self.is_retry_error.is_some())
            .field("delay", &self.delay)
            .field("hooks", &self.hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<A, E> fmt::Debug for ActionDecl<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callable(_) => f.write_str("Callable(..)"),
            Self::Record(record) => f.debug_tuple("Record").field(record).finish(),
        }
    }
}

impl<A, E> ActionDecl<A, E> {
    /// Declare a sync action from a closure.
    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(&Snapshot, &Args, &Props) -> Snapshot + Send + Sync + 'static,
    {
        Self::Callable(Arc::new(f))
    }

    /// True iff the declaration is callable.
    pub fn is_sync_action(&self) -> bool {
        matches!(self, Self::Callable(_))
    }

    /// True iff the declaration is a record owning `promise` or `promise_get`.
    pub fn is_async_action(&self) -> bool {
        match self {
            Self::Callable(_) => false,
            Self::Record(record) => record.owns_promise() || record.owns_promise_get(),
        }
    }

    /// True iff the declaration is a record owning neither `promise` nor `promise_get`.
    pub fn is_advanced_sync_action(&self) -> bool {
        match self {
            Self::Callable(_) => false,
            Self::Record(record) => !record.owns_promise() && !record.owns_promise_get(),
        }
    }
}

impl<A, E> From<ActionRecord<A, E>> for ActionDecl<A, E> {
    fn from(record: ActionRecord<A, E>) -> Self {
        Self::Record(record)
    }
}

/// Free-function form of [`ActionDecl::is_sync_action`].
pub fn is_sync_action<A, E>(action: &ActionDecl<A, E>) -> bool {
    action.is_sync_action()
}

/// Free-function form of [`ActionDecl::is_async_action`].
pub fn is_async_action<A, E>(action: &ActionDecl<A, E>) -> bool {
    action.is_async_action()
}

/// Free-function form of [`ActionDecl::is_advanced_sync_action`].
pub fn is_advanced_sync_action<A, E>(action: &ActionDecl<A, E>) -> bool {
    action.is_advanced_sync_action()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operation;

    type Decl = ActionDecl<(), String>;

    fn promise_op() -> PromiseFn<(), String> {
        operation(|_inv: Invocation<()>| async { Ok(Value::Null) })
    }

    fn factory_op() -> FactoryFn<(), String> {
        Arc::new(|_state: Snapshot, _props: Props, _actions: ()| None)
    }

    fn predicates(decl: &Decl) -> (bool, bool, bool) {
        (
            is_sync_action(decl),
            is_async_action(decl),
            is_advanced_sync_action(decl),
        )
    }

    #[test]
    fn test_callable_is_only_sync() {
        let decl: Decl = ActionDecl::callable(|state, _args, _props| state.clone());
        assert_eq!(predicates(&decl), (true, false, false));
    }

    #[test]
    fn test_promise_record_is_only_async() {
        let decl: Decl = ActionRecord::new().promise(promise_op()).into();
        assert_eq!(predicates(&decl), (false, true, false));
    }

    #[test]
    fn test_factory_record_is_only_async() {
        let decl: Decl = ActionRecord::new().promise_get(factory_op()).into();
        assert_eq!(predicates(&decl), (false, true, false));
    }

    #[test]
    fn test_bare_record_is_only_advanced_sync() {
        let decl: Decl = ActionRecord::new()
            .retry_count(4)
            .hook("optimistic", Arc::new(|state: &Snapshot, _: &Args, _: &Props| state.clone()))
            .into();
        assert_eq!(predicates(&decl), (false, false, true));
    }

    #[test]
    fn test_conflict_policy_tags() {
        assert_eq!(ConflictPolicy::default(), ConflictPolicy::Ignore);
        assert_eq!(
            serde_json::to_value(ConflictPolicy::KeepAll).unwrap(),
            Value::String("KEEP_ALL".into())
        );
        let parsed: ConflictPolicy = serde_json::from_str("\"REUSE\"").unwrap();
        assert_eq!(parsed, ConflictPolicy::Reuse);
    }

    #[test]
    fn test_record_debug_hides_closures() {
        let record: ActionRecord<(), String> = ActionRecord::new()
            .promise(promise_op())
            .delay(Duration::from_millis(5));
        let rendered = format!("{record:?}");
        assert!(rendered.contains("promise: true"));
        assert!(rendered.contains("promise_get: false"));
    }
}
