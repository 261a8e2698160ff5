//! Classified actions.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::declaration::{ActionDecl, ConflictPolicy, FactoryFn, PromiseFn, SyncFn};
use crate::core::constants::DEFAULT_MAX_CALLS;
use crate::core::{ActionError, RetryPredicate};

/// Discriminant of a classified action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Callable transition.
    Sync,
    /// Promise or factory record.
    Async,
    /// Record with synchronous hooks.
    AdvancedSync,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => f.write_str("a sync"),
            Self::Async => f.write_str("an async"),
            Self::AdvancedSync => f.write_str("an advanced sync"),
        }
    }
}

/// Async action in canonical form: owns `promise`.
pub struct PromiseAction<A, E> {
    /// The operation to run.
    pub promise: PromiseFn<A, E>,
    /// Total attempts; absent means [`DEFAULT_MAX_CALLS`].
    pub retry_count: Option<u32>,
    /// Conflict policy; absent means [`ConflictPolicy::Ignore`].
    pub conflict_policy: Option<ConflictPolicy>,
    /// Retryable-failure predicate; absent means every failure is retryable.
    pub is_retry_error: Option<RetryPredicate<E>>,
    /// Base backoff; absent means the crate default.
    pub delay: Option<Duration>,
}

impl<A, E> PromiseAction<A, E> {
    /// Create a promise action with no metadata.
    pub fn new(promise: PromiseFn<A, E>) -> Self {
        Self {
            promise,
            retry_count: None,
            conflict_policy: None,
            is_retry_error: None,
            delay: None,
        }
    }

    /// Attempts the action will make when decorated with retry.
    pub fn max_calls(&self) -> u32 {
        self.retry_count.unwrap_or(DEFAULT_MAX_CALLS)
    }

    /// Conflict policy the container should enforce.
    pub fn policy(&self) -> ConflictPolicy {
        self.conflict_policy.unwrap_or_default()
    }
}

impl<A, E> Clone for PromiseAction<A, E> {
    fn clone(&self) -> Self {
        Self {
            promise: self.promise.clone(),
            retry_count: self.retry_count,
            conflict_policy: self.conflict_policy,
            is_retry_error: self.is_retry_error.clone(),
            delay: self.delay,
        }
    }
}

impl<A, E> fmt::Debug for PromiseAction<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromiseAction")
            .field("retry_count", &self.retry_count)
            .field("conflict_policy", &self.conflict_policy)
            .field("is_retry_error", &self.is_retry_error.is_some())
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// Async action owning a refresh accessor instead of `promise`.
///
/// `retry_count` and `conflict_policy` are not kept: normalization always
/// replaces them with the factory defaults.
pub struct FactoryAction<A, E> {
    /// The accessor.
    pub promise_get: FactoryFn<A, E>,
    /// Retryable-failure predicate.
    pub is_retry_error: Option<RetryPredicate<E>>,
    /// Base backoff.
    pub delay: Option<Duration>,
}

impl<A, E> FactoryAction<A, E> {
    /// Create a factory action with no metadata.
    pub fn new(promise_get: FactoryFn<A, E>) -> Self {
        Self {
            promise_get,
            is_retry_error: None,
            delay: None,
        }
    }
}

impl<A, E> Clone for FactoryAction<A, E> {
    fn clone(&self) -> Self {
        Self {
            promise_get: self.promise_get.clone(),
            is_retry_error: self.is_retry_error.clone(),
            delay: self.delay,
        }
    }
}

impl<A, E> fmt::Debug for FactoryAction<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryAction")
            .field("is_retry_error", &self.is_retry_error.is_some())
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// Either async shape.
pub enum AsyncAction<A, E> {
    /// Canonical shape.
    Promise(PromiseAction<A, E>),
    /// Refresh-accessor shape.
    Factory(FactoryAction<A, E>),
}

impl<A, E> Clone for AsyncAction<A, E> {
    fn clone(&self) -> Self {
        match self {
            Self::Promise(action) => Self::Promise(action.clone()),
            Self::Factory(action) => Self::Factory(action.clone()),
        }
    }
}

impl<A, E> fmt::Debug for AsyncAction<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Promise(action) => action.fmt(f),
            Self::Factory(action) => action.fmt(f),
        }
    }
}

/// Record carrying named synchronous hooks for an external consumer.
#[derive(Clone, Default)]
pub struct AdvancedSyncAction {
    /// Hooks by name.
    pub hooks: BTreeMap<String, SyncFn>,
}

impl AdvancedSyncAction {
    /// Look up a hook.
    pub fn hook(&self, name: &str) -> Result<&SyncFn, ActionError> {
        self.hooks
            .get(name)
            .ok_or_else(|| ActionError::MissingHook(name.to_string()))
    }
}

impl fmt::Debug for AdvancedSyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvancedSyncAction")
            .field("hooks", &self.hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A classified action.
pub enum Action<A, E> {
    /// Callable transition.
    Sync(SyncFn),
    /// Promise or factory record.
    Async(AsyncAction<A, E>),
    /// Record with synchronous hooks.
    AdvancedSync(AdvancedSyncAction),
}

impl<A, E> Clone for Action<A, E> {
    fn clone(&self) -> Self {
        match self {
            Self::Sync(f) => Self::Sync(f.clone()),
            Self::Async(action) => Self::Async(action.clone()),
            Self::AdvancedSync(action) => Self::AdvancedSync(action.clone()),
        }
    }
}

impl<A, E> fmt::Debug for Action<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Sync(..)"),
            Self::Async(action) => f.debug_tuple("Async").field(action).finish(),
            Self::AdvancedSync(action) => f.debug_tuple("AdvancedSync").field(action).finish(),
        }
    }
}

impl<A, E> Action<A, E> {
    /// The variant tag.
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Sync(_) => ActionKind::Sync,
            Self::Async(_) => ActionKind::Async,
            Self::AdvancedSync(_) => ActionKind::AdvancedSync,
        }
    }

    /// Take the sync transition, or fail naming the expected variant.
    pub fn into_sync(self) -> Result<SyncFn, ActionError> {
        match self {
            Self::Sync(f) => Ok(f),
            other => Err(mismatch(ActionKind::Sync, other.kind())),
        }
    }

    /// Take the async action, or fail naming the expected variant.
    pub fn into_async(self) -> Result<AsyncAction<A, E>, ActionError> {
        match self {
            Self::Async(action) => Ok(action),
            other => Err(mismatch(ActionKind::Async, other.kind())),
        }
    }

    /// Take the advanced sync action, or fail naming the expected variant.
    pub fn into_advanced_sync(self) -> Result<AdvancedSyncAction, ActionError> {
        match self {
            Self::AdvancedSync(action) => Ok(action),
            other => Err(mismatch(ActionKind::AdvancedSync, other.kind())),
        }
    }
}

fn mismatch(expected: ActionKind, actual: ActionKind) -> ActionError {
    ActionError::VariantMismatch { expected, actual }
}

impl<A, E> ActionDecl<A, E> {
    /// Classify the declaration once, by shape.
    ///
    /// A record owning `promise_get` is a factory even if it also owns
    /// `promise`; the accessor takes the place of the operation.
    pub fn classify(self) -> Action<A, E> {
        let record = match self {
            Self::Callable(f) => return Action::Sync(f),
            Self::Record(record) => record,
        };

        if let Some(promise_get) = record.promise_get {
            return Action::Async(AsyncAction::Factory(FactoryAction {
                promise_get,
                is_retry_error: record.is_retry_error,
                delay: record.delay,
            }));
        }

        match record.promise {
            Some(promise) => Action::Async(AsyncAction::Promise(PromiseAction {
                promise,
                retry_count: record.retry_count,
                conflict_policy: record.conflict_policy,
                is_retry_error: record.is_retry_error,
                delay: record.delay,
            })),
            None => Action::AdvancedSync(AdvancedSyncAction {
                hooks: record.hooks,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionRecord;
    use crate::core::{Args, Invocation, Props, Snapshot, operation};
    use serde_json::Value;
    use std::sync::Arc;

    type Decl = ActionDecl<(), String>;

    fn promise_op() -> PromiseFn<(), String> {
        operation(|_inv: Invocation<()>| async { Ok(Value::Bool(true)) })
    }

    fn noop_hook() -> SyncFn {
        Arc::new(|state: &Snapshot, _: &Args, _: &Props| state.clone())
    }

    #[test]
    fn test_classify_callable() {
        let decl: Decl = ActionDecl::callable(|state, _, _| state.clone());
        assert_eq!(decl.classify().kind(), ActionKind::Sync);
    }

    #[test]
    fn test_classify_promise_keeps_metadata() {
        let decl: Decl = ActionRecord::new()
            .promise(promise_op())
            .retry_count(2)
            .conflict_policy(ConflictPolicy::Parallel)
            .delay(Duration::from_millis(50))
            .into();

        match decl.classify() {
            Action::Async(AsyncAction::Promise(action)) => {
                assert_eq!(action.max_calls(), 2);
                assert_eq!(action.policy(), ConflictPolicy::Parallel);
                assert_eq!(action.delay, Some(Duration::from_millis(50)));
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_promise_defaults_without_metadata() {
        let action = PromiseAction::<(), String>::new(promise_op());
        assert_eq!(action.max_calls(), 1);
        assert_eq!(action.policy(), ConflictPolicy::Ignore);
    }

    #[test]
    fn test_classify_factory_wins_over_promise() {
        let decl: Decl = ActionRecord::new()
            .promise(promise_op())
            .promise_get(Arc::new(|_: Snapshot, _: Props, _: ()| None))
            .into();

        assert!(matches!(
            decl.classify(),
            Action::Async(AsyncAction::Factory(_))
        ));
    }

    #[test]
    fn test_classify_advanced_sync_keeps_hooks() {
        let decl: Decl = ActionRecord::new().hook("optimistic", noop_hook()).into();
        let action = decl.classify().into_advanced_sync().unwrap();
        assert!(action.hook("optimistic").is_ok());
        assert_eq!(
            action.hook("rollback").err(),
            Some(ActionError::MissingHook("rollback".into()))
        );
    }

    #[test]
    fn test_variant_mismatch_names_expected() {
        let decl: Decl = ActionDecl::callable(|state, _, _| state.clone());
        let err = decl.classify().into_async().unwrap_err();
        assert_eq!(
            err,
            ActionError::VariantMismatch {
                expected: ActionKind::Async,
                actual: ActionKind::Sync,
            }
        );
        assert_eq!(err.to_string(), "expected an async action, got a sync action");
    }

    #[test]
    fn test_into_sync_rejects_record() {
        let decl: Decl = ActionRecord::new().promise(promise_op()).into();
        let err = decl.classify().into_sync().err().expect("record is not sync");
        assert!(err.to_string().starts_with("expected a sync action"));
    }
}
