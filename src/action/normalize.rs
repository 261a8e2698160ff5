//! Normalization of async actions to the canonical promise shape.

use std::sync::Arc;

use super::declaration::{ConflictPolicy, PromiseFn};
use super::variant::{AsyncAction, FactoryAction, PromiseAction};
use crate::core::Invocation;
use crate::core::constants::FACTORY_RETRY_COUNT;

impl<A: 'static, E: 'static> FactoryAction<A, E> {
    /// Build the canonical promise action for this accessor.
    ///
    /// The accessor becomes the operation (call arguments are dropped) and
    /// the factory defaults are always applied: three attempts and
    /// [`ConflictPolicy::Reuse`].
    pub fn into_promise_action(self) -> PromiseAction<A, E> {
        let promise_get = self.promise_get;
        let promise: PromiseFn<A, E> = Arc::new(move |invocation: Invocation<A>| {
            promise_get(invocation.state, invocation.props, invocation.actions)
        });

        PromiseAction {
            promise,
            retry_count: Some(FACTORY_RETRY_COUNT),
            conflict_policy: Some(ConflictPolicy::Reuse),
            is_retry_error: self.is_retry_error,
            delay: self.delay,
        }
    }
}

impl<A: 'static, E: 'static> AsyncAction<A, E> {
    /// Canonical form of this action.
    ///
    /// A promise action is returned as is; a factory action is rebuilt with
    /// the factory defaults. Promise actions never receive those defaults,
    /// even when their own fields are absent.
    pub fn normalize(self) -> PromiseAction<A, E> {
        match self {
            Self::Promise(action) => action,
            Self::Factory(action) => action.into_promise_action(),
        }
    }
}

/// Canonical promise action for an async action.
pub fn compute_async_action_input<A: 'static, E: 'static>(
    action: AsyncAction<A, E>,
) -> PromiseAction<A, E> {
    action.normalize()
}

#[cfg(feature = "retry")]
mod executable {
    use serde_json::Value;

    use crate::action::PromiseAction;
    use crate::core::constants::DEFAULT_RETRY_DELAY;
    use crate::core::{Invocation, Operation, always_retry};
    use crate::retry::{RetryPolicy, decorate_with_retry};

    impl<A, E> PromiseAction<A, E>
    where
        A: Clone + Send + 'static,
        E: Send + 'static,
    {
        /// Retry policy described by this action's metadata.
        pub fn retry_policy(&self) -> RetryPolicy<E> {
            RetryPolicy {
                max_calls: self.max_calls(),
                delay: self.delay.unwrap_or(DEFAULT_RETRY_DELAY),
                is_retry_error: self.is_retry_error.clone().unwrap_or_else(always_retry),
            }
        }

        /// Executable form: the operation decorated with this action's retry policy.
        pub fn into_operation(self) -> Operation<Invocation<A>, Value, E> {
            let policy = self.retry_policy();
            decorate_with_retry(
                self.promise,
                policy.max_calls,
                policy.delay,
                policy.is_retry_error,
            )
        }
    }
}
