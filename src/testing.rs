//! Helpers for exercising action declarations in tests.
//!
//! Each helper classifies the declaration, rejects the wrong variant with
//! [`ActionError::VariantMismatch`], and runs the action.

use crate::action::ActionDecl;
use crate::core::{ActionError, Args, Props, Snapshot};

/// Run a sync action and return the new state.
pub fn run_sync_action<A, E>(
    action: ActionDecl<A, E>,
    state: &Snapshot,
    args: &Args,
    props: &Props,
) -> Result<Snapshot, ActionError> {
    let transition = action.classify().into_sync()?;
    Ok(transition(state, args, props))
}

/// Run one named hook of an advanced sync action.
pub fn run_advanced_hook<A, E>(
    action: ActionDecl<A, E>,
    hook: &str,
    state: &Snapshot,
    args: &Args,
    props: &Props,
) -> Result<Snapshot, ActionError> {
    let action = action.classify().into_advanced_sync()?;
    let hook = action.hook(hook)?;
    Ok(hook(state, args, props))
}

#[cfg(feature = "retry")]
pub use self::run_async::run_async_action;

#[cfg(feature = "retry")]
mod run_async {
    use serde_json::Value;

    use crate::action::ActionDecl;
    use crate::core::{Invocation, RunError};

    /// Normalize an async action, decorate it with its retry policy and run it.
    ///
    /// `Ok(None)` means the action had nothing to do.
    pub async fn run_async_action<A, E>(
        action: ActionDecl<A, E>,
        invocation: Invocation<A>,
    ) -> Result<Option<Value>, RunError<E>>
    where
        A: Clone + Send + 'static,
        E: Send + 'static,
    {
        let operation = action.classify().into_async()?.normalize().into_operation();
        match operation(invocation) {
            Some(pending) => pending.await.map(Some).map_err(RunError::Operation),
            None => Ok(None),
        }
    }
}
