//! Error types for action handling and configuration.
//!
//! Failures raised by user operations are never wrapped: the retry decorator
//! hands the caller's own error type back unchanged.

use thiserror::Error;

use crate::action::ActionKind;

/// Errors raised when an action declaration is used as the wrong variant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The declaration was classified as a different variant.
    #[error("expected {expected} action, got {actual} action")]
    VariantMismatch {
        /// Variant the caller asked for.
        expected: ActionKind,
        /// Variant the declaration actually is.
        actual: ActionKind,
    },

    /// An advanced sync action has no hook under the requested name.
    #[error("advanced sync action has no hook named {0:?}")]
    MissingHook(String),
}

/// Errors raised while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable holds an unrecognized value.
    #[error("invalid value {value:?} for {var}: expected \"development\" or \"production\"")]
    InvalidMode {
        /// Variable name.
        var: &'static str,
        /// Value found.
        value: String,
    },
}

/// Failure of an action run through the test helpers.
#[derive(Debug, Error)]
pub enum RunError<E> {
    /// The declaration is not the variant the helper expects.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// The operation itself failed (after any retries).
    #[error("operation failed: {0}")]
    Operation(E),
}

impl<E> RunError<E> {
    /// Return the operation failure, if that is what this is.
    pub fn into_operation(self) -> Option<E> {
        match self {
            Self::Operation(err) => Some(err),
            Self::Action(_) => None,
        }
    }
}
