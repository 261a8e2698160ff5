//! # stateful-actions
//!
//! Action declarations, retry decoration and state-diff logging for state
//! containers. It provides:
//!
//! - **Classification**: a declared action is sorted once into sync, async
//!   (promise or factory) or advanced sync, by shape
//! - **Normalization**: factory actions become canonical promise actions with
//!   retry and conflict defaults
//! - **Retry**: any asynchronous operation can be wrapped with bounded
//!   attempts and linear backoff
//! - **Diffs**: two state snapshots are compared field by field for logging
//!
//! The container that owns state and enforces conflict policies lives
//! outside this crate.
//!
//! ## Feature Flags
//!
//! - `retry` (default): retry decorator (tokio timers)
//! - `diff` (default): state diff engine
//! - `logging` (default): transition logger, implies `diff`
//!
//! ## Modules
//!
//! - [`core`]: shared types, constants, configuration and errors (always included)
//! - [`action`]: declarations, classification and normalization (always included)
//! - [`retry`]: retry decorator (requires `retry` feature)
//! - [`diff`]: diff engine (requires `diff` feature)
//! - [`logging`]: change logger (requires `logging` feature)
//!
//! ## Example Usage
//!
//! ```rust
//! use serde_json::json;
//! use stateful_actions::prelude::*;
//!
//! let old = json!({"count": 1, "tags": ["a"]});
//! let new = json!({"count": 2, "tags": ["a", "b"]});
//! let (Some(old), Some(new)) = (old.as_object(), new.as_object()) else {
//!     unreachable!()
//! };
//!
//! let diff = build_diff(old, new);
//! assert_eq!(
//!     diff.to_value(),
//!     json!({"count": "1 => 2", "tags": {"added": ["b"], "removed": []}})
//! );
//!
//! let decl: ActionDecl<(), String> = ActionDecl::callable(|state, _args, _props| state.clone());
//! assert!(decl.is_sync_action());
//! assert_eq!(decl.classify().kind(), ActionKind::Sync);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

// Action declarations (always included)
pub mod action;

// Collection helpers (always included)
pub mod util;

// Test helpers for action declarations (always included)
pub mod testing;

// Retry decorator (feature-gated)
#[cfg(feature = "retry")]
#[cfg_attr(docsrs, doc(cfg(feature = "retry")))]
pub mod retry;

// Diff engine (feature-gated)
#[cfg(feature = "diff")]
#[cfg_attr(docsrs, doc(cfg(feature = "diff")))]
pub mod diff;

// Change logger (feature-gated)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::action::*;
    pub use crate::core::*;

    #[cfg(feature = "retry")]
    pub use crate::retry::{RetryPolicy, RetryState, decorate_with_retry};

    #[cfg(feature = "diff")]
    pub use crate::diff::{ElementChange, FieldChange, StateDiff, StateDiffer, build_diff};

    #[cfg(feature = "logging")]
    pub use crate::logging::{ChangeLogger, EventLog, Transition, TransitionLog};
}

// Re-export commonly used items at crate root
pub use crate::action::{Action, ActionDecl, ActionKind, ActionRecord, ConflictPolicy, PromiseAction};
pub use crate::core::{ActionError, BuildMode, Invocation, Operation, Snapshot};

#[cfg(feature = "retry")]
pub use crate::retry::decorate_with_retry;

#[cfg(feature = "diff")]
pub use crate::diff::build_diff;
