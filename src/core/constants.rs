//! Default values shared by actions, the retry decorator and the diff engine.
//!
//! Changing any of these alters observable retry and logging behavior.

use std::time::Duration;

// =============================================================================
// RETRY DEFAULTS
// =============================================================================

/// Total attempts when an action does not declare `retry_count` (no retry).
pub const DEFAULT_MAX_CALLS: u32 = 1;

/// Base backoff between attempts. Attempt `n` waits `n * DEFAULT_RETRY_DELAY`.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Total attempts injected when a factory action is normalized.
pub const FACTORY_RETRY_COUNT: u32 = 3;

// =============================================================================
// DIFF RENDERING
// =============================================================================

/// Element lists longer than this collapse to a count summary.
pub const DIFF_LIST_LIMIT: usize = 10;

/// Marker recorded for a field removed from the state.
pub const DELETED_MARKER: &str = "was deleted";

/// Rendering of an empty string inside a `"old => new"` transition.
pub const EMPTY_STRING_LITERAL: &str = "\"\"";

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Environment variable read by [`BuildMode::from_env`](crate::core::BuildMode::from_env).
pub const MODE_ENV_VAR: &str = "STATEFUL_ACTIONS_MODE";
