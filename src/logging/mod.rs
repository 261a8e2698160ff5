//! Diagnostic logging of action transitions.
//!
//! Output goes through `tracing`. Each log call also returns what it emitted,
//! so callers (and tests) can inspect it without installing a subscriber.

mod logger;

pub use logger::*;
