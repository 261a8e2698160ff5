//! Bounded retry with linear backoff.
//!
//! Implements:
//! - Transparent decoration of any [`Operation`](crate::core::Operation)
//! - Linear backoff: attempt `n` waits `n * delay` before attempt `n + 1`
//! - Short-circuit on failures the predicate marks as permanent
//! - One settlement per call, driven by an explicit state machine

mod decorator;
mod policy;

pub use decorator::*;
pub use policy::*;
