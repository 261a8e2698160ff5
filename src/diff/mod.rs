//! Field-by-field comparison of state snapshots.
//!
//! Produces a compact description of what an action changed, for
//! diagnostic output only. Nothing here is applied back to state.

mod change;
mod engine;

pub use change::*;
pub use engine::*;
