//! Core types, constants, configuration and error types.
//!
//! Always compiled; every other module builds on these definitions.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;
