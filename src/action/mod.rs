//! Action declarations and their classification.
//!
//! A user declares an action as a [`ActionDecl`]: either a plain callable or a
//! record of optional fields. [`ActionDecl::classify`] inspects that shape once
//! and yields the closed [`Action`] sum type, which the rest of the crate
//! matches on.
//!
//! Shapes:
//! - **sync**: a callable producing new state from old state, args and props
//! - **async promise**: a record owning `promise`
//! - **async factory**: a record owning `promise_get` (a refresh accessor with
//!   no call arguments)
//! - **advanced sync**: any other record, carrying named synchronous hooks

mod declaration;
mod normalize;
mod variant;

pub use declaration::*;
pub use normalize::*;
pub use variant::*;
