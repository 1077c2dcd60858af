//! Components - pure data attached to entities or owned by the context.

mod common;
mod lift;
mod users;

pub use common::*;
pub use lift::*;
pub use users::*;
