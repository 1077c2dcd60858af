//! Generation - procedural creation of arriving users.

mod users;

pub use users::*;
