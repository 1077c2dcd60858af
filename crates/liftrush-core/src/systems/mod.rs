//! Systems - logic that operates on components each tick.

mod departures;
mod lift_motion;
mod riders;
mod waiting;

pub use departures::*;
pub use lift_motion::*;
pub use riders::*;
pub use waiting::*;
