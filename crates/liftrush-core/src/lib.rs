//! Lift Rush Core - Lift Operator Arcade Simulation
//!
//! A headless, deterministic-per-seed simulation of a single lift car
//! serving a stream of impatient users across the floors of a building.
//! The player accelerates the car up and down; users arrive at random
//! floors, queue at the doors, board when the car stops at their floor,
//! and either ride to their destination (served) or give up waiting
//! (complaint).
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) via `hecs`:
//! - **Entities**: the users calling the lift
//! - **Components**: pure data (Rect, Trip, Patience, UserPhase, ...)
//! - **Systems**: per-tick logic over those components; the single lift
//!   car is shared context owned by the `Simulation`, not an entity
//!
//! Rendering, input decoding, audio playback and menu flow are external
//! collaborators: the core consumes already-decoded [`engine::InputAction`]
//! tokens plus a delta time, and emits a [`engine::TickResult`] with
//! everything the outer layers need to draw and play.
//!
//! # Example
//!
//! ```rust,no_run
//! use liftrush_core::prelude::*;
//! use liftrush_core::config::SimConfig;
//!
//! let mut sim = Simulation::new(SimConfig::default()).unwrap();
//!
//! // Run a round at 60 FPS
//! loop {
//!     let result = sim.advance(&[InputAction::LiftUpPressed], 1.0 / 60.0);
//!     let _ = result.served;
//! }
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod generation;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::SimConfig;
    pub use crate::engine::{InputAction, Simulation, TickResult};
}
