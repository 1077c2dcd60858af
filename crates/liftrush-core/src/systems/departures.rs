//! Departure sweep - deferred removal of users who walked out of bounds.

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

/// How a user's visit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Delivered to their destination.
    Served,
    /// Gave up before ever boarding.
    Complaint,
}

/// Users flagged for removal during the per-user pass.
///
/// Mutating the active set while iterating it is disallowed, so systems
/// push here and the engine sweeps once the pass is complete.
#[derive(Debug, Default)]
pub struct Departures {
    pending: Vec<(Entity, Outcome)>,
}

impl Departures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entity: Entity, outcome: Outcome) {
        self.pending.push((entity, outcome));
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Round score accumulators.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct Scoreboard {
    pub served: u32,
    pub complaints: u32,
}

/// Despawn every flagged user and credit the scoreboard.
pub fn sweep_departures(world: &mut World, departures: &mut Departures, score: &mut Scoreboard) {
    for (entity, outcome) in departures.pending.drain(..) {
        match outcome {
            Outcome::Served => score.served += 1,
            Outcome::Complaint => score.complaints += 1,
        }
        log::debug!("user {:?} left: {:?}", entity, outcome);
        let _ = world.despawn(entity);
    }
}
