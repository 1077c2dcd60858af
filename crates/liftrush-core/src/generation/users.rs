//! User generation - the infinite arrival stream.

use hecs::{Entity, World};
use rand::Rng;

use crate::components::{Patience, PatienceLevel, Rect, Side, Trip, User, UserPhase};
use crate::config::SimConfig;

/// Everything needed to place a new user in the world.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct SpawnDescriptor {
    pub floor: i32,
    pub destination: i32,
    pub patience: PatienceLevel,
    pub side: Side,
}

/// Infinite, restartable stream of arrivals.
///
/// Stateless apart from the floor count: every pull draws a fresh uniform
/// origin, a uniform destination excluding the origin, a patience level,
/// and a spawn side. Never exhausted.
#[derive(Debug, Clone)]
pub struct UserStream {
    floors: u32,
}

impl UserStream {
    pub fn new(floors: u32) -> Self {
        Self { floors }
    }

    pub fn next_arrival(&self, rng: &mut impl Rng) -> SpawnDescriptor {
        let floor = rng.gen_range(0..self.floors) as i32;
        // Uniform over the remaining floors without rejection sampling.
        let mut destination = rng.gen_range(0..self.floors - 1) as i32;
        if destination >= floor {
            destination += 1;
        }
        let patience = PatienceLevel::ALL[rng.gen_range(0..PatienceLevel::ALL.len())];
        let side = if rng.gen_bool(0.5) {
            Side::Left
        } else {
            Side::Right
        };

        SpawnDescriptor {
            floor,
            destination,
            patience,
            side,
        }
    }
}

/// Place a user entity in the world from a descriptor: off-screen on their
/// spawn side, standing on their origin floor line.
pub fn spawn_user(world: &mut World, descriptor: &SpawnDescriptor, config: &SimConfig) -> Entity {
    let mut rect = Rect::new(
        config.spawn_x(descriptor.side),
        0.0,
        config.user_width,
        config.user_height,
    );
    rect.set_bottom(config.floor_line(descriptor.floor));

    world.spawn((
        User,
        rect,
        Trip {
            floor: descriptor.floor,
            destination: descriptor.destination,
        },
        Patience::new(descriptor.patience),
        UserPhase::Approaching,
    ))
}
