//! User-related components: the people calling the lift.

use serde::{Deserialize, Serialize};

/// Marker component identifying an entity as a lift user.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct User;

/// Which side of the world a user spawns on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Discrete patience levels, in seconds of tolerated waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatienceLevel {
    Testy,
    Normal,
    Chill,
}

impl PatienceLevel {
    pub const ALL: [PatienceLevel; 3] =
        [PatienceLevel::Testy, PatienceLevel::Normal, PatienceLevel::Chill];

    pub fn seconds(&self) -> f32 {
        match self {
            PatienceLevel::Testy => 5.0,
            PatienceLevel::Normal => 15.0,
            PatienceLevel::Chill => 30.0,
        }
    }
}

/// Where a user starts and where they want to go. `destination != floor`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Trip {
    pub floor: i32,
    pub destination: i32,
}

/// Remaining tolerance for waiting. Non-increasing, clamped at zero, and
/// only decays while the user is queued and blocked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Patience {
    pub remaining: f32,
    pub level: PatienceLevel,
}

impl Patience {
    pub fn new(level: PatienceLevel) -> Self {
        Self {
            remaining: level.seconds(),
            level,
        }
    }

    pub fn decay(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Urgency fraction for the HUD: 1.0 while comfortable, falling
    /// linearly toward 0.0 over the final five seconds.
    pub fn fraction(&self) -> f32 {
        if self.remaining > 5.0 {
            1.0
        } else {
            self.remaining / 5.0
        }
    }
}

/// Lifecycle state of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserPhase {
    /// Spawned, walking toward the lift shaft on their floor.
    Approaching,
    /// Packed against the queue boundary; patience is decaying.
    Queued,
    /// Aboard, holding a slot, traveling with the car.
    Riding,
    /// Delivered; walking off toward the nearer edge.
    Disembarking,
    /// Patience exhausted without ever boarding; storming off.
    Abandoning,
}

impl UserPhase {
    /// Terminal phases end in removal once the user walks out of bounds.
    pub fn is_leaving(&self) -> bool {
        matches!(self, UserPhase::Disembarking | UserPhase::Abandoning)
    }
}

/// Present only while the user holds a passenger slot on the lift.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LiftSlot(pub usize);
