//! Round configuration - building geometry, physics constants, timings.
//!
//! Everything tunable about a round lives here. Validation happens once at
//! construction; the per-tick hot path never re-checks.

use serde::{Deserialize, Serialize};

use crate::components::{Rect, Side};

/// Parameters for one round of the simulation.
///
/// Coordinates are screen-style: y grows downward, the ground line sits at
/// `ground`, and floor `i`'s line is `ground - i * floor_height`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of floors, indexed 0 (ground) upward.
    pub floors: u32,
    /// Vertical distance between floor lines.
    pub floor_height: f32,
    /// Tracked world width; users outside it are removed.
    pub world_width: f32,
    /// Tracked world height.
    pub world_height: f32,
    /// Y coordinate of the ground line.
    pub ground: f32,
    pub lift_width: f32,
    pub lift_height: f32,
    /// Passenger slots in the car.
    pub capacity: usize,
    /// Acceleration magnitude applied while an input is held.
    pub accel: f32,
    pub max_speed: f32,
    /// Dead zone: speeds below this collapse to zero.
    pub min_speed: f32,
    /// Multiplicative velocity damping applied once per tick.
    pub damping: f32,
    /// Snapping only engages below this speed.
    pub snap_max_speed: f32,
    /// Distance from the floor-height midpoint beyond which the car snaps.
    pub snap_threshold: f32,
    /// Speeds below this count as "stopped" for disembark checks.
    pub stop_epsilon: f32,
    /// How close the car bottom must be to a destination line to let
    /// riders off.
    pub arrive_tolerance: f32,
    /// Horizontal walking speed of users.
    pub walk_speed: f32,
    /// Walking speed of a user who has given up.
    pub storm_off_speed: f32,
    /// Gap kept between queued users and whatever they pack against.
    pub queue_gap: f32,
    pub user_width: f32,
    pub user_height: f32,
    /// Mean of the normal distribution the spawn countdown is drawn from.
    pub mean_spawn_interval: f32,
    pub spawn_interval_stddev: f32,
    /// How long the start cue plays before motion counts as cruising.
    pub start_cue_duration: f32,
    /// Seed for the round's rng; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            floors: 10,
            floor_height: 50.0,
            world_width: 400.0,
            world_height: 600.0,
            ground: 550.0,
            lift_width: 50.0,
            lift_height: 50.0,
            capacity: 4,
            accel: 800.0,
            max_speed: 300.0,
            min_speed: 10.0,
            damping: 0.9,
            snap_max_speed: 50.0,
            snap_threshold: 10.0,
            stop_epsilon: 5.0,
            arrive_tolerance: 5.0,
            walk_speed: 50.0,
            storm_off_speed: 100.0,
            queue_gap: 5.0,
            user_width: 16.0,
            user_height: 30.0,
            mean_spawn_interval: 3.0,
            spawn_interval_stddev: 1.0,
            start_cue_duration: 0.6,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Total vertical span of the building above the ground line.
    pub fn building_height(&self) -> f32 {
        self.floors as f32 * self.floor_height
    }

    /// Y coordinate of floor `i`'s line.
    pub fn floor_line(&self, floor: i32) -> f32 {
        self.ground - floor as f32 * self.floor_height
    }

    /// The tracked world rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.world_width, self.world_height)
    }

    /// Starting car rectangle: centered horizontally, parked at floor 0.
    pub fn lift_start_rect(&self) -> Rect {
        Rect::new(
            self.world_width / 2.0 - self.lift_width / 2.0,
            self.ground - self.lift_height,
            self.lift_width,
            self.lift_height,
        )
    }

    /// Spawn x coordinate for a side: one user-width off-screen.
    pub fn spawn_x(&self, side: Side) -> f32 {
        match side {
            Side::Left => -self.user_width,
            Side::Right => self.world_width,
        }
    }

    /// Fail fast on misconfiguration. Called by `Simulation::new`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.floors < 2 {
            return Err(ConfigError::TooFewFloors { floors: self.floors });
        }
        for (field, value) in [
            ("floor_height", self.floor_height),
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("accel", self.accel),
            ("max_speed", self.max_speed),
            ("walk_speed", self.walk_speed),
            ("storm_off_speed", self.storm_off_speed),
            ("user_width", self.user_width),
            ("user_height", self.user_height),
            ("mean_spawn_interval", self.mean_spawn_interval),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field });
            }
        }
        if self.spawn_interval_stddev < 0.0 {
            return Err(ConfigError::NegativeStddev {
                stddev: self.spawn_interval_stddev,
            });
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(ConfigError::DampingOutOfRange {
                damping: self.damping,
            });
        }
        if self.lift_width >= self.world_width {
            return Err(ConfigError::LiftTooWide {
                lift_width: self.lift_width,
                world_width: self.world_width,
            });
        }
        if self.ground < self.building_height() {
            return Err(ConfigError::BuildingTallerThanWorld {
                building_height: self.building_height(),
                ground: self.ground,
            });
        }
        Ok(())
    }
}

/// Errors that can occur when constructing a round.
#[derive(Debug)]
pub enum ConfigError {
    ZeroCapacity,
    TooFewFloors { floors: u32 },
    NonPositive { field: &'static str },
    NegativeStddev { stddev: f32 },
    DampingOutOfRange { damping: f32 },
    LiftTooWide { lift_width: f32, world_width: f32 },
    BuildingTallerThanWorld { building_height: f32, ground: f32 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroCapacity => write!(f, "lift capacity must be at least 1"),
            ConfigError::TooFewFloors { floors } => {
                write!(f, "need at least 2 floors, got {}", floors)
            }
            ConfigError::NonPositive { field } => {
                write!(f, "{} must be positive", field)
            }
            ConfigError::NegativeStddev { stddev } => {
                write!(f, "spawn interval stddev must be non-negative, got {}", stddev)
            }
            ConfigError::DampingOutOfRange { damping } => {
                write!(f, "damping must be in [0, 1], got {}", damping)
            }
            ConfigError::LiftTooWide {
                lift_width,
                world_width,
            } => {
                write!(
                    f,
                    "lift width {} does not fit in world width {}",
                    lift_width, world_width
                )
            }
            ConfigError::BuildingTallerThanWorld {
                building_height,
                ground,
            } => {
                write!(
                    f,
                    "building height {} exceeds ground line {}",
                    building_height, ground
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
