//! Simulation engine - main entry point for running a round.

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::components::{
    floor_at, Lift, MotionState, Patience, Rect, SoundEvent, Trip, User, UserPhase,
};
use crate::config::{ConfigError, SimConfig};
use crate::generation::{spawn_user, SpawnDescriptor, UserStream};
use crate::systems::{
    apply_lift_input, classify_motion, lift_motion_system, riders_system, sweep_departures,
    waiting_system, Departures, Scoreboard,
};

/// Abstract input tokens, already decoded by the (excluded) input layer.
///
/// Up and down are mutually exclusive; when both arrive in one tick the
/// last token wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputAction {
    LiftUpPressed,
    LiftUpReleased,
    LiftDownPressed,
    LiftDownReleased,
}

/// One round of the simulation: the lift, the active users, the score.
///
/// All mutable state lives here and is mutated only by `advance`, once per
/// frame, on a single thread. The rendering/HUD layer reads the returned
/// `TickResult` after the tick completes.
pub struct Simulation {
    /// ECS world containing the user entities.
    pub world: World,
    /// The player-controlled car.
    pub lift: Lift,
    config: SimConfig,
    stream: UserStream,
    rng: StdRng,
    spawn_interval: Normal<f32>,
    spawn_countdown: f32,
    score: Scoreboard,
    departures: Departures,
    sim_time: f64,
    resolved_floor: i32,
}

impl Simulation {
    /// Create a round from a validated configuration.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let spawn_interval =
            Normal::new(config.mean_spawn_interval, config.spawn_interval_stddev).map_err(
                |_| ConfigError::NegativeStddev {
                    stddev: config.spawn_interval_stddev,
                },
            )?;
        let spawn_countdown = spawn_interval.sample(&mut rng);
        let lift = Lift::new(config.lift_start_rect(), config.capacity);
        let stream = UserStream::new(config.floors);
        let resolved_floor = floor_at(lift.rect.bottom(), config.ground, config.floor_height);

        Ok(Self {
            world: World::new(),
            lift,
            config,
            stream,
            rng,
            spawn_interval,
            spawn_countdown,
            score: Scoreboard::default(),
            departures: Departures::new(),
            sim_time: 0.0,
            resolved_floor,
        })
    }

    /// Advance the round by one frame.
    ///
    /// Order within the tick: input, lift integration and snap, spawn
    /// check, boarded users, waiting users, then the deferred removal
    /// sweep. With `dt <= 0` nothing moves, decays or spawns; only
    /// comparison-gated transitions (like a stopped car letting riders
    /// off) may still fire.
    pub fn advance(&mut self, actions: &[InputAction], dt: f32) -> TickResult {
        apply_lift_input(&mut self.lift, actions, self.config.accel);
        self.resolved_floor = lift_motion_system(&mut self.lift, &self.config, dt);
        let sound = classify_motion(&mut self.lift, &self.config, dt);
        if let Some(event) = &sound {
            log::debug!(
                "cue change: stop {:?}, play {:?}",
                event.stop.map(|c| c.name()),
                event.play.map(|c| c.name())
            );
        }

        // At most one arrival per tick. A negative countdown draw just
        // means the next tick spawns immediately.
        if dt > 0.0 {
            self.spawn_countdown -= dt;
            if self.spawn_countdown <= 0.0 {
                let descriptor = self.stream.next_arrival(&mut self.rng);
                spawn_user(&mut self.world, &descriptor, &self.config);
                self.spawn_countdown = self.spawn_interval.sample(&mut self.rng);
                log::debug!(
                    "spawned user at floor {} for floor {} ({:?} side)",
                    descriptor.floor,
                    descriptor.destination,
                    descriptor.side
                );
            }
        }

        riders_system(
            &mut self.world,
            &mut self.lift,
            &self.config,
            dt,
            &mut self.rng,
            &mut self.departures,
        );
        waiting_system(
            &mut self.world,
            &mut self.lift,
            self.resolved_floor,
            &self.config,
            dt,
            &mut self.rng,
            &mut self.departures,
        );
        sweep_departures(&mut self.world, &mut self.departures, &mut self.score);

        self.sim_time += dt as f64;
        self.tick_result(sound)
    }

    /// Inject a user directly, bypassing the arrival stream. Used by the
    /// harness and scenario tests.
    pub fn spawn_user_now(&mut self, descriptor: &SpawnDescriptor) -> Entity {
        spawn_user(&mut self.world, descriptor, &self.config)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// The lift's floor as resolved on the most recent tick (pre-snap).
    pub fn resolved_floor(&self) -> i32 {
        self.resolved_floor
    }

    pub fn served_users(&self) -> u32 {
        self.score.served
    }

    pub fn complaints(&self) -> u32 {
        self.score.complaints
    }

    /// Count active users still in the world.
    pub fn user_count(&self) -> usize {
        self.world.query::<&User>().iter().count()
    }

    /// Count users currently holding a slot.
    pub fn rider_count(&self) -> usize {
        self.lift.occupied_count()
    }

    fn tick_result(&self, sound: Option<SoundEvent>) -> TickResult {
        let mut users: Vec<UserView> = self
            .world
            .query::<(&User, &Rect, &Trip, &Patience, &UserPhase)>()
            .iter()
            .map(|(entity, (_, rect, trip, patience, phase))| UserView {
                id: entity.to_bits().get(),
                rect: *rect,
                floor: floor_at(rect.bottom(), self.config.ground, self.config.floor_height),
                destination: trip.destination,
                patience: patience.remaining,
                urgency: patience.fraction(),
                phase: *phase,
            })
            .collect();
        users.sort_by_key(|u| u.id);

        TickResult {
            lift: LiftView {
                rect: self.lift.rect,
                velocity: self.lift.velocity,
                floor: self.resolved_floor,
                motion: self.lift.motion,
            },
            users,
            served: self.score.served,
            complaints: self.score.complaints,
            sound,
        }
    }
}

/// Everything the rendering/HUD layer needs after one tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickResult {
    pub lift: LiftView,
    pub users: Vec<UserView>,
    pub served: u32,
    pub complaints: u32,
    /// Zero-or-one cue change this tick.
    pub sound: Option<SoundEvent>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LiftView {
    pub rect: Rect,
    pub velocity: f32,
    pub floor: i32,
    pub motion: MotionState,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct UserView {
    pub id: u64,
    pub rect: Rect,
    /// Floor the user's rect currently resolves to.
    pub floor: i32,
    pub destination: i32,
    pub patience: f32,
    /// 1.0 while comfortable, falling toward 0.0 near abandonment.
    pub urgency: f32,
    pub phase: UserPhase,
}
