//! Lift motion system - input handling, integration, floor snap, audio cues.

use crate::components::{floor_at, Lift, MotionState, SoundCue, SoundEvent};
use crate::config::SimConfig;
use crate::engine::InputAction;

/// Apply this tick's decoded input tokens to the lift's acceleration.
///
/// Tokens arrive in event order; the last one wins, which resolves
/// simultaneous up+down presses.
pub fn apply_lift_input(lift: &mut Lift, actions: &[InputAction], accel: f32) {
    for action in actions {
        match action {
            InputAction::LiftUpPressed => lift.acceleration = -accel,
            InputAction::LiftDownPressed => lift.acceleration = accel,
            InputAction::LiftUpReleased | InputAction::LiftDownReleased => {
                lift.acceleration = 0.0
            }
        }
    }
}

/// Integrate the car's motion for one tick and return the resolved floor.
///
/// The floor is resolved before snapping: boarding decisions use the
/// unsnapped position, matching where the car visually is mid-settle.
pub fn lift_motion_system(lift: &mut Lift, config: &SimConfig, dt: f32) -> i32 {
    if dt <= 0.0 {
        return floor_at(lift.rect.bottom(), config.ground, config.floor_height);
    }

    lift.velocity += lift.acceleration * dt;
    if lift.velocity.abs() < config.min_speed {
        lift.velocity = 0.0;
    }
    lift.velocity = lift.velocity.clamp(-config.max_speed, config.max_speed);
    // Damping is applied once per tick, not time-scaled; the handling
    // feel is tuned around a 60 Hz tick.
    lift.velocity *= config.damping;

    lift.rect.y += lift.velocity * dt;

    // Keep the car inside the shaft. Velocity is not zeroed here; the
    // clamp alone halts movement past the bounds.
    let bottom = lift
        .rect
        .bottom()
        .clamp(config.ground - config.building_height(), config.ground);
    lift.rect.set_bottom(bottom);

    let floor = floor_at(lift.rect.bottom(), config.ground, config.floor_height);

    // Magnetic settle: while slow, pull the car onto the nearer floor line
    // unless it is hovering near the midpoint between two floors.
    if lift.velocity.abs() < config.snap_max_speed {
        let offset = (config.ground - lift.rect.bottom()).rem_euclid(config.floor_height);
        if (config.floor_height / 2.0 - offset).abs() > config.snap_threshold {
            if offset < config.floor_height / 2.0 {
                lift.rect.set_bottom(lift.rect.bottom() + offset);
            } else {
                lift.rect
                    .set_bottom(lift.rect.bottom() - (config.floor_height - offset));
            }
        }
    }

    floor
}

/// Reclassify the car's motion state and report at most one cue change.
pub fn classify_motion(lift: &mut Lift, config: &SimConfig, dt: f32) -> Option<SoundEvent> {
    let moving = lift.velocity != 0.0;

    let next = match lift.motion {
        MotionState::Stopped if moving => MotionState::Starting,
        MotionState::Stopped => MotionState::Stopped,
        _ if !moving => MotionState::Stopped,
        _ if lift.acceleration == 0.0 => MotionState::Stopping,
        MotionState::Starting if lift.motion_time < config.start_cue_duration => {
            MotionState::Starting
        }
        // Still moving under acceleration, past the start window, or
        // re-engaged before ever coming to rest.
        _ => MotionState::Cruising,
    };

    if next != lift.motion {
        lift.motion = next;
        lift.motion_time = 0.0;
    } else {
        lift.motion_time += dt;
    }

    let desired = match lift.motion {
        MotionState::Stopped => None,
        MotionState::Starting => Some(SoundCue::LiftStart),
        MotionState::Cruising => Some(SoundCue::LiftCruise),
        MotionState::Stopping => Some(SoundCue::LiftStop),
    };

    if desired != lift.active_cue {
        let event = SoundEvent {
            stop: lift.active_cue,
            play: desired,
        };
        lift.active_cue = desired;
        Some(event)
    } else {
        None
    }
}
