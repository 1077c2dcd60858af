//! The lift car: physical body plus passenger slot bookkeeping.

use hecs::Entity;
use serde::{Deserialize, Serialize};

use super::common::Rect;

/// Horizontal inset from the car walls to the first/last passenger slot.
const SLOT_INSET: f32 = 8.0;

/// The single player-controlled lift car.
///
/// Not an ECS entity itself: there is exactly one, and every system needs
/// it, so it lives on the simulation context and is passed by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lift {
    /// Car rectangle; `bottom()` is the floor-alignment reference.
    pub rect: Rect,
    /// Vertical velocity in units/second, positive is downward.
    pub velocity: f32,
    /// Vertical acceleration set by input, one of {0, +accel, -accel}.
    pub acceleration: f32,
    /// Passenger slots. A slot owns at most one rider; index is stable
    /// from boarding until the rider disembarks.
    #[serde(skip)]
    pub passengers: Vec<Option<Entity>>,
    /// Motion classification for audio/animation cueing.
    pub motion: MotionState,
    /// Seconds spent in the current motion state.
    pub motion_time: f32,
    /// The cue currently playing, if any. Never re-requested while active.
    pub active_cue: Option<SoundCue>,
}

impl Lift {
    pub fn new(rect: Rect, capacity: usize) -> Self {
        Self {
            rect,
            velocity: 0.0,
            acceleration: 0.0,
            passengers: vec![None; capacity],
            motion: MotionState::Stopped,
            motion_time: 0.0,
            active_cue: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.passengers.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.passengers.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.passengers.iter().all(|s| s.is_some())
    }

    /// Indices of currently free slots.
    pub fn free_slots(&self) -> Vec<usize> {
        self.passengers
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Center x of a slot's standing position inside the car.
    pub fn slot_center_x(&self, slot: usize) -> f32 {
        let slot_width = (self.rect.w - 2.0 * SLOT_INSET) / self.capacity() as f32;
        self.rect.x + SLOT_INSET + slot as f32 * slot_width + slot_width / 2.0
    }

    /// Free a slot if it is held by `rider`.
    pub fn vacate(&mut self, slot: usize, rider: Entity) {
        if self.passengers.get(slot).copied().flatten() == Some(rider) {
            self.passengers[slot] = None;
        }
    }
}

/// Resolve which floor a bottom edge sits on.
///
/// Shared by the lift and by waiting users so both encodings agree: a rect
/// whose bottom is exactly on a floor line resolves to that floor.
pub fn floor_at(bottom: f32, ground: f32, floor_height: f32) -> i32 {
    ((ground - bottom) / floor_height).floor() as i32
}

/// Motion classification, driving the audio cue state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionState {
    /// Velocity inside the dead zone.
    Stopped,
    /// Moving, within the start-cue duration window.
    Starting,
    /// Accelerating past the start window.
    Cruising,
    /// Moving with no acceleration applied.
    Stopping,
}

/// Named sound cues the renderer/audio layer can play. Fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    LiftStart,
    LiftCruise,
    LiftStop,
}

impl SoundCue {
    /// Asset lookup name for the excluded audio layer.
    pub fn name(&self) -> &'static str {
        match self {
            SoundCue::LiftStart => "lift_start",
            SoundCue::LiftCruise => "lift_cruise",
            SoundCue::LiftStop => "lift_stop",
        }
    }
}

/// At most one of these is reported per tick: stop the old cue (if any)
/// and begin the new one (if any).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundEvent {
    pub stop: Option<SoundCue>,
    pub play: Option<SoundCue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_lift() -> Lift {
        Lift::new(Rect::new(175.0, 500.0, 50.0, 50.0), 4)
    }

    #[test]
    fn test_slot_bookkeeping() {
        let mut world = hecs::World::new();
        let rider = world.spawn(());

        let mut lift = test_lift();
        assert_eq!(lift.capacity(), 4);
        assert_eq!(lift.free_slots(), vec![0, 1, 2, 3]);

        lift.passengers[2] = Some(rider);
        assert_eq!(lift.occupied_count(), 1);
        assert!(!lift.is_full());
        assert_eq!(lift.free_slots(), vec![0, 1, 3]);

        // Vacating with the wrong rider is a no-op
        let other = world.spawn(());
        lift.vacate(2, other);
        assert_eq!(lift.occupied_count(), 1);

        lift.vacate(2, rider);
        assert_eq!(lift.occupied_count(), 0);
    }

    #[test]
    fn test_slot_centers_inside_car() {
        let lift = test_lift();
        for slot in 0..4 {
            let cx = lift.slot_center_x(slot);
            assert!(cx > lift.rect.left() && cx < lift.rect.right());
        }
        // Slots are laid out left to right
        assert!(lift.slot_center_x(0) < lift.slot_center_x(3));
    }

    #[test]
    fn test_floor_resolution() {
        // Ground at 550, floor height 50: bottom 550 is floor 0,
        // bottom 400 is floor 3.
        assert_eq!(floor_at(550.0, 550.0, 50.0), 0);
        assert_eq!(floor_at(400.0, 550.0, 50.0), 3);
        // Partway between floors resolves downward
        assert_eq!(floor_at(530.0, 550.0, 50.0), 0);
        assert_eq!(floor_at(501.0, 550.0, 50.0), 0);
        assert_eq!(floor_at(500.0, 550.0, 50.0), 1);
    }
}
