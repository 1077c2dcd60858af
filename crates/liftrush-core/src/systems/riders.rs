//! Rider system - users who hold (or held) a lift slot.
//!
//! Covers the Riding and Disembarking phases: pinning riders to the car,
//! walking them to their slot position, letting them off when the car
//! stops at their destination, and walking them out of the world.

use hecs::{Entity, World};
use rand::Rng;

use super::departures::{Departures, Outcome};
use crate::components::{Lift, LiftSlot, Rect, Trip, User, UserPhase};
use crate::config::SimConfig;

pub fn riders_system(
    world: &mut World,
    lift: &mut Lift,
    config: &SimConfig,
    dt: f32,
    rng: &mut impl Rng,
    departures: &mut Departures,
) {
    let riders: Vec<(Entity, UserPhase)> = world
        .query::<(&User, &UserPhase)>()
        .iter()
        .filter(|(_, (_, phase))| {
            matches!(phase, UserPhase::Riding | UserPhase::Disembarking)
        })
        .map(|(entity, (_, phase))| (entity, *phase))
        .collect();

    for (entity, phase) in riders {
        match phase {
            UserPhase::Riding => update_rider(world, lift, config, dt, rng, departures, entity),
            _ => update_leaver(world, lift, config, dt, rng, departures, entity),
        }
    }
}

/// Advance one rider: disembark if the car is stopped at their
/// destination, otherwise ride along and shuffle toward their slot.
fn update_rider(
    world: &mut World,
    lift: &mut Lift,
    config: &SimConfig,
    dt: f32,
    rng: &mut impl Rng,
    departures: &mut Departures,
    entity: Entity,
) {
    let Ok(trip) = world.get::<&Trip>(entity).map(|t| *t) else {
        return;
    };
    let Ok(slot) = world.get::<&LiftSlot>(entity).map(|s| s.0) else {
        return;
    };

    let destination_line = config.floor_line(trip.destination);
    let at_destination = (lift.rect.bottom() - destination_line).abs() < config.arrive_tolerance;
    let stopped = lift.velocity.abs() < config.stop_epsilon;

    if at_destination && stopped {
        // Delivered. The slot frees immediately; the walk out starts on
        // the same tick.
        lift.vacate(slot, entity);
        let _ = world.remove_one::<LiftSlot>(entity);
        if let Ok(mut phase) = world.get::<&mut UserPhase>(entity) {
            *phase = UserPhase::Disembarking;
        }
        log::debug!("user {:?} disembarking at floor {}", entity, trip.destination);
        update_leaver(world, lift, config, dt, rng, departures, entity);
        return;
    }

    if let Ok(mut rect) = world.get::<&mut Rect>(entity) {
        // Ride with the car.
        rect.set_bottom(lift.rect.bottom());

        // Ease toward the assigned slot, then hold exactly at its center.
        let slot_x = lift.slot_center_x(slot);
        if (rect.center_x() - slot_x).abs() > 1.0 {
            let direction = if rect.center_x() < slot_x { 1.0 } else { -1.0 };
            rect.x += direction * config.walk_speed * dt;
        } else {
            rect.set_center_x(slot_x);
        }
    }
}

/// Walk a delivered user toward the nearer edge; flag them served once
/// they leave the tracked bounds.
fn update_leaver(
    world: &mut World,
    lift: &Lift,
    config: &SimConfig,
    dt: f32,
    rng: &mut impl Rng,
    departures: &mut Departures,
    entity: Entity,
) {
    let Ok(mut rect) = world.get::<&mut Rect>(entity) else {
        return;
    };

    let offset = rect.center_x() - lift.rect.center_x();
    let direction = if offset > 0.0 {
        1.0
    } else if offset < 0.0 {
        -1.0
    } else if rng.gen_bool(0.5) {
        1.0
    } else {
        -1.0
    };
    rect.x += direction * config.walk_speed * dt;

    if !config.bounds().contains_rect(&rect) {
        departures.push(entity, Outcome::Served);
    }
}
