//! Waiting system - users who have not boarded.
//!
//! Covers Approaching, Queued and Abandoning: the walk toward the shaft,
//! the per-floor per-side queue packing, the boarding guard, patience
//! decay, and the storm-off walk of users who gave up.
//!
//! Queue ordering is emergent: users pack tightly against the car door or
//! against the nearest queued user between them and the car, so position
//! alone encodes arrival order. There is no explicit queue structure.

use hecs::{Entity, World};
use rand::seq::SliceRandom;
use rand::Rng;

use super::departures::{Departures, Outcome};
use crate::components::{floor_at, Lift, LiftSlot, Patience, Rect, Trip, User, UserPhase};
use crate::config::SimConfig;

pub fn waiting_system(
    world: &mut World,
    lift: &mut Lift,
    lift_floor: i32,
    config: &SimConfig,
    dt: f32,
    rng: &mut impl Rng,
    departures: &mut Departures,
) {
    let waiters: Vec<(Entity, UserPhase)> = world
        .query::<(&User, &UserPhase)>()
        .iter()
        .filter(|(_, (_, phase))| {
            matches!(
                phase,
                UserPhase::Approaching | UserPhase::Queued | UserPhase::Abandoning
            )
        })
        .map(|(entity, (_, phase))| (entity, *phase))
        .collect();

    for (entity, phase) in waiters {
        if phase == UserPhase::Abandoning {
            storm_off(world, lift, config, dt, departures, entity);
        } else {
            update_waiter(world, lift, lift_floor, config, dt, rng, entity, phase);
        }
    }
}

/// Advance one unboarded, still-patient user.
#[allow(clippy::too_many_arguments)]
fn update_waiter(
    world: &mut World,
    lift: &mut Lift,
    lift_floor: i32,
    config: &SimConfig,
    dt: f32,
    rng: &mut impl Rng,
    entity: Entity,
    entry_phase: UserPhase,
) {
    let Ok(trip) = world.get::<&Trip>(entity).map(|t| *t) else {
        return;
    };
    let Ok(mut rect) = world.get::<&Rect>(entity).map(|r| *r) else {
        return;
    };
    let mut phase = entry_phase;
    let mut boarded_slot = None;

    // Stand on the floor line. The floor is derived from the rect the
    // same way the lift's floor is resolved, so the two encodings agree.
    let current_floor = floor_at(rect.bottom(), config.ground, config.floor_height);
    rect.set_bottom(config.floor_line(current_floor));

    // Walk toward the shaft.
    let on_left = rect.center_x() < lift.rect.center_x();
    let direction = if on_left { 1.0 } else { -1.0 };
    rect.x += direction * config.walk_speed * dt;

    // Everyone else still waiting on this floor; their far edges bound
    // how close this user can get.
    let others: Vec<Rect> = world
        .query::<(&User, &Rect, &Trip, &Patience, &UserPhase)>()
        .iter()
        .filter(|(other, (_, _, other_trip, other_patience, other_phase))| {
            *other != entity
                && other_trip.floor == trip.floor
                && other_patience.remaining > 0.0
                && matches!(other_phase, UserPhase::Approaching | UserPhase::Queued)
        })
        .map(|(_, (_, other_rect, _, _, _))| *other_rect)
        .collect();

    // The queue boundary is the nearest of: the door, or the closest
    // queued user strictly between this one and the car. While the lift
    // is elsewhere or full the boundary clamps at the near door edge so
    // nobody overlaps the car; otherwise it reaches the far edge, letting
    // the front of the queue step into the door span to board.
    let blocked = lift_floor != trip.floor || lift.is_full();

    if on_left {
        let door = if blocked {
            lift.rect.left()
        } else {
            lift.rect.right()
        };
        let mut end_of_queue = door.min(config.world_width);
        for other in &others {
            if rect.right() < other.left() && other.left() < lift.rect.left() {
                end_of_queue = end_of_queue.min(other.left());
            }
        }
        if end_of_queue <= rect.right() + config.queue_gap {
            rect.set_right(end_of_queue - config.queue_gap);
            if phase == UserPhase::Approaching {
                phase = UserPhase::Queued;
            }
        }
    } else {
        let door = if blocked {
            lift.rect.right()
        } else {
            lift.rect.left()
        };
        let mut end_of_queue = door.max(0.0);
        for other in &others {
            if rect.left() > other.right() && other.right() > lift.rect.right() {
                end_of_queue = end_of_queue.max(other.right());
            }
        }
        if end_of_queue >= rect.left() - config.queue_gap {
            rect.set_left(end_of_queue + config.queue_gap);
            if phase == UserPhase::Approaching {
                phase = UserPhase::Queued;
            }
        }
    }

    if !blocked && lift.rect.left() <= rect.center_x() && rect.center_x() <= lift.rect.right() {
        // Board: a uniformly random free slot, not lowest-free-first.
        let free = lift.free_slots();
        if let Some(&slot) = free.choose(rng) {
            rect.set_bottom(lift.rect.bottom());
            lift.passengers[slot] = Some(entity);
            boarded_slot = Some(slot);
            phase = UserPhase::Riding;
            log::debug!(
                "user {:?} boarded slot {} at floor {}",
                entity,
                slot,
                trip.floor
            );
        }
    }

    // Patience only decays while queued and blocked, never during the
    // initial approach walk. A user who boarded this tick still pays the
    // tick they spent at the front of the queue.
    let was_queued = entry_phase == UserPhase::Queued || phase == UserPhase::Queued;
    let mut exhausted = false;
    if let Ok(mut patience) = world.get::<&mut Patience>(entity) {
        if was_queued {
            patience.decay(dt);
        }
        exhausted = patience.is_exhausted();
    }
    if exhausted && phase != UserPhase::Riding {
        phase = UserPhase::Abandoning;
        log::debug!("user {:?} gave up waiting at floor {}", entity, trip.floor);
    }

    if let Ok(mut stored) = world.get::<&mut Rect>(entity) {
        *stored = rect;
    }
    if let Ok(mut stored) = world.get::<&mut UserPhase>(entity) {
        *stored = phase;
    }
    if let Some(slot) = boarded_slot {
        let _ = world.insert_one(entity, LiftSlot(slot));
    }
}

/// Walk a fed-up user off the world, away from the lift, at the faster
/// storm-off speed; flag a complaint once they leave the tracked bounds.
fn storm_off(
    world: &mut World,
    lift: &Lift,
    config: &SimConfig,
    dt: f32,
    departures: &mut Departures,
    entity: Entity,
) {
    let Ok(mut rect) = world.get::<&mut Rect>(entity) else {
        return;
    };

    let direction = if rect.center_x() < lift.rect.center_x() {
        -1.0
    } else {
        1.0
    };
    rect.x += direction * config.storm_off_speed * dt;

    if !config.bounds().contains_rect(&rect) {
        departures.push(entity, Outcome::Complaint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{PatienceLevel, Side};
    use crate::generation::{spawn_user, SpawnDescriptor};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    fn setup() -> (World, Lift, SimConfig, StdRng) {
        let config = SimConfig::default();
        let lift = Lift::new(config.lift_start_rect(), config.capacity);
        (World::new(), lift, config, StdRng::seed_from_u64(11))
    }

    fn spawn_at(
        world: &mut World,
        config: &SimConfig,
        floor: i32,
        side: Side,
        patience: PatienceLevel,
    ) -> Entity {
        spawn_user(
            world,
            &SpawnDescriptor {
                floor,
                destination: (floor + 1) % config.floors as i32,
                patience,
                side,
            },
            config,
        )
    }

    fn run(
        world: &mut World,
        lift: &mut Lift,
        lift_floor: i32,
        config: &SimConfig,
        rng: &mut StdRng,
        departures: &mut Departures,
        ticks: usize,
    ) {
        for _ in 0..ticks {
            waiting_system(world, lift, lift_floor, config, DT, rng, departures);
        }
    }

    #[test]
    fn test_walks_toward_lift_and_queues() {
        let (mut world, mut lift, config, mut rng) = setup();
        let mut departures = Departures::new();
        // Lift parked at floor 0; user arrives at floor 3, so they queue.
        let user = spawn_at(&mut world, &config, 3, Side::Left, PatienceLevel::Chill);

        run(&mut world, &mut lift, 0, &config, &mut rng, &mut departures, 600);

        let rect = *world.get::<&Rect>(user).unwrap();
        // Packed against the door, outside the car.
        assert!((rect.right() - (lift.rect.left() - config.queue_gap)).abs() < 1.0);
        assert_eq!(*world.get::<&UserPhase>(user).unwrap(), UserPhase::Queued);
        // Still standing on their own floor line.
        assert_eq!(rect.bottom(), config.floor_line(3));
    }

    #[test]
    fn test_no_patience_decay_while_approaching() {
        let (mut world, mut lift, config, mut rng) = setup();
        let mut departures = Departures::new();
        let user = spawn_at(&mut world, &config, 3, Side::Left, PatienceLevel::Chill);

        // A handful of ticks: still mid-approach, far from the queue.
        run(&mut world, &mut lift, 0, &config, &mut rng, &mut departures, 10);

        assert_eq!(*world.get::<&UserPhase>(user).unwrap(), UserPhase::Approaching);
        let patience = world.get::<&Patience>(user).unwrap();
        assert_eq!(patience.remaining, PatienceLevel::Chill.seconds());
    }

    #[test]
    fn test_queue_packs_fifo_by_arrival() {
        let (mut world, mut lift, config, mut rng) = setup();
        let mut departures = Departures::new();

        let first = spawn_at(&mut world, &config, 3, Side::Left, PatienceLevel::Chill);
        // Let the first user reach the door before the second arrives.
        run(&mut world, &mut lift, 0, &config, &mut rng, &mut departures, 300);
        let second = spawn_at(&mut world, &config, 3, Side::Left, PatienceLevel::Chill);
        run(&mut world, &mut lift, 0, &config, &mut rng, &mut departures, 300);

        let first_rect = *world.get::<&Rect>(first).unwrap();
        let second_rect = *world.get::<&Rect>(second).unwrap();
        // Earlier arrival stands closer to the car; later packs behind.
        assert!(second_rect.right() < first_rect.left());
        assert!((second_rect.right() - (first_rect.left() - config.queue_gap)).abs() < 1.0);
    }

    #[test]
    fn test_boarding_assigns_random_free_slot() {
        let (mut world, mut lift, config, mut rng) = setup();
        let mut departures = Departures::new();
        // Lift already open at the user's floor.
        let user = spawn_at(&mut world, &config, 0, Side::Left, PatienceLevel::Chill);

        run(&mut world, &mut lift, 0, &config, &mut rng, &mut departures, 600);

        let slot = world.get::<&LiftSlot>(user).map(|s| s.0).unwrap();
        assert_eq!(lift.passengers[slot], Some(user));
        assert_eq!(*world.get::<&UserPhase>(user).unwrap(), UserPhase::Riding);
        assert_eq!(lift.occupied_count(), 1);
    }

    #[test]
    fn test_full_lift_blocks_boarding() {
        let (mut world, mut lift, config, mut rng) = setup();
        let mut departures = Departures::new();

        // Fill every slot with placeholder riders.
        for slot in 0..lift.capacity() {
            let rider = world.spawn((User,));
            lift.passengers[slot] = Some(rider);
        }

        let user = spawn_at(&mut world, &config, 0, Side::Left, PatienceLevel::Chill);
        run(&mut world, &mut lift, 0, &config, &mut rng, &mut departures, 600);

        // Held outside the door, still queued, patience draining.
        let rect = *world.get::<&Rect>(user).unwrap();
        assert!(rect.right() <= lift.rect.left() - config.queue_gap + 0.01);
        assert_eq!(*world.get::<&UserPhase>(user).unwrap(), UserPhase::Queued);
        assert!(world.get::<&LiftSlot>(user).is_err());
        assert!(
            world.get::<&Patience>(user).unwrap().remaining < PatienceLevel::Chill.seconds()
        );
    }

    #[test]
    fn test_exhausted_user_abandons_and_complains() {
        let (mut world, mut lift, config, mut rng) = setup();
        let mut departures = Departures::new();
        let user = spawn_at(&mut world, &config, 3, Side::Right, PatienceLevel::Testy);

        // 5 s of patience plus the approach walk: a minute is plenty.
        let mut complained = false;
        for _ in 0..3600 {
            waiting_system(&mut world, &mut lift, 0, &config, DT, &mut rng, &mut departures);
            if !departures.is_empty() {
                complained = true;
                break;
            }
        }
        assert!(complained, "impatient user never left");
        let _ = user;
    }
}
