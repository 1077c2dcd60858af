//! Integration tests for full rounds: boarding, delivery, abandonment,
//! scoring, and the invariants that must hold on every tick.
//!
//! All tests are pure logic — no rendering, no audio, no input devices.

use std::collections::HashMap;

use liftrush_core::components::{floor_at, PatienceLevel, Side, UserPhase};
use liftrush_core::config::SimConfig;
use liftrush_core::engine::{InputAction, Simulation};
use liftrush_core::generation::SpawnDescriptor;

const DT: f32 = 1.0 / 60.0;

/// A round whose random arrivals are effectively disabled, so scenarios
/// control the cast explicitly.
fn scripted_sim(seed: u64) -> Simulation {
    Simulation::new(SimConfig {
        mean_spawn_interval: 1.0e6,
        spawn_interval_stddev: 0.0,
        seed: Some(seed),
        ..Default::default()
    })
    .unwrap()
}

fn park_lift_at(sim: &mut Simulation, floor: i32) {
    let line = sim.config().floor_line(floor);
    sim.lift.rect.set_bottom(line);
    sim.lift.velocity = 0.0;
    sim.lift.acceleration = 0.0;
}

fn descriptor(floor: i32, destination: i32, patience: PatienceLevel) -> SpawnDescriptor {
    SpawnDescriptor {
        floor,
        destination,
        patience,
        side: Side::Left,
    }
}

fn phase_of(result: &liftrush_core::engine::TickResult, id: u64) -> Option<UserPhase> {
    result.users.iter().find(|u| u.id == id).map(|u| u.phase)
}

// ── Scenario: blocked user runs out of patience ────────────────────────

#[test]
fn blocked_user_abandons_after_patience_window() {
    let mut sim = scripted_sim(1);
    // The lift idles far away from the user's floor for the whole round.
    park_lift_at(&mut sim, 7);

    let user = sim.spawn_user_now(&descriptor(0, 3, PatienceLevel::Chill));
    let id = user.to_bits().get();

    // Walk in until queued at the door.
    let mut queued_at = None;
    for tick in 0..600 {
        let result = sim.advance(&[], DT);
        if phase_of(&result, id) == Some(UserPhase::Queued) {
            queued_at = Some(tick);
            break;
        }
    }
    let queued_at = queued_at.expect("user never queued");
    assert!(queued_at < 600);

    // Patience decays monotonically through the 30 s window.
    let mut last_patience = PatienceLevel::Chill.seconds();
    for _ in 0..1790 {
        let result = sim.advance(&[], DT);
        let user = result.users.iter().find(|u| u.id == id).unwrap();
        assert!(user.patience <= last_patience);
        last_patience = user.patience;
        assert_eq!(user.phase, UserPhase::Queued);
    }

    // The final ticks exhaust it; the user hits exactly zero and storms off.
    let mut abandoned = false;
    for _ in 0..30 {
        let result = sim.advance(&[], DT);
        if let Some(user) = result.users.iter().find(|u| u.id == id) {
            if user.phase == UserPhase::Abandoning {
                assert_eq!(user.patience, 0.0);
                abandoned = true;
                break;
            }
        }
    }
    assert!(abandoned, "patience never ran out");

    // Off-screen exit counts as exactly one complaint, no serves.
    for _ in 0..600 {
        sim.advance(&[], DT);
        if sim.user_count() == 0 {
            break;
        }
    }
    assert_eq!(sim.user_count(), 0);
    assert_eq!(sim.complaints(), 1);
    assert_eq!(sim.served_users(), 0);
}

// ── Scenario: five callers, four slots ─────────────────────────────────

#[test]
fn capacity_bounds_boarding() {
    let mut sim = scripted_sim(2);
    // Lift parked open at floor 0, where everyone arrives.
    park_lift_at(&mut sim, 0);

    // Staggered arrivals so the queue forms in order.
    for _ in 0..5 {
        sim.spawn_user_now(&descriptor(0, 4, PatienceLevel::Chill));
        for _ in 0..30 {
            sim.advance(&[], DT);
            assert!(sim.rider_count() <= sim.config().capacity);
        }
    }

    // Give everyone time to walk in and board.
    let mut result = sim.advance(&[], DT);
    for _ in 0..900 {
        result = sim.advance(&[], DT);
        assert!(sim.rider_count() <= sim.config().capacity);
    }

    // Exactly four aboard, one left queued with patience still draining.
    assert_eq!(sim.rider_count(), 4);
    let queued: Vec<_> = result
        .users
        .iter()
        .filter(|u| u.phase == UserPhase::Queued)
        .collect();
    assert_eq!(queued.len(), 1);
    assert!(queued[0].patience < PatienceLevel::Chill.seconds());
    assert!(queued[0].patience > 0.0);

    // No user holds more than one slot.
    let mut seen = Vec::new();
    for slot in sim.lift.passengers.iter().flatten() {
        assert!(!seen.contains(slot));
        seen.push(*slot);
    }
}

// ── Scenario: ride to destination, slot freed on arrival ───────────────

#[test]
fn rider_disembarks_when_stopped_at_destination() {
    let mut sim = scripted_sim(3);
    park_lift_at(&mut sim, 2);

    let user = sim.spawn_user_now(&descriptor(2, 5, PatienceLevel::Chill));
    let id = user.to_bits().get();

    for _ in 0..900 {
        sim.advance(&[], DT);
        if sim.rider_count() == 1 {
            break;
        }
    }
    assert_eq!(sim.rider_count(), 1, "user never boarded");

    // Car arrives at the destination line and comes to rest; the rider
    // steps off and the slot frees on the same tick.
    park_lift_at(&mut sim, 5);
    let result = sim.advance(&[], DT);
    assert_eq!(phase_of(&result, id), Some(UserPhase::Disembarking));
    assert_eq!(sim.rider_count(), 0);

    // Walking out scores one served user.
    for _ in 0..900 {
        sim.advance(&[], DT);
        if sim.user_count() == 0 {
            break;
        }
    }
    assert_eq!(sim.served_users(), 1);
    assert_eq!(sim.complaints(), 0);
}

#[test]
fn rider_stays_aboard_while_car_is_moving_past_destination() {
    let mut sim = scripted_sim(4);
    park_lift_at(&mut sim, 2);

    sim.spawn_user_now(&descriptor(2, 5, PatienceLevel::Chill));
    for _ in 0..900 {
        sim.advance(&[], DT);
        if sim.rider_count() == 1 {
            break;
        }
    }
    assert_eq!(sim.rider_count(), 1);

    // At the destination but still moving: the doors stay shut.
    let line = sim.config().floor_line(5);
    sim.lift.rect.set_bottom(line);
    sim.lift.velocity = sim.config().stop_epsilon + 50.0;
    sim.advance(&[], 0.0);
    assert_eq!(sim.rider_count(), 1);
}

// ── Scenario: floor encodings agree ────────────────────────────────────

#[test]
fn lift_and_user_floor_resolution_match() {
    let mut sim = scripted_sim(5);
    let config = sim.config().clone();

    for floor in 0..config.floors as i32 {
        let line = config.floor_line(floor);
        park_lift_at(&mut sim, floor);
        let result = sim.advance(&[], 0.0);

        assert_eq!(result.lift.floor, floor);
        // A user standing with its rect bottom on the same line resolves
        // to the same floor index used at spawn time.
        assert_eq!(floor_at(line, config.ground, config.floor_height), floor);
    }
}

// ── Scenario: arrivals never starve ────────────────────────────────────

#[test]
fn arrival_stream_keeps_producing() {
    let mut sim = Simulation::new(SimConfig {
        seed: Some(6),
        ..Default::default()
    })
    .unwrap();

    // Ten busy minutes with a bouncing lift.
    for tick in 0..36_000 {
        let actions = match tick % 600 {
            0 => vec![InputAction::LiftUpPressed],
            180 => vec![InputAction::LiftUpReleased],
            300 => vec![InputAction::LiftDownPressed],
            480 => vec![InputAction::LiftDownReleased],
            _ => vec![],
        };
        sim.advance(&actions, DT);
    }

    let total_spawned = sim.user_count() as u32 + sim.served_users() + sim.complaints();
    // Mean interval 3 s over 600 s: expect roughly 200 arrivals.
    assert!(
        total_spawned > 100,
        "only {} users spawned in ten minutes",
        total_spawned
    );
}

// ── Properties: per-tick invariants over a long random round ───────────

#[test]
fn invariants_hold_over_long_round() {
    let config = SimConfig {
        seed: Some(7),
        ..Default::default()
    };
    let mut sim = Simulation::new(config.clone()).unwrap();

    let top = config.ground - config.building_height();
    let mut last_patience: HashMap<u64, f32> = HashMap::new();

    for tick in 0..18_000 {
        // A rough player: hold up, coast, hold down, coast.
        let actions = match tick % 240 {
            0 => vec![InputAction::LiftDownPressed],
            90 => vec![InputAction::LiftDownReleased],
            120 => vec![InputAction::LiftUpPressed],
            210 => vec![InputAction::LiftUpReleased],
            _ => vec![],
        };
        let result = sim.advance(&actions, DT);

        // Lift stays inside the building at legal speeds.
        assert!(result.lift.rect.bottom() <= config.ground);
        assert!(result.lift.rect.bottom() >= top);
        assert!(result.lift.velocity.abs() <= config.max_speed);

        // Slots never exceed capacity and never share a rider.
        assert!(sim.rider_count() <= config.capacity);
        let mut aboard = Vec::new();
        for rider in sim.lift.passengers.iter().flatten() {
            assert!(!aboard.contains(rider), "rider in two slots");
            aboard.push(*rider);
        }

        // Patience never increases, and nobody rides with zero patience
        // acquired after exhaustion.
        for user in &result.users {
            if let Some(prev) = last_patience.get(&user.id) {
                assert!(user.patience <= *prev + 1.0e-4);
            }
            last_patience.insert(user.id, user.patience);
            if user.phase == UserPhase::Abandoning {
                assert_eq!(user.patience, 0.0);
            }
        }
    }

    // The round did something measurable.
    assert!(sim.served_users() + sim.complaints() + sim.user_count() as u32 > 0);
}
