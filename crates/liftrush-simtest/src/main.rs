//! Lift Rush Headless Simulation Harness
//!
//! Validates the simulation core without rendering, audio, or input
//! devices. Runs entirely in-process with seeded rngs.
//!
//! Usage:
//!   cargo run -p liftrush-simtest
//!   cargo run -p liftrush-simtest -- --verbose

use liftrush_core::components::{PatienceLevel, Side, UserPhase};
use liftrush_core::config::SimConfig;
use liftrush_core::engine::{InputAction, Simulation};
use liftrush_core::generation::{SpawnDescriptor, UserStream};

use rand::rngs::StdRng;
use rand::SeedableRng;

const DT: f32 = 1.0 / 60.0;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: String) -> Self {
        Self {
            name: name.into(),
            passed,
            detail,
        }
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Lift Rush Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Configuration validation
    results.extend(validate_config(verbose));

    // 2. Lift physics sweep
    results.extend(validate_physics(verbose));

    // 3. Boarding and capacity
    results.extend(validate_boarding(verbose));

    // 4. Full-round scoring and determinism
    results.extend(validate_round(verbose));

    // 5. Arrival stream
    results.extend(validate_stream(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn scripted_sim(seed: u64) -> Simulation {
    Simulation::new(SimConfig {
        mean_spawn_interval: 1.0e6,
        spawn_interval_stddev: 0.0,
        seed: Some(seed),
        ..Default::default()
    })
    .expect("default-derived config must validate")
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn validate_config(_verbose: bool) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let mut results = Vec::new();

    results.push(TestResult::new(
        "default_config_valid",
        SimConfig::default().validate().is_ok(),
        "default constants accepted".into(),
    ));

    let bad_capacity = SimConfig {
        capacity: 0,
        ..Default::default()
    };
    results.push(TestResult::new(
        "zero_capacity_rejected",
        Simulation::new(bad_capacity).is_err(),
        "capacity 0 fails fast".into(),
    ));

    let bad_floors = SimConfig {
        floors: 1,
        ..Default::default()
    };
    results.push(TestResult::new(
        "single_floor_rejected",
        bad_floors.validate().is_err(),
        "one-floor building fails fast".into(),
    ));

    results
}

// ── 2. Physics ──────────────────────────────────────────────────────────

fn validate_physics(verbose: bool) -> Vec<TestResult> {
    println!("--- Lift Physics ---");
    let mut results = Vec::new();

    let mut sim = scripted_sim(10);
    let config = sim.config().clone();
    let top = config.ground - config.building_height();

    let mut max_speed_seen: f32 = 0.0;
    let mut in_bounds = true;

    // A full minute of aggressive flying: hold up, flick down, repeat.
    for tick in 0..3600u32 {
        let actions: &[InputAction] = match tick % 180 {
            0 => &[InputAction::LiftUpPressed],
            100 => &[InputAction::LiftDownPressed],
            160 => &[InputAction::LiftDownReleased],
            _ => &[],
        };
        let result = sim.advance(actions, DT);
        max_speed_seen = max_speed_seen.max(result.lift.velocity.abs());
        if result.lift.rect.bottom() > config.ground || result.lift.rect.bottom() < top {
            in_bounds = false;
        }
    }

    results.push(TestResult::new(
        "lift_in_bounds",
        in_bounds,
        "car stayed inside the shaft for 60 s".into(),
    ));
    results.push(TestResult::new(
        "speed_clamped",
        max_speed_seen <= config.max_speed,
        format!("peak speed {:.1} <= {:.1}", max_speed_seen, config.max_speed),
    ));

    // Release the controls and let damping settle the car. At rest it
    // must sit on a floor line, or inside the no-snap band around the
    // midpoint between two lines.
    for _ in 0..1200 {
        sim.advance(&[InputAction::LiftUpReleased], DT);
    }
    let result = sim.advance(&[], DT);
    let offset = (config.ground - result.lift.rect.bottom()).rem_euclid(config.floor_height);
    let on_line = offset == 0.0;
    let in_dead_band = (config.floor_height / 2.0 - offset).abs() <= config.snap_threshold;
    let settled = result.lift.velocity == 0.0 && (on_line || in_dead_band);
    results.push(TestResult::new(
        "settles_on_floor_line",
        settled,
        format!(
            "rest at bottom {:.1} (offset {:.2})",
            result.lift.rect.bottom(),
            offset
        ),
    ));

    if verbose {
        println!(
            "    rest floor {}, peak speed {:.1}",
            result.lift.floor, max_speed_seen
        );
    }

    results
}

// ── 3. Boarding ─────────────────────────────────────────────────────────

fn validate_boarding(_verbose: bool) -> Vec<TestResult> {
    println!("--- Boarding & Capacity ---");
    let mut results = Vec::new();

    let mut sim = scripted_sim(20);
    let capacity = sim.config().capacity;

    // Six callers on the ground floor against four slots.
    for _ in 0..6 {
        sim.spawn_user_now(&SpawnDescriptor {
            floor: 0,
            destination: 5,
            patience: PatienceLevel::Chill,
            side: Side::Left,
        });
        for _ in 0..30 {
            sim.advance(&[], DT);
        }
    }

    let mut over_capacity = false;
    let mut result = sim.advance(&[], DT);
    for _ in 0..900 {
        result = sim.advance(&[], DT);
        if sim.rider_count() > capacity {
            over_capacity = true;
        }
    }

    results.push(TestResult::new(
        "capacity_respected",
        !over_capacity,
        format!("never more than {} riders", capacity),
    ));
    results.push(TestResult::new(
        "all_slots_filled",
        sim.rider_count() == capacity,
        format!("{}/{} slots taken", sim.rider_count(), capacity),
    ));

    let queued = result
        .users
        .iter()
        .filter(|u| u.phase == UserPhase::Queued)
        .count();
    results.push(TestResult::new(
        "overflow_stays_queued",
        queued == 2,
        format!("{} callers left at the door", queued),
    ));

    results
}

// ── 4. Full round ───────────────────────────────────────────────────────

fn run_round(seed: u64) -> (u32, u32, usize) {
    let mut sim = Simulation::new(SimConfig {
        seed: Some(seed),
        ..Default::default()
    })
    .expect("default config must validate");

    // Five minutes of a simple shuttle pattern.
    for tick in 0..18_000u32 {
        let actions: &[InputAction] = match tick % 360 {
            0 => &[InputAction::LiftUpPressed],
            120 => &[InputAction::LiftUpReleased],
            180 => &[InputAction::LiftDownPressed],
            300 => &[InputAction::LiftDownReleased],
            _ => &[],
        };
        sim.advance(actions, DT);
    }

    (sim.served_users(), sim.complaints(), sim.user_count())
}

fn validate_round(verbose: bool) -> Vec<TestResult> {
    println!("--- Full Round ---");
    let mut results = Vec::new();

    let (served, complaints, active) = run_round(30);
    let total = served + complaints + active as u32;

    results.push(TestResult::new(
        "round_produces_traffic",
        total > 50,
        format!(
            "{} arrivals ({} served, {} complaints, {} active)",
            total, served, complaints, active
        ),
    ));
    results.push(TestResult::new(
        "round_resolves_users",
        served + complaints > 0,
        format!("{} users resolved", served + complaints),
    ));

    let repeat = run_round(30);
    results.push(TestResult::new(
        "round_deterministic",
        repeat == (served, complaints, active),
        "same seed, same score".into(),
    ));

    if verbose {
        println!("    served {} / complaints {}", served, complaints);
    }

    results
}

// ── 5. Arrival stream ───────────────────────────────────────────────────

fn validate_stream(_verbose: bool) -> Vec<TestResult> {
    println!("--- Arrival Stream ---");
    let mut results = Vec::new();

    let stream = UserStream::new(10);
    let mut rng = StdRng::seed_from_u64(40);

    let mut ok = true;
    let mut sides = [0u32; 2];
    for _ in 0..10_000 {
        let d = stream.next_arrival(&mut rng);
        if d.floor == d.destination || !(0..10).contains(&d.floor) || !(0..10).contains(&d.destination)
        {
            ok = false;
        }
        match d.side {
            Side::Left => sides[0] += 1,
            Side::Right => sides[1] += 1,
        }
    }

    results.push(TestResult::new(
        "stream_never_exhausts",
        ok,
        "10000 pulls, all descriptors well-formed".into(),
    ));
    results.push(TestResult::new(
        "stream_balanced_sides",
        sides[0] > 4000 && sides[1] > 4000,
        format!("left {} / right {}", sides[0], sides[1]),
    ));

    results
}
