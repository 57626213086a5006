//! Session engine tests.
//!
//! Tests cover: live ticks, purchases, upgrade gating, cycle and fork
//! resets, milestone events, offline catch-up, the player log cap, and
//! the entropy clamp across random play.

use probeswarm_core::{
    command::PlayerCommand,
    config::{self, INITIAL_RESOURCES, INITIAL_UNITS},
    engine::SwarmEngine,
    error::GameError,
    event::GameEvent,
    save::CURRENT_VERSION,
    types::{UnitKey, UpgradeKey},
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

fn build() -> SwarmEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    SwarmEngine::new("0.9.0-test")
}

fn rich() -> SwarmEngine {
    let mut engine = build();
    let r = &mut engine.state.resources;
    r.metal = 1e9;
    r.energy = 1e9;
    r.data = 1e9;
    r.probes = 1e9;
    engine
}

#[test]
fn fresh_engine_matches_initial_tables() {
    let engine = build();
    assert_eq!(engine.state.resources, INITIAL_RESOURCES);
    assert_eq!(engine.state.units, INITIAL_UNITS);
    assert_eq!(
        engine.snapshot(),
        probeswarm_core::compute_production(
            &INITIAL_RESOURCES,
            &INITIAL_UNITS,
            &config::INITIAL_UPGRADES,
            &config::INITIAL_PRESTIGE
        )
    );
}

/// Four 250 ms ticks are one second of production.
#[test]
fn ticks_integrate_production() {
    let mut engine = build();
    engine.run_ticks(4);

    assert_eq!(engine.clock.current_tick, 4);
    let metal = engine.state.resources.metal;
    assert!(metal > 20.0 && metal <= 21.4 + 1e-9, "metal after 1s: {metal}");
    assert!(engine.state.resources.entropy > 0.0, "entropy should drift up");
}

#[test]
fn buying_a_unit_spends_and_counts() {
    let mut engine = build();

    let event = engine.buy_unit(UnitKey::Harvesters).unwrap();
    assert_eq!(event, GameEvent::UnitPurchased { unit: UnitKey::Harvesters, owned: 2 });
    assert_eq!(engine.state.units.harvesters, 2);
    assert!((engine.state.resources.metal - 2.75).abs() < 1e-9, "first extra harvester costs 15 x 1.15");

    // Next one costs 19.84; only 2.75 metal left.
    let err = engine.buy_unit(UnitKey::Harvesters).unwrap_err();
    assert!(matches!(err, GameError::InsufficientResources { .. }));
    assert_eq!(engine.state.units.harvesters, 2, "failed purchase must not mutate");
    assert!((engine.state.resources.metal - 2.75).abs() < 1e-9);
}

#[test]
fn upgrades_are_gated_and_monotonic() {
    let mut engine = rich();

    let err = engine.buy_upgrade(UpgradeKey::Autonomy).unwrap_err();
    assert!(
        matches!(err, GameError::UpgradeLocked { required_cycles: 1, .. }),
        "got {err:?}"
    );

    engine.buy_upgrade(UpgradeKey::Autoforge).unwrap();
    assert!(engine.state.upgrade_state.autoforge);
    let err = engine.buy_upgrade(UpgradeKey::Autoforge).unwrap_err();
    assert!(matches!(err, GameError::AlreadyPurchased { .. }));
    assert!(engine.state.upgrade_state.autoforge);

    engine.state.prestige.cycles = 1;
    engine.buy_upgrade(UpgradeKey::Autonomy).unwrap();
    assert!(engine.state.upgrade_state.autonomy);
}

#[test]
fn unaffordable_upgrade_is_rejected() {
    let mut engine = build();
    let err = engine.buy_upgrade(UpgradeKey::DysonSheath).unwrap_err();
    assert!(matches!(err, GameError::InsufficientResources { .. }));
    assert!(!engine.state.upgrade_state.dyson_sheath);
}

#[test]
fn cycle_reset_grants_knowledge_and_keeps_persistent_upgrades() {
    let mut engine = build();
    assert!(matches!(engine.prestige(), Err(GameError::PrestigeUnavailable { .. })));

    engine.state.resources.distance = 4_000.0;
    engine.state.units.fabricators = 7;
    engine.state.upgrade_state.autoforge = true;
    engine.state.upgrade_state.quantum_memory = true;
    assert_eq!(engine.pending_knowledge(), 4.0);

    let event = engine.prestige().unwrap();
    assert_eq!(event, GameEvent::CycleCompleted { cycles: 1, knowledge_gained: 4.0 });

    let s = &engine.state;
    assert_eq!(s.prestige.cycles, 1);
    assert_eq!(s.prestige.stored_knowledge, 4.0);
    assert_eq!(s.resources, INITIAL_RESOURCES);
    assert_eq!(s.units, INITIAL_UNITS);
    assert!(!s.upgrade_state.autoforge, "non-persistent upgrade wiped");
    assert!(s.upgrade_state.quantum_memory, "persistent upgrade kept");
    assert!(s.logs.last().unwrap().contains("Cycle 1"));
}

#[test]
fn fork_resets_cycles_into_prime_archives() {
    let mut engine = build();
    engine.state.prestige.cycles = 4;
    assert!(matches!(engine.fork(), Err(GameError::PrestigeUnavailable { .. })));

    engine.state.prestige.cycles = 5;
    engine.state.prestige.stored_knowledge = 37.0;
    let event = engine.fork().unwrap();
    assert_eq!(event, GameEvent::ForkCompleted { forks: 1, prime_archives_gained: 3.0 });

    let p = engine.state.prestige;
    assert_eq!(p.cycles, 0);
    assert_eq!(p.stored_knowledge, 0.0);
    assert_eq!(p.forks, 1);
    assert_eq!(p.prime_archives, 3.0);
}

#[test]
fn crossing_thresholds_emits_milestones() {
    let mut engine = build();
    engine.state.resources.probes = 9.99;
    engine.state.resources.distance = 99.99;
    engine.state.units.fabricators = 1;

    let events = engine.run_ticks(1);

    assert!(events.contains(&GameEvent::DistanceMilestone { tick: 1, threshold: 100.0 }), "{events:?}");
    assert!(events.contains(&GameEvent::ProbeMilestone { tick: 1, threshold: 10.0 }), "{events:?}");

    let again = engine.run_ticks(1);
    assert!(again.is_empty(), "milestones fire once: {again:?}");
}

#[test]
fn entropy_reaching_cap_is_reported_once() {
    let mut engine = build();
    engine.state.resources.entropy = 0.879;

    let first = engine.run_ticks(1);
    assert!(first.contains(&GameEvent::EntropyCritical { tick: 1 }));
    assert_eq!(engine.state.resources.entropy, 0.88);

    let second = engine.run_ticks(1);
    assert!(second.is_empty());
    assert_eq!(engine.state.resources.entropy, 0.88);
}

#[test]
fn player_log_is_capped() {
    let mut engine = rich();
    for _ in 0..50 {
        engine.buy_unit(UnitKey::Harvesters).unwrap();
    }
    assert_eq!(engine.state.logs.len(), config::MAX_LOG_ENTRIES);
    assert_eq!(engine.state.logs.last().unwrap(), "Built Harvester #51.");
}

#[test]
fn offline_catch_up_is_applied_and_logged() {
    let mut engine = build();

    let idle = engine.apply_offline(0.0);
    assert!(matches!(idle, GameEvent::OfflineProgressApplied { seconds, .. } if seconds == 0.0));
    assert!(engine.state.logs.is_empty(), "no-op catch-up is not logged");

    engine.apply_offline(3_600.0);
    assert!(engine.state.resources.metal > 20.0);
    assert!(engine.state.logs.last().unwrap().contains("1h00m00s"), "{:?}", engine.state.logs);
}

#[test]
fn commands_route_to_engine_operations() {
    let mut engine = build();

    engine.apply_command(PlayerCommand::Pause).unwrap();
    assert!(engine.clock.paused);
    engine.apply_command(PlayerCommand::Resume).unwrap();
    assert!(!engine.clock.paused);
    engine.run_ticks(2);

    let events = engine
        .apply_command(PlayerCommand::BuyUnit { unit: UnitKey::Harvesters })
        .unwrap();
    assert_eq!(events.len(), 1);

    let err = engine.apply_command(PlayerCommand::Fork).unwrap_err();
    assert!(matches!(err, GameError::PrestigeUnavailable { .. }));
}

#[test]
fn paused_engine_does_not_advance() {
    let mut engine = build();
    engine.apply_command(PlayerCommand::Pause).unwrap();
    let before = engine.state.clone();

    let events = engine.run_ticks(40);

    assert!(events.is_empty());
    assert!(engine.clock.paused);
    assert_eq!(engine.clock.current_tick, 0);
    assert_eq!(engine.state, before, "paused ticks must not touch state");
    assert!(!engine.take_dirty());

    engine.apply_command(PlayerCommand::Resume).unwrap();
    engine.run_ticks(4);
    assert_eq!(engine.clock.current_tick, 4);
    assert!(engine.state.resources.metal > before.resources.metal);
}

#[test]
fn envelope_and_reload() {
    let mut engine = rich();
    engine.buy_unit(UnitKey::Stabilizers).unwrap();
    engine.state.resources.entropy = 0.5;

    let env = engine.to_envelope();
    assert_eq!(env.version, CURRENT_VERSION);
    assert_eq!(env.meta.app_version, "0.9.0-test");

    let mut other = build();
    let event = other.load_envelope(env.clone());
    assert_eq!(event, GameEvent::SaveImported { app_version: "0.9.0-test".into() });
    assert_eq!(other.state.units, engine.state.units);
    assert_eq!(other.state.resources, engine.state.resources);

    let restored = SwarmEngine::from_envelope(env, "1.0.0");
    assert_eq!(restored.state.units.stabilizers, 1);
}

#[test]
fn mutations_mark_state_dirty() {
    let mut engine = build();
    assert!(!engine.take_dirty());
    engine.run_ticks(1);
    assert!(engine.take_dirty());
    assert!(!engine.take_dirty());
}

#[test]
fn entropy_stays_clamped_through_random_play() {
    let mut rng = Pcg64Mcg::seed_from_u64(42);
    let mut engine = rich();

    for _ in 0..2_000 {
        match rng.gen_range(0..10) {
            0 => {
                let unit = UnitKey::ALL[rng.gen_range(0..UnitKey::ALL.len())];
                let _ = engine.buy_unit(unit);
            }
            1 => {
                let upgrade = UpgradeKey::ALL[rng.gen_range(0..UpgradeKey::ALL.len())];
                let _ = engine.buy_upgrade(upgrade);
            }
            2 => {
                engine.apply_offline(rng.gen_range(-100.0..5_000.0));
            }
            3 => {
                engine.state.resources.distance += rng.gen_range(0.0..50_000.0);
            }
            _ => {
                engine.run_ticks(rng.gen_range(1..20));
            }
        }
        let e = engine.state.resources.entropy;
        assert!((0.0..=0.88).contains(&e), "entropy escaped clamp: {e}");
    }
}
