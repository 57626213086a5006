//! The session engine: the single owner of mutable game state.
//!
//! MUTATION ENTRY POINTS (the only ways state changes):
//!   - tick / run_ticks   live production
//!   - apply_offline      catch-up after load
//!   - buy_unit / buy_upgrade
//!   - prestige / fork
//!   - load_envelope      import or restore
//!
//! RULES:
//!   - Production is always computed from current state, never cached.
//!   - Entropy is re-clamped after every mutation that touches it.
//!   - Every event is also appended to the player-facing log.

use crate::{
    clock::TickClock,
    command::PlayerCommand,
    config::{self, DISTANCE_MILESTONES, ENTROPY_MAX, PROBE_MILESTONES},
    error::{GameError, GameResult},
    event::GameEvent,
    offline::simulate_offline_progress,
    production::{compute_production, ProductionSnapshot},
    save::{build_save, SaveEnvelope},
    state::GameState,
    types::{Seconds, UnitKey, UpgradeKey},
};

pub struct SwarmEngine {
    pub state: GameState,
    pub clock: TickClock,
    app_version: String,
    /// Set by every mutation; cleared by the host once it schedules a save.
    dirty: bool,
}

impl SwarmEngine {
    /// A fresh game from the initial tables.
    pub fn new(app_version: &str) -> Self {
        Self::from_state(GameState::default(), app_version)
    }

    pub fn from_state(mut state: GameState, app_version: &str) -> Self {
        state.resources.clamp_entropy();
        Self {
            state,
            clock: TickClock::new(),
            app_version: app_version.to_string(),
            dirty: false,
        }
    }

    /// Restore from an already-migrated envelope.
    pub fn from_envelope(envelope: SaveEnvelope, app_version: &str) -> Self {
        Self::from_state(envelope.state, app_version)
    }

    /// Production rates for the current state.
    pub fn snapshot(&self) -> ProductionSnapshot {
        let s = &self.state;
        compute_production(&s.resources, &s.units, &s.upgrade_state, &s.prestige)
    }

    pub fn to_envelope(&self) -> SaveEnvelope {
        build_save(&self.state, &self.app_version)
    }

    /// True if state changed since the last `take_dirty`.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    // ── Live simulation ────────────────────────────────────────

    /// Advance one fixed-length tick.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let tick = self.clock.advance();
        self.advance_by(tick, TickClock::tick_seconds())
    }

    /// Run `n` ticks back to back. A paused clock runs none.
    pub fn run_ticks(&mut self, n: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.clock.paused {
            log::debug!("run_ticks({n}) skipped: clock paused");
            return events;
        }
        for _ in 0..n {
            events.extend(self.tick());
        }
        events
    }

    fn advance_by(&mut self, tick: u64, dt: Seconds) -> Vec<GameEvent> {
        let before = self.state.resources;
        let rates = self.snapshot();
        self.state.resources.integrate(&rates, dt);
        let after = self.state.resources;

        let mut events = Vec::new();
        for threshold in DISTANCE_MILESTONES {
            if before.distance < threshold && after.distance >= threshold {
                events.push(GameEvent::DistanceMilestone { tick, threshold });
            }
        }
        for threshold in PROBE_MILESTONES {
            if before.probes < threshold && after.probes >= threshold {
                events.push(GameEvent::ProbeMilestone { tick, threshold });
            }
        }
        if before.entropy < ENTROPY_MAX && after.entropy >= ENTROPY_MAX {
            events.push(GameEvent::EntropyCritical { tick });
        }

        log::debug!(
            "tick={tick} factor={:.3} latency={:.3} entropy={:.3} distance={:.1}",
            rates.production_factor,
            rates.latency_factor,
            after.entropy,
            after.distance
        );

        self.dirty = true;
        self.record(&events);
        events
    }

    /// Fast-forward across `seconds` of wall time spent closed.
    pub fn apply_offline(&mut self, seconds: Seconds) -> GameEvent {
        let s = &self.state;
        let progress = simulate_offline_progress(
            &s.resources,
            &s.units,
            &s.upgrade_state,
            &s.prestige,
            seconds,
            None,
        );
        self.state.resources = progress.resources;
        let event = GameEvent::OfflineProgressApplied {
            seconds: progress.simulated_seconds,
            summary: progress.log,
        };
        if progress.steps > 0 {
            self.dirty = true;
            self.record(std::slice::from_ref(&event));
        }
        event
    }

    // ── Commands ───────────────────────────────────────────────

    pub fn apply_command(&mut self, command: PlayerCommand) -> GameResult<Vec<GameEvent>> {
        let event = match command {
            PlayerCommand::Pause => {
                self.clock.pause();
                return Ok(vec![]);
            }
            PlayerCommand::Resume => {
                self.clock.resume();
                return Ok(vec![]);
            }
            PlayerCommand::BuyUnit { unit } => self.buy_unit(unit)?,
            PlayerCommand::BuyUpgrade { upgrade } => self.buy_upgrade(upgrade)?,
            PlayerCommand::Prestige => self.prestige()?,
            PlayerCommand::Fork => self.fork()?,
        };
        Ok(vec![event])
    }

    pub fn buy_unit(&mut self, unit: UnitKey) -> GameResult<GameEvent> {
        let owned = self.state.units.get(unit);
        let cost = config::unit_cost(unit, owned);
        if !self.state.resources.can_afford(&cost) {
            return Err(GameError::InsufficientResources {
                what: unit.key().to_string(),
            });
        }
        self.state.resources.spend(&cost);
        *self.state.units.get_mut(unit) += 1;

        let event = GameEvent::UnitPurchased { unit, owned: owned + 1 };
        self.dirty = true;
        self.record(std::slice::from_ref(&event));
        Ok(event)
    }

    pub fn buy_upgrade(&mut self, upgrade: UpgradeKey) -> GameResult<GameEvent> {
        if self.state.upgrade_state.has(upgrade) {
            return Err(GameError::AlreadyPurchased { upgrade });
        }
        let cfg = config::upgrade_config(upgrade);
        if let Some(required_cycles) = cfg.requires_cycle {
            if self.state.prestige.cycles < required_cycles {
                return Err(GameError::UpgradeLocked { upgrade, required_cycles });
            }
        }
        if !self.state.resources.can_afford(&cfg.cost) {
            return Err(GameError::InsufficientResources {
                what: upgrade.key().to_string(),
            });
        }
        self.state.resources.spend(&cfg.cost);
        self.state.upgrade_state.set(upgrade, true);

        let event = GameEvent::UpgradePurchased { upgrade };
        self.dirty = true;
        self.record(std::slice::from_ref(&event));
        Ok(event)
    }

    // ── Resets ─────────────────────────────────────────────────

    /// Knowledge a cycle reset would grant right now.
    pub fn pending_knowledge(&self) -> f64 {
        let distance = self.state.resources.distance;
        if distance < config::PRESTIGE_MIN_DISTANCE {
            return 0.0;
        }
        (distance / config::KNOWLEDGE_DISTANCE_DIVISOR).sqrt().floor()
    }

    /// Prime archives a fork would grant right now.
    pub fn pending_prime_archives(&self) -> f64 {
        if self.state.prestige.cycles < config::FORK_MIN_CYCLES {
            return 0.0;
        }
        (self.state.prestige.stored_knowledge / config::FORK_KNOWLEDGE_DIVISOR)
            .floor()
            .max(1.0)
    }

    pub fn prestige(&mut self) -> GameResult<GameEvent> {
        let distance = self.state.resources.distance;
        if distance < config::PRESTIGE_MIN_DISTANCE {
            return Err(GameError::PrestigeUnavailable {
                reason: format!(
                    "distance {distance:.0} below {}",
                    config::PRESTIGE_MIN_DISTANCE
                ),
            });
        }
        let gained = self.pending_knowledge();
        self.reset_progress();
        self.state.prestige.cycles += 1;
        self.state.prestige.stored_knowledge += gained;

        log::info!(
            "cycle reset: cycles={} knowledge={}",
            self.state.prestige.cycles,
            self.state.prestige.stored_knowledge
        );
        let event = GameEvent::CycleCompleted {
            cycles: self.state.prestige.cycles,
            knowledge_gained: gained,
        };
        self.dirty = true;
        self.record(std::slice::from_ref(&event));
        Ok(event)
    }

    pub fn fork(&mut self) -> GameResult<GameEvent> {
        let cycles = self.state.prestige.cycles;
        if cycles < config::FORK_MIN_CYCLES {
            return Err(GameError::PrestigeUnavailable {
                reason: format!("{cycles} cycle(s) completed, fork needs {}", config::FORK_MIN_CYCLES),
            });
        }
        let gained = self.pending_prime_archives();
        self.reset_progress();
        let prestige = &mut self.state.prestige;
        prestige.cycles = 0;
        prestige.stored_knowledge = 0.0;
        prestige.forks += 1;
        prestige.prime_archives += gained;

        log::info!(
            "fork: forks={} prime_archives={}",
            prestige.forks,
            prestige.prime_archives
        );
        let event = GameEvent::ForkCompleted {
            forks: prestige.forks,
            prime_archives_gained: gained,
        };
        self.dirty = true;
        self.record(std::slice::from_ref(&event));
        Ok(event)
    }

    /// Wipe resources, units and non-persistent upgrades.
    fn reset_progress(&mut self) {
        self.state.resources = config::INITIAL_RESOURCES;
        self.state.units = config::INITIAL_UNITS;
        self.state.upgrade_state = self.state.upgrade_state.retain_persistent();
    }

    // ── Persistence ────────────────────────────────────────────

    /// Replace the whole state with an imported (already migrated) save.
    pub fn load_envelope(&mut self, envelope: SaveEnvelope) -> GameEvent {
        let app_version = envelope.meta.app_version.clone();
        self.state = envelope.state;
        self.state.resources.clamp_entropy();
        log::info!("loaded save v{} from build {app_version}", envelope.version);

        let event = GameEvent::SaveImported { app_version };
        self.dirty = true;
        self.record(std::slice::from_ref(&event));
        event
    }

    fn record(&mut self, events: &[GameEvent]) {
        for event in events {
            log::debug!("event {}", event.type_name());
            self.state.push_log(event.describe());
        }
    }
}
