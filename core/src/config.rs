//! Static economy tables: unit and upgrade definitions, production
//! coefficients, and the zero state for a fresh game.
//!
//! The `INITIAL_*` tables double as the per-field defaults the save
//! migrators fall back to when an old save is missing a value.

use crate::{
    state::{PrestigeState, ResourceState, UnitCounts, UpgradeState},
    types::{ResourceKind, Seconds, UnitKey, UpgradeKey},
};
use serde::Serialize;

pub const ENTROPY_MIN: f64 = 0.0;
pub const ENTROPY_MAX: f64 = 0.88;

/// Player-facing log lines kept in state (and in the save envelope).
pub const MAX_LOG_ENTRIES: usize = 40;

// ── Offline catch-up ───────────────────────────────────────────────

pub const OFFLINE_CAP_SECONDS: Seconds = 86_400.0; // 24h
pub const OFFLINE_TARGET_STEPS: f64 = 120.0;
pub const OFFLINE_MIN_STEP: Seconds = 10.0;
pub const OFFLINE_MAX_STEP: Seconds = 60.0;

// ── Prestige / fork ────────────────────────────────────────────────

pub const PRESTIGE_MIN_DISTANCE: f64 = 1_000.0;
pub const KNOWLEDGE_DISTANCE_DIVISOR: f64 = 250.0;
pub const FORK_MIN_CYCLES: u64 = 5;
pub const FORK_KNOWLEDGE_DIVISOR: f64 = 10.0;

// ── Milestones ─────────────────────────────────────────────────────

pub const DISTANCE_MILESTONES: [f64; 5] = [100.0, 1_000.0, 10_000.0, 100_000.0, 1_000_000.0];
pub const PROBE_MILESTONES: [f64; 4] = [10.0, 100.0, 1_000.0, 10_000.0];

/// Production coefficients. Fixed point-in-time constants.
pub mod rates {
    // Resonance (forks) and cycle boost.
    pub const RESONANCE_PER_FORK: f64 = 0.35;
    pub const RESONANCE_PER_PRIME_ARCHIVE: f64 = 0.22;
    pub const CYCLE_BOOST_PER_CYCLE: f64 = 0.55;
    pub const CYCLE_BOOST_PER_KNOWLEDGE: f64 = 0.15;

    // Signal / latency.
    pub const SIGNAL_BONUS_PER_RELAY: f64 = 0.12;
    pub const AUTONOMY_SIGNAL_BONUS: f64 = 0.35;
    pub const LATENCY_BASE_THRESHOLD: f64 = 1_200.0;
    pub const LATENCY_FALLOFF_SCALE: f64 = 4_800.0;
    pub const AUTONOMY_LATENCY_RECOVERY: f64 = 0.25;
    pub const DELAY_COMPENSATION: f64 = 1.2;
    pub const DELAY_COMPENSATION_THRESHOLD: f64 = 0.999;

    // Entropy pressure and mitigation, per second.
    pub const ENTROPY_BASE_PRESSURE: f64 = 0.01;
    pub const ENTROPY_PRESSURE_DIVISOR: f64 = 9_200.0;
    pub const CARTOGRAPHY_PRESSURE_FACTOR: f64 = 0.8;
    pub const PRIME_ARCHIVE_PRESSURE_RELIEF: f64 = 0.04;
    pub const STABILIZER_MITIGATION: f64 = 0.015;
    pub const CARTOGRAPHY_MITIGATION: f64 = 0.005;

    // Entropy throttle on throughput.
    pub const ENTROPY_PENALTY_FLOOR: f64 = 0.28;
    pub const ENTROPY_PENALTY_CAP: f64 = 0.82;
    pub const ENTROPY_PENALTY_SLOPE: f64 = 0.7;
    pub const QUANTUM_MEMORY_PENALTY_SLOPE: f64 = 0.55;

    // Upgrade multipliers.
    pub const DYSON_SHEATH_ENERGY: f64 = 1.35;
    pub const AUTOFORGE_PROBES: f64 = 1.5;
    pub const ARCHIVE_BLOOM_DATA: f64 = 1.4;
    pub const CARTOGRAPHY_EXPLORATION: f64 = 1.3;

    /// Distance per second contributed by each probe in stock.
    pub const PROBE_EXPLORATION_RATE: f64 = 0.02;
}

/// A partial resource→amount mapping. Zero means "not part of the cost".
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCost {
    pub metal:  f64,
    pub energy: f64,
    pub data:   f64,
    pub probes: f64,
}

impl ResourceCost {
    pub const ZERO: ResourceCost = ResourceCost { metal: 0.0, energy: 0.0, data: 0.0, probes: 0.0 };

    pub fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Metal  => self.metal,
            ResourceKind::Energy => self.energy,
            ResourceKind::Data   => self.data,
            ResourceKind::Probes => self.probes,
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            metal:  self.metal * factor,
            energy: self.energy * factor,
            data:   self.data * factor,
            probes: self.probes * factor,
        }
    }
}

/// Per-second output of a single owned unit before any multiplier.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct UnitYield {
    pub metal:    f64,
    pub energy:   f64,
    pub data:     f64,
    pub probes:   f64,
    pub distance: f64,
}

impl UnitYield {
    pub const NONE: UnitYield = UnitYield { metal: 0.0, energy: 0.0, data: 0.0, probes: 0.0, distance: 0.0 };
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitConfig {
    pub key:         UnitKey,
    pub label:       &'static str,
    pub description: &'static str,
    pub base_cost:   ResourceCost,
    /// Multiplicative price growth per owned unit, >= 1.
    pub cost_growth: f64,
    pub yields:      UnitYield,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpgradeConfig {
    pub key:            UpgradeKey,
    pub label:          &'static str,
    pub description:    &'static str,
    pub cost:           ResourceCost,
    /// Purchase is locked until `prestige.cycles` reaches this value.
    pub requires_cycle: Option<u64>,
    /// Survives a cycle reset.
    pub persistent:     bool,
}

static HARVESTERS: UnitConfig = UnitConfig {
    key:         UnitKey::Harvesters,
    label:       "Harvester",
    description: "Strips metal from drifting debris.",
    base_cost:   ResourceCost { metal: 15.0, ..ResourceCost::ZERO },
    cost_growth: 1.15,
    yields:      UnitYield { metal: 1.4, ..UnitYield::NONE },
};

static FOUNDRIES: UnitConfig = UnitConfig {
    key:         UnitKey::Foundries,
    label:       "Foundry",
    description: "Smelts ore and bleeds off surplus heat as energy.",
    base_cost:   ResourceCost { metal: 50.0, ..ResourceCost::ZERO },
    cost_growth: 1.16,
    yields:      UnitYield { metal: 0.3, energy: 1.1, ..UnitYield::NONE },
};

static FABRICATORS: UnitConfig = UnitConfig {
    key:         UnitKey::Fabricators,
    label:       "Fabricator",
    description: "Assembles new probes for the swarm.",
    base_cost:   ResourceCost { metal: 120.0, energy: 40.0, ..ResourceCost::ZERO },
    cost_growth: 1.18,
    yields:      UnitYield { probes: 1.05, ..UnitYield::NONE },
};

static ARCHIVES: UnitConfig = UnitConfig {
    key:         UnitKey::Archives,
    label:       "Archive",
    description: "Indexes sensor sweeps into usable data.",
    base_cost:   ResourceCost { metal: 200.0, energy: 120.0, ..ResourceCost::ZERO },
    cost_growth: 1.2,
    yields:      UnitYield { data: 0.8, ..UnitYield::NONE },
};

static SIGNAL_RELAYS: UnitConfig = UnitConfig {
    key:         UnitKey::SignalRelays,
    label:       "Signal Relay",
    description: "Extends the command horizon and pushes the frontier outward.",
    base_cost:   ResourceCost { metal: 400.0, energy: 250.0, data: 60.0, ..ResourceCost::ZERO },
    cost_growth: 1.22,
    yields:      UnitYield { data: 0.1, distance: 0.6, ..UnitYield::NONE },
};

static STABILIZERS: UnitConfig = UnitConfig {
    key:         UnitKey::Stabilizers,
    label:       "Stabilizer",
    description: "Damps swarm entropy.",
    base_cost:   ResourceCost { metal: 600.0, energy: 400.0, data: 150.0, ..ResourceCost::ZERO },
    cost_growth: 1.25,
    yields:      UnitYield::NONE,
};

pub fn unit_config(key: UnitKey) -> &'static UnitConfig {
    match key {
        UnitKey::Harvesters   => &HARVESTERS,
        UnitKey::Foundries    => &FOUNDRIES,
        UnitKey::Fabricators  => &FABRICATORS,
        UnitKey::Archives     => &ARCHIVES,
        UnitKey::SignalRelays => &SIGNAL_RELAYS,
        UnitKey::Stabilizers  => &STABILIZERS,
    }
}

/// Price of the next unit when `owned` are already built:
/// `baseCost × costGrowth^owned`, per resource component.
pub fn unit_cost(key: UnitKey, owned: u64) -> ResourceCost {
    let cfg = unit_config(key);
    let exponent = i32::try_from(owned).unwrap_or(i32::MAX);
    cfg.base_cost.scaled(cfg.cost_growth.powi(exponent))
}

static DYSON_SHEATH: UpgradeConfig = UpgradeConfig {
    key:            UpgradeKey::DysonSheath,
    label:          "Dyson Sheath",
    description:    "Foundry energy output +35%.",
    cost:           ResourceCost { metal: 300.0, energy: 500.0, ..ResourceCost::ZERO },
    requires_cycle: None,
    persistent:     false,
};

static AUTOFORGE: UpgradeConfig = UpgradeConfig {
    key:            UpgradeKey::Autoforge,
    label:          "Autoforge",
    description:    "Probe fabrication +50%.",
    cost:           ResourceCost { metal: 800.0, energy: 400.0, ..ResourceCost::ZERO },
    requires_cycle: None,
    persistent:     false,
};

static ARCHIVE_BLOOM: UpgradeConfig = UpgradeConfig {
    key:            UpgradeKey::ArchiveBloom,
    label:          "Archive Bloom",
    description:    "Data throughput +40%.",
    cost:           ResourceCost { energy: 600.0, data: 300.0, ..ResourceCost::ZERO },
    requires_cycle: None,
    persistent:     false,
};

static AUTONOMY: UpgradeConfig = UpgradeConfig {
    key:            UpgradeKey::Autonomy,
    label:          "Autonomy",
    description:    "Probes act without waiting on distant commands.",
    cost:           ResourceCost { data: 900.0, probes: 40.0, ..ResourceCost::ZERO },
    requires_cycle: Some(1),
    persistent:     false,
};

static STELLAR_CARTOGRAPHY: UpgradeConfig = UpgradeConfig {
    key:            UpgradeKey::StellarCartography,
    label:          "Stellar Cartography",
    description:    "Charted routes: faster exploration, calmer entropy.",
    cost:           ResourceCost { data: 1_500.0, probes: 80.0, ..ResourceCost::ZERO },
    requires_cycle: Some(1),
    persistent:     false,
};

static QUANTUM_MEMORY: UpgradeConfig = UpgradeConfig {
    key:            UpgradeKey::QuantumMemory,
    label:          "Quantum Memory",
    description:    "Softens the entropy throttle. Survives cycle resets.",
    cost:           ResourceCost { data: 4_000.0, probes: 200.0, ..ResourceCost::ZERO },
    requires_cycle: Some(2),
    persistent:     true,
};

pub fn upgrade_config(key: UpgradeKey) -> &'static UpgradeConfig {
    match key {
        UpgradeKey::DysonSheath        => &DYSON_SHEATH,
        UpgradeKey::Autoforge          => &AUTOFORGE,
        UpgradeKey::ArchiveBloom       => &ARCHIVE_BLOOM,
        UpgradeKey::Autonomy           => &AUTONOMY,
        UpgradeKey::StellarCartography => &STELLAR_CARTOGRAPHY,
        UpgradeKey::QuantumMemory      => &QUANTUM_MEMORY,
    }
}

// ── Initial state ──────────────────────────────────────────────────

pub const INITIAL_RESOURCES: ResourceState = ResourceState {
    metal:    20.0,
    energy:   10.0,
    data:     0.0,
    probes:   0.0,
    entropy:  0.0,
    distance: 0.0,
};

pub const INITIAL_UNITS: UnitCounts = UnitCounts {
    harvesters:    1,
    foundries:     0,
    fabricators:   0,
    archives:      0,
    signal_relays: 0,
    stabilizers:   0,
};

pub const INITIAL_PRESTIGE: PrestigeState = PrestigeState {
    cycles:           0,
    stored_knowledge: 0.0,
    forks:            0,
    prime_archives:   0.0,
};

pub const INITIAL_UPGRADES: UpgradeState = UpgradeState {
    dyson_sheath:        false,
    autoforge:           false,
    archive_bloom:       false,
    autonomy:            false,
    stellar_cartography: false,
    quantum_memory:      false,
};
