//! Production engine: current state in, per-second flow out.
//!
//! RULE: compute_production is pure. It reads state, never writes it,
//! and may be called at any rate (live ticks, offline steps, UI previews).
//!
//! EVALUATION ORDER:
//!   1. Resonance and cycle boost from prestige counters
//!   2. Signal bonus and latency falloff from distance
//!   3. Entropy pressure vs. mitigation (drift)
//!   4. Entropy throttle on throughput
//!   5. Aggregate production factor
//!   6. Per-resource outputs, distance scaled by latency only

use crate::{
    config::{rates, unit_config},
    state::{PrestigeState, ResourceState, UnitCounts, UpgradeState},
    types::UnitKey,
};
use serde::{Deserialize, Serialize};

/// Per-second rates plus display-only multiplier diagnostics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductionSnapshot {
    pub metal:             f64,
    pub energy:            f64,
    pub data:              f64,
    pub probes:            f64,
    pub distance:          f64,
    /// Signed drift; negative means entropy is healing.
    pub entropy_change:    f64,
    pub latency_factor:    f64,
    pub production_factor: f64,
}

/// Latency outcome of the signal model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalModel {
    pub latency_factor:     f64,
    pub delay_compensation: f64,
}

pub fn resonance(prestige: &PrestigeState) -> f64 {
    1.0 + prestige.forks as f64 * rates::RESONANCE_PER_FORK
        + prestige.prime_archives * rates::RESONANCE_PER_PRIME_ARCHIVE
}

pub fn cycle_boost(prestige: &PrestigeState) -> f64 {
    let base = 1.0
        + prestige.cycles as f64 * rates::CYCLE_BOOST_PER_CYCLE
        + prestige.stored_knowledge * rates::CYCLE_BOOST_PER_KNOWLEDGE;
    base * resonance(prestige)
}

pub fn signal_model(distance: f64, units: &UnitCounts, upgrades: &UpgradeState) -> SignalModel {
    let autonomy = upgrades.autonomy;
    let signal_bonus = 1.0
        + units.signal_relays as f64 * rates::SIGNAL_BONUS_PER_RELAY
        + if autonomy { rates::AUTONOMY_SIGNAL_BONUS } else { 0.0 };

    let threshold = rates::LATENCY_BASE_THRESHOLD * signal_bonus;
    let excess = (distance - threshold).max(0.0);
    let raw = 1.0 / (1.0 + excess / (rates::LATENCY_FALLOFF_SCALE * signal_bonus));

    let latency_factor = if autonomy {
        raw + (1.0 - raw) * rates::AUTONOMY_LATENCY_RECOVERY
    } else {
        raw
    };
    let delay_compensation = if autonomy && latency_factor < rates::DELAY_COMPENSATION_THRESHOLD {
        rates::DELAY_COMPENSATION
    } else {
        1.0
    };

    SignalModel { latency_factor, delay_compensation }
}

/// Per-second entropy drift: pressure minus mitigation.
pub fn entropy_drift(
    distance: f64,
    units: &UnitCounts,
    upgrades: &UpgradeState,
    prestige: &PrestigeState,
) -> f64 {
    let mut pressure = rates::ENTROPY_BASE_PRESSURE + distance / rates::ENTROPY_PRESSURE_DIVISOR;
    if upgrades.stellar_cartography {
        pressure *= rates::CARTOGRAPHY_PRESSURE_FACTOR;
    }
    if prestige.prime_archives > 0.0 {
        pressure /= 1.0 + prestige.prime_archives * rates::PRIME_ARCHIVE_PRESSURE_RELIEF;
    }

    let mitigation = units.stabilizers as f64 * rates::STABILIZER_MITIGATION
        + if upgrades.stellar_cartography { rates::CARTOGRAPHY_MITIGATION } else { 0.0 };

    pressure - mitigation
}

/// Throughput multiplier from the current entropy level, floored at 0.28.
pub fn entropy_penalty(entropy: f64, upgrades: &UpgradeState) -> f64 {
    let slope = if upgrades.quantum_memory {
        rates::QUANTUM_MEMORY_PENALTY_SLOPE
    } else {
        rates::ENTROPY_PENALTY_SLOPE
    };
    let throttle = 1.0 - entropy.min(rates::ENTROPY_PENALTY_CAP) * slope;
    throttle.max(rates::ENTROPY_PENALTY_FLOOR)
}

pub fn compute_production(
    resources: &ResourceState,
    units: &UnitCounts,
    upgrades: &UpgradeState,
    prestige: &PrestigeState,
) -> ProductionSnapshot {
    let boost = cycle_boost(prestige);
    let signal = signal_model(resources.distance, units, upgrades);
    let entropy_change = entropy_drift(resources.distance, units, upgrades, prestige);
    let penalty = entropy_penalty(resources.entropy, upgrades);

    let production_factor = boost * signal.latency_factor * penalty * signal.delay_compensation;

    let mut metal = 0.0;
    let mut energy = 0.0;
    let mut data = 0.0;
    let mut probes = 0.0;
    let mut distance = resources.probes * rates::PROBE_EXPLORATION_RATE;
    for key in UnitKey::ALL {
        let owned = units.get(key) as f64;
        if owned == 0.0 {
            continue;
        }
        let y = unit_config(key).yields;
        metal    += owned * y.metal;
        energy   += owned * y.energy;
        data     += owned * y.data;
        probes   += owned * y.probes;
        distance += owned * y.distance;
    }

    if upgrades.dyson_sheath {
        energy *= rates::DYSON_SHEATH_ENERGY;
    }
    if upgrades.autoforge {
        probes *= rates::AUTOFORGE_PROBES;
    }
    if upgrades.archive_bloom {
        data *= rates::ARCHIVE_BLOOM_DATA;
    }
    let exploration_bonus = if upgrades.stellar_cartography {
        rates::CARTOGRAPHY_EXPLORATION
    } else {
        1.0
    };

    ProductionSnapshot {
        metal:             metal * production_factor,
        energy:            energy * production_factor,
        data:              data * production_factor,
        probes:            probes * production_factor,
        distance:          distance * exploration_bonus * signal.latency_factor,
        entropy_change,
        latency_factor:    signal.latency_factor,
        production_factor,
    }
}
