//! Mutable game state owned by the session engine.
//!
//! RULE: Only engine.rs mutates a live GameState. Production and
//! offline simulation take state by reference and hand back new values.

use crate::{
    config::{self, ResourceCost, ENTROPY_MAX, ENTROPY_MIN},
    types::{ResourceKind, Seconds, UnitKey, UpgradeKey},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceState {
    pub metal:    f64,
    pub energy:   f64,
    pub data:     f64,
    pub probes:   f64,
    /// Instability in [0, 0.88]; throttles production.
    pub entropy:  f64,
    /// Cumulative exploration distance. Never decreases in play.
    pub distance: f64,
}

impl Default for ResourceState {
    fn default() -> Self { config::INITIAL_RESOURCES }
}

impl ResourceState {
    pub fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Metal  => self.metal,
            ResourceKind::Energy => self.energy,
            ResourceKind::Data   => self.data,
            ResourceKind::Probes => self.probes,
        }
    }

    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut f64 {
        match kind {
            ResourceKind::Metal  => &mut self.metal,
            ResourceKind::Energy => &mut self.energy,
            ResourceKind::Data   => &mut self.data,
            ResourceKind::Probes => &mut self.probes,
        }
    }

    pub fn clamp_entropy(&mut self) {
        self.entropy = clamp_entropy(self.entropy);
    }

    pub fn can_afford(&self, cost: &ResourceCost) -> bool {
        ResourceKind::ALL
            .iter()
            .all(|&kind| self.get(kind) >= cost.get(kind))
    }

    /// Deduct `cost`. Callers check `can_afford` first.
    pub fn spend(&mut self, cost: &ResourceCost) {
        for kind in ResourceKind::ALL {
            *self.get_mut(kind) -= cost.get(kind);
        }
    }

    /// Integrate a per-second snapshot over `dt` seconds.
    pub fn integrate(&mut self, rates: &crate::production::ProductionSnapshot, dt: Seconds) {
        self.metal    += rates.metal * dt;
        self.energy   += rates.energy * dt;
        self.data     += rates.data * dt;
        self.probes   += rates.probes * dt;
        self.distance += rates.distance * dt;
        self.entropy  += rates.entropy_change * dt;
        self.clamp_entropy();
    }
}

/// Clamp into [0, 0.88]. NaN collapses to the floor.
pub fn clamp_entropy(value: f64) -> f64 {
    if value.is_nan() {
        return ENTROPY_MIN;
    }
    value.clamp(ENTROPY_MIN, ENTROPY_MAX)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UnitCounts {
    pub harvesters:    u64,
    pub foundries:     u64,
    pub fabricators:   u64,
    pub archives:      u64,
    pub signal_relays: u64,
    pub stabilizers:   u64,
}

impl Default for UnitCounts {
    fn default() -> Self { config::INITIAL_UNITS }
}

impl UnitCounts {
    pub fn get(&self, key: UnitKey) -> u64 {
        match key {
            UnitKey::Harvesters   => self.harvesters,
            UnitKey::Foundries    => self.foundries,
            UnitKey::Fabricators  => self.fabricators,
            UnitKey::Archives     => self.archives,
            UnitKey::SignalRelays => self.signal_relays,
            UnitKey::Stabilizers  => self.stabilizers,
        }
    }

    pub fn get_mut(&mut self, key: UnitKey) -> &mut u64 {
        match key {
            UnitKey::Harvesters   => &mut self.harvesters,
            UnitKey::Foundries    => &mut self.foundries,
            UnitKey::Fabricators  => &mut self.fabricators,
            UnitKey::Archives     => &mut self.archives,
            UnitKey::SignalRelays => &mut self.signal_relays,
            UnitKey::Stabilizers  => &mut self.stabilizers,
        }
    }
}

/// Purchased flags. Monotonic outside of prestige/fork resets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeState {
    pub dyson_sheath:        bool,
    pub autoforge:           bool,
    pub archive_bloom:       bool,
    pub autonomy:            bool,
    pub stellar_cartography: bool,
    pub quantum_memory:      bool,
}

impl Default for UpgradeState {
    fn default() -> Self { config::INITIAL_UPGRADES }
}

impl UpgradeState {
    pub fn has(&self, key: UpgradeKey) -> bool {
        match key {
            UpgradeKey::DysonSheath        => self.dyson_sheath,
            UpgradeKey::Autoforge          => self.autoforge,
            UpgradeKey::ArchiveBloom       => self.archive_bloom,
            UpgradeKey::Autonomy           => self.autonomy,
            UpgradeKey::StellarCartography => self.stellar_cartography,
            UpgradeKey::QuantumMemory      => self.quantum_memory,
        }
    }

    pub fn set(&mut self, key: UpgradeKey, owned: bool) {
        let flag = match key {
            UpgradeKey::DysonSheath        => &mut self.dyson_sheath,
            UpgradeKey::Autoforge          => &mut self.autoforge,
            UpgradeKey::ArchiveBloom       => &mut self.archive_bloom,
            UpgradeKey::Autonomy           => &mut self.autonomy,
            UpgradeKey::StellarCartography => &mut self.stellar_cartography,
            UpgradeKey::QuantumMemory      => &mut self.quantum_memory,
        };
        *flag = owned;
    }

    /// Keep only upgrades flagged `persistent` in the config.
    pub fn retain_persistent(&self) -> Self {
        let mut kept = config::INITIAL_UPGRADES;
        for key in UpgradeKey::ALL {
            if self.has(key) && config::upgrade_config(key).persistent {
                kept.set(key, true);
            }
        }
        kept
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrestigeState {
    pub cycles:           u64,
    pub stored_knowledge: f64,
    #[serde(default)]
    pub forks:            u64,
    #[serde(default)]
    pub prime_archives:   f64,
}

impl Default for PrestigeState {
    fn default() -> Self { config::INITIAL_PRESTIGE }
}

/// Everything a save envelope carries under `state`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub resources:     ResourceState,
    pub units:         UnitCounts,
    pub prestige:      PrestigeState,
    pub upgrade_state: UpgradeState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs:          Vec<String>,
}

impl GameState {
    /// Append a player-facing log line, dropping the oldest past the cap.
    pub fn push_log(&mut self, line: impl Into<String>) {
        self.logs.push(line.into());
        if self.logs.len() > config::MAX_LOG_ENTRIES {
            let overflow = self.logs.len() - config::MAX_LOG_ENTRIES;
            self.logs.drain(..overflow);
        }
    }
}
