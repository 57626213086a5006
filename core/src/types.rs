//! Shared primitive types used across the entire economy.
//!
//! RULE: unit and upgrade kinds are closed sets. Adding a kind means
//! adding an enum variant, which forces every lookup table to be updated.

use serde::{Deserialize, Serialize};

/// Simulated wall-clock time in seconds.
pub type Seconds = f64;

/// A number of fixed-length live ticks.
pub type Tick = u64;

/// The four stock resources. `entropy` and `distance` are control
/// variables, not stock, so they are not listed here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Metal,
    Energy,
    Data,
    Probes,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Metal,
        ResourceKind::Energy,
        ResourceKind::Data,
        ResourceKind::Probes,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Metal  => "metal",
            Self::Energy => "energy",
            Self::Data   => "data",
            Self::Probes => "probes",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum UnitKey {
    Harvesters,
    Foundries,
    Fabricators,
    Archives,
    SignalRelays,
    Stabilizers,
}

impl UnitKey {
    pub const ALL: [UnitKey; 6] = [
        UnitKey::Harvesters,
        UnitKey::Foundries,
        UnitKey::Fabricators,
        UnitKey::Archives,
        UnitKey::SignalRelays,
        UnitKey::Stabilizers,
    ];

    /// Stable key as written in save files.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Harvesters   => "harvesters",
            Self::Foundries    => "foundries",
            Self::Fabricators  => "fabricators",
            Self::Archives     => "archives",
            Self::SignalRelays => "signalRelays",
            Self::Stabilizers  => "stabilizers",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.key() == key)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum UpgradeKey {
    DysonSheath,
    Autoforge,
    ArchiveBloom,
    Autonomy,
    StellarCartography,
    QuantumMemory,
}

impl UpgradeKey {
    pub const ALL: [UpgradeKey; 6] = [
        UpgradeKey::DysonSheath,
        UpgradeKey::Autoforge,
        UpgradeKey::ArchiveBloom,
        UpgradeKey::Autonomy,
        UpgradeKey::StellarCartography,
        UpgradeKey::QuantumMemory,
    ];

    /// Stable key as written in save files.
    pub fn key(&self) -> &'static str {
        match self {
            Self::DysonSheath        => "dysonSheath",
            Self::Autoforge          => "autoforge",
            Self::ArchiveBloom       => "archiveBloom",
            Self::Autonomy           => "autonomy",
            Self::StellarCartography => "stellarCartography",
            Self::QuantumMemory      => "quantumMemory",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.key() == key)
    }
}
