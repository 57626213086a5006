//! Events emitted by the session engine.
//!
//! The host renders these; the engine also folds each one into the
//! player-facing log via `describe()`.

use crate::{
    offline::format_number,
    types::{Tick, UnitKey, UpgradeKey},
};
use serde::{Deserialize, Serialize};

/// Variants are only ever appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    // ── Purchases ──────────────────────────────────
    UnitPurchased {
        unit: UnitKey,
        owned: u64,
    },
    UpgradePurchased {
        upgrade: UpgradeKey,
    },

    // ── Resets ─────────────────────────────────────
    CycleCompleted {
        cycles: u64,
        knowledge_gained: f64,
    },
    ForkCompleted {
        forks: u64,
        prime_archives_gained: f64,
    },

    // ── Thresholds ─────────────────────────────────
    DistanceMilestone {
        tick: Tick,
        threshold: f64,
    },
    ProbeMilestone {
        tick: Tick,
        threshold: f64,
    },
    EntropyCritical {
        tick: Tick,
    },

    // ── Persistence ────────────────────────────────
    OfflineProgressApplied {
        seconds: f64,
        summary: String,
    },
    SaveImported {
        app_version: String,
    },
}

impl GameEvent {
    /// Stable name, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::UnitPurchased { .. }          => "unit_purchased",
            Self::UpgradePurchased { .. }       => "upgrade_purchased",
            Self::CycleCompleted { .. }         => "cycle_completed",
            Self::ForkCompleted { .. }          => "fork_completed",
            Self::DistanceMilestone { .. }      => "distance_milestone",
            Self::ProbeMilestone { .. }         => "probe_milestone",
            Self::EntropyCritical { .. }        => "entropy_critical",
            Self::OfflineProgressApplied { .. } => "offline_progress_applied",
            Self::SaveImported { .. }           => "save_imported",
        }
    }

    /// Player-facing log line.
    pub fn describe(&self) -> String {
        match self {
            Self::UnitPurchased { unit, owned } => {
                format!("Built {} #{owned}.", crate::config::unit_config(*unit).label)
            }
            Self::UpgradePurchased { upgrade } => {
                format!("Upgrade online: {}.", crate::config::upgrade_config(*upgrade).label)
            }
            Self::CycleCompleted { cycles, knowledge_gained } => format!(
                "Cycle {cycles} complete. +{} stored knowledge.",
                format_number(*knowledge_gained)
            ),
            Self::ForkCompleted { forks, prime_archives_gained } => format!(
                "Swarm forked ({forks}). +{} prime archives.",
                format_number(*prime_archives_gained)
            ),
            Self::DistanceMilestone { threshold, .. } => {
                format!("Frontier passed {} distance.", format_number(*threshold))
            }
            Self::ProbeMilestone { threshold, .. } => {
                format!("Swarm reached {} probes.", format_number(*threshold))
            }
            Self::EntropyCritical { .. } => {
                "Entropy at critical levels; production throttled.".to_string()
            }
            Self::OfflineProgressApplied { summary, .. } => summary.clone(),
            Self::SaveImported { app_version } => {
                format!("Save imported (written by build {app_version}).")
            }
        }
    }
}
