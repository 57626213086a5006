use crate::types::{UnitKey, UpgradeKey};
use serde::{Deserialize, Serialize};

/// All player-issued commands.
/// New variants go at the end of their group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Clock control ─────────────────────────────
    Pause,
    Resume,

    // ── Economy ───────────────────────────────────
    BuyUnit { unit: UnitKey },
    BuyUpgrade { upgrade: UpgradeKey },

    // ── Resets ────────────────────────────────────
    Prestige,
    Fork,
}
