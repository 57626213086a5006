use crate::types::UpgradeKey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No save data to migrate")]
    MissingSave,

    #[error("Unsupported save version {found} (this build reads up to v{supported})")]
    UnsupportedVersion { found: String, supported: u32 },

    #[error("Not enough resources for {what}")]
    InsufficientResources { what: String },

    #[error("Upgrade '{}' requires {required_cycles} completed cycle(s)", upgrade.key())]
    UpgradeLocked { upgrade: UpgradeKey, required_cycles: u64 },

    #[error("Upgrade '{}' already purchased", upgrade.key())]
    AlreadyPurchased { upgrade: UpgradeKey },

    #[error("Reset unavailable: {reason}")]
    PrestigeUnavailable { reason: String },
}

pub type GameResult<T> = Result<T, GameError>;
