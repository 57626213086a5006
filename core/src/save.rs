//! Save envelope: the versioned, self-describing wrapper around a
//! GameState, plus file export/import.
//!
//! Every save point (autosave, manual save, export) builds a fresh
//! envelope. Import always runs the payload through the migration
//! pipeline, so callers only ever see current-schema envelopes.

use crate::{
    error::GameResult,
    migration::migrate_save,
    state::GameState,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Schema version written by this build.
pub const CURRENT_VERSION: u32 = 2;

/// Storage slot key. Changes whenever CURRENT_VERSION changes.
pub const STORAGE_KEY: &str = "probe-swarm-save-v2";

/// Slots written by older builds, probed newest first on load.
pub const LEGACY_STORAGE_KEYS: [&str; 2] = ["probe-swarm-save-v1", "probe-swarm-save"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaveMeta {
    pub app_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaveEnvelope {
    pub version:  u32,
    pub saved_at: DateTime<Utc>,
    pub meta:     SaveMeta,
    pub state:    GameState,
}

impl SaveEnvelope {
    /// Wall-clock seconds between `saved_at` and `now`, never negative.
    pub fn seconds_since_save(&self, now: DateTime<Utc>) -> f64 {
        let elapsed = now.signed_duration_since(self.saved_at);
        (elapsed.num_milliseconds() as f64 / 1000.0).max(0.0)
    }
}

pub fn build_save(state: &GameState, app_version: &str) -> SaveEnvelope {
    build_save_at(state, app_version, Utc::now())
}

/// `build_save` with an explicit timestamp.
pub fn build_save_at(state: &GameState, app_version: &str, saved_at: DateTime<Utc>) -> SaveEnvelope {
    SaveEnvelope {
        version: CURRENT_VERSION,
        saved_at,
        meta: SaveMeta { app_version: app_version.to_string() },
        state: state.clone(),
    }
}

/// Write the envelope as pretty JSON into `dir`. Returns the file path.
pub fn export_save_file(envelope: &SaveEnvelope, dir: &Path) -> GameResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let name = format!(
        "probe-swarm-{}.json",
        envelope.saved_at.format("%Y%m%d-%H%M%S")
    );
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(envelope)?;
    std::fs::write(&path, json)?;
    log::info!("Exported save to {}", path.display());
    Ok(path)
}

/// Read, parse and migrate a save file.
pub fn import_save_file(path: &Path) -> GameResult<SaveEnvelope> {
    let text = std::fs::read_to_string(path)?;
    let envelope = import_save_str(&text)?;
    log::info!(
        "Imported save from {} (app {})",
        path.display(),
        envelope.meta.app_version
    );
    Ok(envelope)
}

pub fn import_save_str(text: &str) -> GameResult<SaveEnvelope> {
    let raw: serde_json::Value = serde_json::from_str(text)?;
    migrate_save(&raw)
}
