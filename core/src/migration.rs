//! Save migration pipeline.
//!
//! RULES:
//!   - The chain is linear and forward-only: v0 → v1 → v2.
//!   - Every migrator is total. Garbage in, defaulted state out.
//!   - Only migrate_save returns errors, and only for a missing payload
//!     or a version this build does not know.
//!
//! Old payloads are read as an untyped serde_json::Value and probed field
//! by field. Each field is looked up under `state.<section>.<field>` and
//! then under the flat `<section>.<field>` path used by the oldest saves.
//! Anything missing or of the wrong type falls back to the matching
//! `config::INITIAL_*` value, not to zero.

use crate::{
    config::{self, MAX_LOG_ENTRIES},
    error::{GameError, GameResult},
    save::{SaveEnvelope, SaveMeta, CURRENT_VERSION},
    state::{clamp_entropy, GameState, PrestigeState, ResourceState, UnitCounts, UpgradeState},
    types::{UnitKey, UpgradeKey},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

pub const UNKNOWN_APP_VERSION: &str = "unknown";

/// Where a raw payload enters the chain.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaVersion {
    /// Missing, non-numeric or < 1.
    Legacy,
    V1,
    Current,
    Unsupported(String),
}

pub fn detect_version(raw: &Value) -> SchemaVersion {
    let Some(version) = raw.get("version").and_then(Value::as_f64) else {
        return SchemaVersion::Legacy;
    };
    if version.is_nan() || version < 1.0 {
        SchemaVersion::Legacy
    } else if version == 1.0 {
        SchemaVersion::V1
    } else if version == f64::from(CURRENT_VERSION) {
        SchemaVersion::Current
    } else {
        SchemaVersion::Unsupported(version.to_string())
    }
}

pub fn migrate_save(raw: &Value) -> GameResult<SaveEnvelope> {
    if is_falsy(raw) {
        return Err(GameError::MissingSave);
    }
    match detect_version(raw) {
        SchemaVersion::Legacy => {
            log::info!("Migrating legacy save v0 -> v{CURRENT_VERSION}");
            Ok(finish_v2(migrate_v0_to_v1(raw)))
        }
        SchemaVersion::V1 => {
            log::info!("Migrating save v1 -> v{CURRENT_VERSION}");
            Ok(migrate_v1_to_v2(raw))
        }
        SchemaVersion::Current => match SaveEnvelope::deserialize(raw) {
            Ok(envelope) => Ok(envelope),
            Err(e) => {
                log::warn!("Current-version save failed strict parse ({e}); rebuilding field by field");
                Ok(rebuild_current(raw))
            }
        },
        SchemaVersion::Unsupported(found) => Err(GameError::UnsupportedVersion {
            found,
            supported: CURRENT_VERSION,
        }),
    }
}

/// Rebuild every field of a pre-v1 payload from whatever is present.
pub fn migrate_v0_to_v1(raw: &Value) -> SaveEnvelope {
    let mut reader = FieldReader::new(raw);
    let resources = reader.resources();
    let units = reader.units();
    let upgrade_state = reader.upgrades();
    let prestige = PrestigeState {
        cycles:           reader.count("prestige", "cycles", config::INITIAL_PRESTIGE.cycles),
        stored_knowledge: reader.number("prestige", "storedKnowledge", config::INITIAL_PRESTIGE.stored_knowledge),
        forks:            0,
        prime_archives:   0.0,
    };
    let logs = read_logs(raw);

    if reader.defaulted > 0 {
        log::warn!("Save migration defaulted {} missing or malformed field(s)", reader.defaulted);
    }

    SaveEnvelope {
        version:  1,
        saved_at: read_saved_at(raw),
        meta:     SaveMeta { app_version: read_app_version(raw) },
        state:    GameState { resources, units, prestige, upgrade_state, logs },
    }
}

/// v1 carries a subset of the v0 surface, so the same reconstruction
/// applies; the fork counters introduced in v2 start from zero.
pub fn migrate_v1_to_v2(raw: &Value) -> SaveEnvelope {
    finish_v2(migrate_v0_to_v1(raw))
}

fn finish_v2(mut envelope: SaveEnvelope) -> SaveEnvelope {
    envelope.version = CURRENT_VERSION;
    envelope.state.prestige.forks = 0;
    envelope.state.prestige.prime_archives = 0.0;
    envelope
}

/// A current-version payload that fails strict parsing keeps its fork
/// counters when they are readable.
fn rebuild_current(raw: &Value) -> SaveEnvelope {
    let mut envelope = finish_v2(migrate_v0_to_v1(raw));
    let mut reader = FieldReader::new(raw);
    envelope.state.prestige.forks = reader.count("prestige", "forks", 0);
    envelope.state.prestige.prime_archives = reader.number("prestige", "primeArchives", 0.0);
    envelope
}

/// JS-style falsiness: null, false, 0 and "" all mean "no save".
fn is_falsy(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0 || f.is_nan()),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

struct FieldReader<'a> {
    raw:       &'a Value,
    defaulted: usize,
}

impl<'a> FieldReader<'a> {
    fn new(raw: &'a Value) -> Self {
        Self { raw, defaulted: 0 }
    }

    fn lookup(&self, section: &str, field: &str) -> Option<&'a Value> {
        let nested = self.raw.get("state").and_then(|s| s.get(section)).and_then(|s| s.get(field));
        nested.or_else(|| self.raw.get(section).and_then(|s| s.get(field)))
    }

    fn number(&mut self, section: &str, field: &str, default: f64) -> f64 {
        match self.lookup(section, field).and_then(Value::as_f64) {
            Some(n) if n.is_finite() && n >= 0.0 => n,
            _ => {
                log::debug!("migration: {section}.{field} defaulted to {default}");
                self.defaulted += 1;
                default
            }
        }
    }

    fn count(&mut self, section: &str, field: &str, default: u64) -> u64 {
        match self.lookup(section, field).and_then(Value::as_f64) {
            Some(n) if n.is_finite() && n >= 0.0 => n.floor() as u64,
            _ => {
                log::debug!("migration: {section}.{field} defaulted to {default}");
                self.defaulted += 1;
                default
            }
        }
    }

    fn flag(&mut self, section: &str, field: &str, default: bool) -> bool {
        match self.lookup(section, field).and_then(Value::as_bool) {
            Some(b) => b,
            None => {
                self.defaulted += 1;
                default
            }
        }
    }

    fn resources(&mut self) -> ResourceState {
        let d = config::INITIAL_RESOURCES;
        ResourceState {
            metal:    self.number("resources", "metal", d.metal),
            energy:   self.number("resources", "energy", d.energy),
            data:     self.number("resources", "data", d.data),
            probes:   self.number("resources", "probes", d.probes),
            entropy:  clamp_entropy(self.number("resources", "entropy", d.entropy)),
            distance: self.number("resources", "distance", d.distance),
        }
    }

    fn units(&mut self) -> UnitCounts {
        let mut units = config::INITIAL_UNITS;
        for key in UnitKey::ALL {
            let default = config::INITIAL_UNITS.get(key);
            *units.get_mut(key) = self.count("units", key.key(), default);
        }
        units
    }

    fn upgrades(&mut self) -> UpgradeState {
        let mut upgrades = config::INITIAL_UPGRADES;
        for key in UpgradeKey::ALL {
            let default = config::INITIAL_UPGRADES.has(key);
            let owned = self.flag("upgradeState", key.key(), default);
            upgrades.set(key, owned);
        }
        upgrades
    }
}

fn read_saved_at(raw: &Value) -> DateTime<Utc> {
    let parsed = match raw.get("savedAt") {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s).ok().map(|t| t.with_timezone(&Utc)),
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|ms| ms.is_finite())
            .and_then(|ms| DateTime::from_timestamp_millis(ms as i64)),
        _ => None,
    };
    // An unreadable timestamp grants no offline time.
    parsed.unwrap_or_else(Utc::now)
}

fn read_app_version(raw: &Value) -> String {
    raw.get("meta")
        .and_then(|m| m.get("appVersion"))
        .or_else(|| raw.get("appVersion"))
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_APP_VERSION)
        .to_string()
}

fn read_logs(raw: &Value) -> Vec<String> {
    let entries = raw
        .get("state")
        .and_then(|s| s.get("logs"))
        .or_else(|| raw.get("logs"))
        .and_then(Value::as_array);
    let Some(entries) = entries else {
        return Vec::new();
    };
    let lines: Vec<String> = entries
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();
    let skip = lines.len().saturating_sub(MAX_LOG_ENTRIES);
    lines.into_iter().skip(skip).collect()
}
