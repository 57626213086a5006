//! SQLite-backed save slot: the local key/value store the host persists
//! envelopes into.
//!
//! RULE: Only store.rs talks to the database.
//! Storage failures are logged and swallowed. A failed write is skipped
//! until the next scheduled save; a failed read means "no save".
//!
//! One slot per schema version key. A second process writing the same
//! file is not coordinated; last writer wins.

use crate::{
    error::GameResult,
    migration::migrate_save,
    save::{SaveEnvelope, LEGACY_STORAGE_KEYS, STORAGE_KEY},
};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

pub struct SaveStore {
    conn: Connection,
    path: Option<String>, // None for :memory:
}

impl SaveStore {
    /// Open (or create) the save database at `path`.
    pub fn open(path: &str) -> GameResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn, path: Some(path.to_string()) })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GameResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> GameResult<()> {
        self.conn
            .execute_batch(include_str!("../migrations/001_save_slot.sql"))?;
        Ok(())
    }

    // ── Write ──────────────────────────────────────────────────

    /// Persist under the current slot key. Never fails: errors are
    /// logged and reported as `false`.
    pub fn save_envelope(&self, envelope: &SaveEnvelope) -> bool {
        match self.try_save(envelope) {
            Ok(()) => {
                log::debug!("Saved envelope v{} to slot {STORAGE_KEY}", envelope.version);
                true
            }
            Err(e) => {
                log::warn!("Save skipped: {e}");
                false
            }
        }
    }

    fn try_save(&self, envelope: &SaveEnvelope) -> GameResult<()> {
        let payload = serde_json::to_string(envelope)?;
        self.put_raw(STORAGE_KEY, &payload, &envelope.saved_at.to_rfc3339())
    }

    /// Write an arbitrary payload under `key`.
    pub fn put_raw(&self, key: &str, payload: &str, saved_at: &str) -> GameResult<()> {
        self.conn.execute(
            "INSERT INTO save_slot (key, payload, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET payload = excluded.payload, saved_at = excluded.saved_at",
            params![key, payload, saved_at],
        )?;
        Ok(())
    }

    pub fn clear(&self) -> GameResult<()> {
        self.conn.execute("DELETE FROM save_slot", [])?;
        Ok(())
    }

    // ── Read ───────────────────────────────────────────────────

    /// The raw JSON of the newest slot present, current key first, then
    /// legacy keys. `None` when nothing is stored or the payload is not
    /// valid JSON.
    pub fn load_raw(&self) -> Option<Value> {
        for key in std::iter::once(STORAGE_KEY).chain(LEGACY_STORAGE_KEYS) {
            let payload = match self.get_raw(key) {
                Ok(Some(p)) => p,
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("Load failed reading slot {key}: {e}");
                    return None;
                }
            };
            return match serde_json::from_str(&payload) {
                Ok(value) => Some(value),
                Err(e) => {
                    log::warn!("Slot {key} holds corrupt JSON: {e}");
                    None
                }
            };
        }
        None
    }

    /// Load and migrate. Storage problems yield `Ok(None)`; a save from a
    /// newer build is surfaced as `Err(UnsupportedVersion)`.
    pub fn load_envelope(&self) -> GameResult<Option<SaveEnvelope>> {
        match self.load_raw() {
            Some(raw) => migrate_save(&raw).map(Some),
            None => Ok(None),
        }
    }

    fn get_raw(&self, key: &str) -> GameResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM save_slot WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }
}
