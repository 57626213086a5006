//! Probe Swarm economy core.
//!
//! The host holds one `SwarmEngine` and drives it from two independent
//! timers: a 250 ms tick and a debounced autosave. Everything else in
//! this crate is a pure transformer over state it is handed.

pub mod autosave;
pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod migration;
pub mod offline;
pub mod production;
pub mod save;
pub mod state;
pub mod store;
pub mod types;

pub use engine::SwarmEngine;
pub use error::{GameError, GameResult};
pub use offline::{simulate_offline_progress, OfflineProgress};
pub use production::{compute_production, ProductionSnapshot};
pub use save::{build_save, export_save_file, import_save_file, SaveEnvelope, CURRENT_VERSION};
pub use migration::migrate_save;
pub use store::SaveStore;
