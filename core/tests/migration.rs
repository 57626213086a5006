//! Save migration tests.
//!
//! Tests cover: version dispatch, pass-through of current saves, default
//! filling from the initial tables, tolerance of malformed payloads, and
//! the fatal cases (no data, future versions).

use chrono::{TimeZone, Utc};
use probeswarm_core::{
    config::{INITIAL_RESOURCES, INITIAL_UNITS, INITIAL_UPGRADES},
    error::GameError,
    migration::{detect_version, migrate_save, migrate_v0_to_v1, migrate_v1_to_v2, SchemaVersion},
    save::{build_save_at, export_save_file, import_save_file, import_save_str, CURRENT_VERSION},
    state::GameState,
};
use serde_json::json;

fn sample_state() -> GameState {
    let mut state = GameState::default();
    state.resources.metal = 1_234.5;
    state.resources.entropy = 0.31;
    state.resources.distance = 2_048.25;
    state.units.harvesters = 12;
    state.units.stabilizers = 2;
    state.upgrade_state.autoforge = true;
    state.prestige.cycles = 3;
    state.prestige.stored_knowledge = 9.0;
    state.prestige.forks = 1;
    state.prestige.prime_archives = 2.0;
    state.logs = vec!["Built Harvester #12.".into()];
    state
}

#[test]
fn current_version_passes_through_unchanged() {
    let saved_at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
    let envelope = build_save_at(&sample_state(), "0.4.0", saved_at);
    let raw = serde_json::to_value(&envelope).unwrap();

    let migrated = migrate_save(&raw).unwrap();

    assert_eq!(migrated, envelope);
}

#[test]
fn version_dispatch() {
    assert_eq!(detect_version(&json!({})), SchemaVersion::Legacy);
    assert_eq!(detect_version(&json!({ "version": 0 })), SchemaVersion::Legacy);
    assert_eq!(detect_version(&json!({ "version": -3 })), SchemaVersion::Legacy);
    assert_eq!(detect_version(&json!({ "version": "2" })), SchemaVersion::Legacy);
    assert_eq!(detect_version(&json!({ "version": null })), SchemaVersion::Legacy);
    assert_eq!(detect_version(&json!({ "version": 1 })), SchemaVersion::V1);
    assert_eq!(detect_version(&json!({ "version": 2 })), SchemaVersion::Current);
    assert!(matches!(detect_version(&json!({ "version": 3 })), SchemaVersion::Unsupported(_)));
    assert!(matches!(detect_version(&json!({ "version": 1.5 })), SchemaVersion::Unsupported(_)));
}

#[test]
fn legacy_and_v1_saves_end_at_current_version() {
    let legacy = migrate_save(&json!({ "resources": { "metal": 50 } })).unwrap();
    assert_eq!(legacy.version, CURRENT_VERSION);
    assert_eq!(legacy.state.resources.metal, 50.0);

    let v1 = migrate_save(&json!({ "version": 1, "state": { "units": { "foundries": 4 } } })).unwrap();
    assert_eq!(v1.version, CURRENT_VERSION);
    assert_eq!(v1.state.units.foundries, 4);
}

#[test]
fn future_version_is_rejected() {
    for version in [3, 99] {
        let err = migrate_save(&json!({ "version": version, "state": {} })).unwrap_err();
        assert!(
            matches!(err, GameError::UnsupportedVersion { supported: 2, .. }),
            "expected UnsupportedVersion, got {err:?}"
        );
    }
}

#[test]
fn missing_payload_is_rejected() {
    for raw in [json!(null), json!(false), json!(0), json!("")] {
        let err = migrate_save(&raw).unwrap_err();
        assert!(matches!(err, GameError::MissingSave), "raw {raw} gave {err:?}");
    }
}

/// A lone harvester count keeps its value; everything else comes from
/// the initial tables rather than zero.
#[test]
fn missing_fields_default_from_initial_tables() {
    let env = migrate_v0_to_v1(&json!({ "units": { "harvesters": 3 } }));

    assert_eq!(env.version, 1);
    assert_eq!(env.state.units.harvesters, 3);
    assert_eq!(env.state.units.foundries, INITIAL_UNITS.foundries);
    assert_eq!(env.state.resources, INITIAL_RESOURCES);
    assert_eq!(env.state.upgrade_state, INITIAL_UPGRADES);
    assert_eq!(env.meta.app_version, "unknown");
}

#[test]
fn mistyped_fields_fall_back_per_field() {
    let raw = json!({
        "state": {
            "resources": { "metal": "lots", "energy": 55, "data": -4 },
            "units": { "foundries": "many", "archives": 2.9 },
            "upgradeState": { "autoforge": "yes", "dysonSheath": true },
        }
    });
    let env = migrate_v0_to_v1(&raw);

    assert_eq!(env.state.resources.metal, INITIAL_RESOURCES.metal);
    assert_eq!(env.state.resources.energy, 55.0);
    assert_eq!(env.state.resources.data, INITIAL_RESOURCES.data, "negative values are rejected");
    assert_eq!(env.state.units.foundries, INITIAL_UNITS.foundries);
    assert_eq!(env.state.units.archives, 2);
    assert!(!env.state.upgrade_state.autoforge);
    assert!(env.state.upgrade_state.dyson_sheath);
}

#[test]
fn nested_state_path_wins_over_flat_path() {
    let raw = json!({
        "state": { "resources": { "metal": 5 } },
        "resources": { "metal": 9, "data": 7 },
    });
    let env = migrate_v0_to_v1(&raw);

    assert_eq!(env.state.resources.metal, 5.0);
    assert_eq!(env.state.resources.data, 7.0, "flat path fills gaps");
}

#[test]
fn out_of_range_entropy_is_clamped() {
    let env = migrate_v0_to_v1(&json!({ "resources": { "entropy": 3.0 } }));
    assert_eq!(env.state.resources.entropy, 0.88);
}

#[test]
fn v1_to_v2_zeroes_fork_counters() {
    let raw = json!({
        "version": 1,
        "state": {
            "prestige": { "cycles": 2, "storedKnowledge": 4.5, "forks": 7, "primeArchives": 3 }
        }
    });
    let env = migrate_v1_to_v2(&raw);

    assert_eq!(env.version, 2);
    assert_eq!(env.state.prestige.cycles, 2);
    assert_eq!(env.state.prestige.stored_knowledge, 4.5);
    assert_eq!(env.state.prestige.forks, 0);
    assert_eq!(env.state.prestige.prime_archives, 0.0);
}

#[test]
fn migrators_tolerate_garbage() {
    let garbage = [
        json!([1, 2, 3]),
        json!("hello"),
        json!(42),
        json!({ "state": 5 }),
        json!({ "state": { "units": [1, 2] }, "savedAt": { "nope": true } }),
    ];
    for raw in garbage {
        let v1 = migrate_v0_to_v1(&raw);
        assert_eq!(v1.state.units, INITIAL_UNITS, "raw {raw}");
        let v2 = migrate_v1_to_v2(&raw);
        assert_eq!(v2.state.resources, INITIAL_RESOURCES, "raw {raw}");
        assert!(migrate_save(&raw).is_ok(), "raw {raw} should migrate to defaults");
    }
}

#[test]
fn saved_at_accepts_iso_strings_and_epoch_millis() {
    let iso = migrate_v0_to_v1(&json!({ "savedAt": "2025-12-31T23:59:00Z" }));
    assert_eq!(iso.saved_at, Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 0).unwrap());

    let millis = migrate_v0_to_v1(&json!({ "savedAt": 1_700_000_000_000_i64 }));
    assert_eq!(millis.saved_at.timestamp(), 1_700_000_000);
}

#[test]
fn logs_keep_strings_and_newest_forty() {
    let mut lines: Vec<serde_json::Value> = (0..60).map(|i| json!(format!("line {i}"))).collect();
    lines.push(json!(17));
    let env = migrate_v0_to_v1(&json!({ "state": { "logs": lines } }));

    assert_eq!(env.state.logs.len(), 40);
    assert_eq!(env.state.logs.first().map(String::as_str), Some("line 20"));
    assert_eq!(env.state.logs.last().map(String::as_str), Some("line 59"));
}

/// A current-version payload missing fields still loads, keeping its
/// fork counters.
#[test]
fn malformed_current_save_is_rebuilt() {
    let raw = json!({
        "version": 2,
        "meta": { "appVersion": "0.3.1" },
        "state": {
            "units": { "harvesters": 2.0 },
            "prestige": { "forks": 2, "primeArchives": 1.5 }
        }
    });
    let env = migrate_save(&raw).unwrap();

    assert_eq!(env.version, 2);
    assert_eq!(env.meta.app_version, "0.3.1");
    assert_eq!(env.state.units.harvesters, 2);
    assert_eq!(env.state.prestige.forks, 2);
    assert_eq!(env.state.prestige.prime_archives, 1.5);
}

#[test]
fn import_surfaces_parse_and_version_errors() {
    assert!(matches!(import_save_str("{not json"), Err(GameError::Serialization(_))));
    assert!(matches!(
        import_save_str(r#"{"version": 7}"#),
        Err(GameError::UnsupportedVersion { .. })
    ));

    let env = import_save_str(r#"{"version": 1, "state": {"resources": {"probes": 12}}}"#).unwrap();
    assert_eq!(env.version, CURRENT_VERSION);
    assert_eq!(env.state.resources.probes, 12.0);
}

#[test]
fn export_then_import_file() {
    let dir = std::env::temp_dir().join(format!("probe-swarm-export-{}", std::process::id()));
    let saved_at = Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap();
    let envelope = build_save_at(&sample_state(), "0.5.0", saved_at);

    let path = export_save_file(&envelope, &dir).unwrap();
    assert!(path.file_name().unwrap().to_string_lossy().ends_with(".json"));

    let imported = import_save_file(&path).unwrap();
    assert_eq!(imported, envelope);

    let _ = std::fs::remove_dir_all(&dir);
}
