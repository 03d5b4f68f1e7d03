// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use tempfile::tempdir;

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempdir().expect("tempdir");
    let config = Config::load(&dir.path().join("missing.toml")).expect("defaults on missing file");
    assert_eq!(config.scheduler.prune_interval_ms, 30_000);
    assert_eq!(config.storage.file_name, "snapshot.json.zst");
}

#[test]
fn malformed_file_is_a_hard_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("hub.toml");
    std::fs::write(&path, "not valid toml [[[").expect("write");
    assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
}

#[test]
fn file_values_override_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("hub.toml");
    std::fs::write(
        &path,
        r#"
        [scheduler]
        pruneIntervalMs = 5000

        [storage]
        fileName = "custom.json.zst"
        "#,
    )
    .expect("write");
    let config = Config::load(&path).expect("valid config");
    assert_eq!(config.scheduler.prune_interval_ms, 5_000);
    assert_eq!(config.storage.file_name, "custom.json.zst");
    // Unset sections still take their defaults.
    assert_eq!(config.archive.keep_previous_weeks, 8);
}

#[test]
#[serial]
fn env_override_wins_over_file_value() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("hub.toml");
    std::fs::write(&path, "[scheduler]\npruneIntervalMs = 5000\n").expect("write");

    std::env::set_var("HUB_SCHEDULER_PRUNE_INTERVAL_MS", "9000");
    let config = Config::load(&path);
    std::env::remove_var("HUB_SCHEDULER_PRUNE_INTERVAL_MS");

    assert_eq!(config.expect("valid config").scheduler.prune_interval_ms, 9_000);
}

#[test]
#[serial]
fn unparseable_env_override_is_a_hard_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("missing.toml");

    std::env::set_var("HUB_SCHEDULER_PRUNE_INTERVAL_MS", "not-a-number");
    let result = Config::load(&path);
    std::env::remove_var("HUB_SCHEDULER_PRUNE_INTERVAL_MS");

    assert!(matches!(result, Err(ConfigError::InvalidEnv { .. })));
}

#[test]
fn quiet_hours_config_parses_hhmm_into_minute_of_day() {
    let window = QuietHoursConfig { start: "22:30".to_string(), end: "06:00".to_string(), urgency_threshold: Level::L30 };
    assert_eq!(window.to_minutes().expect("valid window"), (22 * 60 + 30, 6 * 60));
}

#[test]
fn quiet_hours_config_rejects_malformed_time() {
    let window = QuietHoursConfig { start: "25:00".to_string(), end: "06:00".to_string(), urgency_threshold: Level::L30 };
    assert!(matches!(window.to_minutes(), Err(ConfigError::InvalidTime { .. })));
}

#[test]
fn snapshot_path_joins_storage_base_dir_and_file_name() {
    let mut config = Config::default();
    config.storage.base_dir = PathBuf::from("/tmp/hub-state");
    config.storage.file_name = "snapshot.json.zst".to_string();
    assert_eq!(config.snapshot_path(), PathBuf::from("/tmp/hub-state/snapshot.json.zst"));
}
