// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration (§6): a TOML file layered with `HUB_<SECTION>_<KEY>`
//! environment overrides, validated eagerly at startup. An operator-supplied
//! value that fails to parse is a startup error, never a silent fallback to
//! the default.

use hub_core::Level;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("parsing config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("environment variable {var} has an invalid value {value:?} for {field}")]
    InvalidEnv { var: String, value: String, field: &'static str },
    #[error("quiet hours time {value:?} is not a valid HH:MM")]
    InvalidTime { value: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DaemonConfig {
    /// Path to the Unix-domain socket the command bus listens on.
    pub socket_path: PathBuf,
    /// Operator's configured timezone offset, for `admin.stats.get`'s
    /// calendar buckets (§6).
    pub tz_offset_minutes: i32,
    /// Operator's configured display locale, threaded into the Renderer's
    /// `datetime` filter (§4.4).
    pub locale: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            socket_path: default_state_dir().join("hub.sock"),
            tz_offset_minutes: 0,
            locale: "en-US".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerConfig {
    pub prune_interval_ms: u64,
    /// Due-poll cadence; `0` disables the loop (§6).
    pub notifier_interval_ms: u64,
    /// Retention before purging `deleted`/`expired` entries.
    pub hard_delete_after_ms: u64,
    pub hard_delete_interval_ms: u64,
    pub delete_closed_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            prune_interval_ms: 30_000,
            notifier_interval_ms: 10_000,
            hard_delete_after_ms: 4 * 60 * 60 * 1000,
            hard_delete_interval_ms: 4 * 60 * 60 * 1000,
            delete_closed_interval_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    pub base_dir: PathBuf,
    pub file_name: String,
    pub write_interval_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { base_dir: default_state_dir(), file_name: "snapshot.json.zst".to_string(), write_interval_ms: 1_000 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArchiveConfig {
    pub base_dir: PathBuf,
    pub file_extension: String,
    pub flush_interval_ms: u64,
    pub keep_previous_weeks: u32,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            base_dir: default_state_dir().join("archive"),
            file_extension: "jsonl".to_string(),
            flush_interval_ms: 5_000,
            keep_previous_weeks: 8,
        }
    }
}

/// A single quiet-hours window (§4.5), expressed as `HH:MM` wall-clock
/// strings so the TOML file stays human-editable.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuietHoursConfig {
    pub start: String,
    pub end: String,
    #[serde(default = "default_urgency_threshold")]
    pub urgency_threshold: Level,
}

fn default_urgency_threshold() -> Level {
    Level::L30
}

impl QuietHoursConfig {
    /// Parse `start`/`end` (`HH:MM`) into minute-of-day for
    /// [`hub_adapters::QuietHours`].
    pub fn to_minutes(&self) -> Result<(u16, u16), ConfigError> {
        Ok((Self::parse_hhmm(&self.start)?, Self::parse_hhmm(&self.end)?))
    }

    fn parse_hhmm(value: &str) -> Result<u16, ConfigError> {
        let (h, m) = value.split_once(':').ok_or_else(|| ConfigError::InvalidTime { value: value.to_string() })?;
        let h: u16 = h.parse().map_err(|_| ConfigError::InvalidTime { value: value.to_string() })?;
        let m: u16 = m.parse().map_err(|_| ConfigError::InvalidTime { value: value.to_string() })?;
        if h >= 24 || m >= 60 {
            return Err(ConfigError::InvalidTime { value: value.to_string() });
        }
        Ok(h * 60 + m)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub daemon: DaemonConfig,
    pub scheduler: SchedulerConfig,
    pub storage: StorageConfig,
    pub archive: ArchiveConfig,
    pub quiet_hours: Vec<QuietHoursConfig>,
}

fn default_state_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hub")
}

impl Config {
    /// Load from `path` (TOML) if it exists, falling back to defaults when
    /// no file is present, then apply `HUB_<SECTION>_<KEY>` overrides. A
    /// present-but-malformed file or an unparseable override is a hard
    /// error — never a silent default substitution.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(contents) => {
                toml::from_str(&contents).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?
            }
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(source) => return Err(ConfigError::Read { path: path.to_path_buf(), source }),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        override_path(&mut self.daemon.socket_path, "HUB_DAEMON_SOCKET_PATH");
        override_parsed(&mut self.daemon.tz_offset_minutes, "HUB_DAEMON_TZ_OFFSET_MINUTES", "tz_offset_minutes")?;
        override_string(&mut self.daemon.locale, "HUB_DAEMON_LOCALE");

        override_parsed(
            &mut self.scheduler.prune_interval_ms,
            "HUB_SCHEDULER_PRUNE_INTERVAL_MS",
            "prune_interval_ms",
        )?;
        override_parsed(
            &mut self.scheduler.notifier_interval_ms,
            "HUB_SCHEDULER_NOTIFIER_INTERVAL_MS",
            "notifier_interval_ms",
        )?;
        override_parsed(
            &mut self.scheduler.hard_delete_after_ms,
            "HUB_SCHEDULER_HARD_DELETE_AFTER_MS",
            "hard_delete_after_ms",
        )?;
        override_parsed(
            &mut self.scheduler.hard_delete_interval_ms,
            "HUB_SCHEDULER_HARD_DELETE_INTERVAL_MS",
            "hard_delete_interval_ms",
        )?;
        override_parsed(
            &mut self.scheduler.delete_closed_interval_ms,
            "HUB_SCHEDULER_DELETE_CLOSED_INTERVAL_MS",
            "delete_closed_interval_ms",
        )?;

        override_path(&mut self.storage.base_dir, "HUB_STORAGE_BASE_DIR");
        override_string(&mut self.storage.file_name, "HUB_STORAGE_FILE_NAME");
        override_parsed(&mut self.storage.write_interval_ms, "HUB_STORAGE_WRITE_INTERVAL_MS", "write_interval_ms")?;

        override_path(&mut self.archive.base_dir, "HUB_ARCHIVE_BASE_DIR");
        override_string(&mut self.archive.file_extension, "HUB_ARCHIVE_FILE_EXTENSION");
        override_parsed(&mut self.archive.flush_interval_ms, "HUB_ARCHIVE_FLUSH_INTERVAL_MS", "flush_interval_ms")?;
        override_parsed(
            &mut self.archive.keep_previous_weeks,
            "HUB_ARCHIVE_KEEP_PREVIOUS_WEEKS",
            "keep_previous_weeks",
        )?;

        Ok(())
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.storage.base_dir.join(&self.storage.file_name)
    }
}

fn override_string(field: &mut String, var: &str) {
    if let Ok(value) = std::env::var(var) {
        *field = value;
    }
}

fn override_path(field: &mut PathBuf, var: &str) {
    if let Ok(value) = std::env::var(var) {
        *field = PathBuf::from(value);
    }
}

fn override_parsed<T: FromStr>(field: &mut T, var: &str, name: &'static str) -> Result<(), ConfigError> {
    if let Ok(value) = std::env::var(var) {
        *field = value
            .parse()
            .map_err(|_| ConfigError::InvalidEnv { var: var.to_string(), value, field: name })?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
