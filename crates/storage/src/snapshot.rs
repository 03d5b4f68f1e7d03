// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage: the single blob snapshot of the non-purged canonical list (§4.2).
//!
//! Writes are eventually consistent and throttled — a caller schedules a
//! snapshot and `maybe_flush` only writes once `interval` has elapsed since
//! the last write. `flush_pending` forces a synchronous write regardless of
//! the interval, for shutdown. A write failure is logged and never
//! propagated: the in-memory Store state remains authoritative until the
//! next successful write.

use crate::migration::{MigrationError, MigrationRegistry};
use hub_core::Message;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;

/// The schema version this build writes and expects on load.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("zstd (de)compression failed: {0}")]
    Zstd(io::Error),
    #[error(transparent)]
    Migration(#[from] MigrationError),
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEnvelope {
    v: u32,
    /// Last archive sequence number folded into this snapshot, used only to
    /// correlate snapshot-vs-archive recovery progress; the archive is
    /// still replayed in full on recovery regardless.
    seq: u64,
    state: HashMap<String, Message>,
}

pub struct Storage {
    path: PathBuf,
    interval: Duration,
    pending: Option<(Vec<Message>, u64)>,
    last_write: Option<Instant>,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>, interval: Duration) -> Self {
        Self { path: path.into(), interval, pending: None, last_write: None }
    }

    /// `read_snapshot(default)`: the last persisted snapshot, migrated to
    /// [`SNAPSHOT_VERSION`], or `default` on first run / missing file.
    pub fn read_snapshot(
        &self,
        registry: &MigrationRegistry,
        default: Vec<Message>,
    ) -> Result<Vec<Message>, StorageError> {
        let compressed = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(default),
            Err(e) => return Err(e.into()),
        };
        let raw_bytes = zstd::stream::decode_all(compressed.as_slice()).map_err(StorageError::Zstd)?;
        let raw: serde_json::Value = serde_json::from_slice(&raw_bytes)?;
        let migrated = registry.migrate_to(raw, SNAPSHOT_VERSION)?;
        let envelope: SnapshotEnvelope = serde_json::from_value(migrated)?;
        Ok(envelope.state.into_values().collect())
    }

    /// Schedule a snapshot write; does not write immediately.
    pub fn schedule_write(&mut self, messages: Vec<Message>, seq: u64) {
        self.pending = Some((messages, seq));
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Write the pending snapshot if `interval` has elapsed since the last
    /// write. Returns whether a write happened.
    pub fn maybe_flush(&mut self, now: Instant) -> Result<bool, StorageError> {
        let due = match self.last_write {
            Some(last) => now.duration_since(last) >= self.interval,
            None => true,
        };
        if due && self.pending.is_some() {
            self.flush_pending()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// On-disk size of the snapshot file in bytes, or `0` before the first
    /// write. Used by `admin.stats.get { include: { archiveSize } }` (§6).
    pub fn size_bytes(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    /// Force a synchronous write of any pending snapshot, ignoring the
    /// throttle interval. Used on shutdown.
    pub fn flush_pending(&mut self) -> Result<(), StorageError> {
        let Some((messages, seq)) = self.pending.take() else {
            return Ok(());
        };
        let state: HashMap<String, Message> =
            messages.into_iter().map(|m| (m.msg_ref.to_string(), m)).collect();
        let envelope = SnapshotEnvelope { v: SNAPSHOT_VERSION, seq, state };
        let json = serde_json::to_vec(&envelope)?;
        let compressed = zstd::stream::encode_all(json.as_slice(), 0).map_err(StorageError::Zstd)?;

        let tmp_path = self.path.with_extension("tmp");
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp_path, &compressed)?;
        fs::rename(&tmp_path, &self.path)?;
        self.last_write = Some(Instant::now());
        Ok(())
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
