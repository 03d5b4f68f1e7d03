// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Archive: the per-ref append-only event log (§4.3).
//!
//! Writes are buffered in memory and flushed on an interval or at shutdown;
//! archive failure never blocks a mutation. On disk, dots in a `ref` map to
//! subdirectories (`a.b.c` → `a/b/c.jsonl`) so refs can be organized
//! hierarchically without name collisions.

use hub_core::{Message, MsgRef, Patch};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeleteReason {
    Deleted,
    Expired,
    PurgeOnRecreate,
    Purge,
}

/// One archive entry for a single ref.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ArchiveRecord {
    Create { at: u64, message: Message },
    Patch { at: u64, patch: Patch, before: Message, after: Message },
    Delete { at: u64, reason: DeleteReason, message: Message },
}

pub struct Archive {
    root: PathBuf,
    buffer: HashMap<MsgRef, Vec<ArchiveRecord>>,
    last_flush: Instant,
    flush_interval: Duration,
}

impl Archive {
    pub fn new(root: impl Into<PathBuf>, flush_interval: Duration) -> Self {
        Self { root: root.into(), buffer: HashMap::new(), last_flush: Instant::now(), flush_interval }
    }

    /// Maps a ref to its on-disk path: dots become subdirectories.
    fn path_for(&self, msg_ref: &MsgRef) -> PathBuf {
        let segments = msg_ref.path_segments();
        let mut path = self.root.clone();
        if let Some((last, dirs)) = segments.split_last() {
            for dir in dirs {
                path.push(dir);
            }
            path.push(format!("{last}.jsonl"));
        }
        path
    }

    pub fn append(&mut self, msg_ref: MsgRef, record: ArchiveRecord) {
        self.buffer.entry(msg_ref).or_default().push(record);
    }

    pub fn needs_flush(&self, now: Instant) -> bool {
        !self.buffer.is_empty() && now.duration_since(self.last_flush) >= self.flush_interval
    }

    /// Append every buffered record to its ref's log file and clear the
    /// buffer. Best-effort per ref: a failure for one ref doesn't stop the
    /// others from flushing (mirrors §4.2's "failures are logged but never
    /// surface to the mutation path").
    pub fn flush(&mut self) -> Vec<(MsgRef, ArchiveError)> {
        let mut failures = Vec::new();
        for (msg_ref, records) in self.buffer.drain() {
            if let Err(err) = Self::write_records(&self.root, &msg_ref, &records) {
                tracing::warn!(%msg_ref, error = %err, "archive flush failed, will retry next tick");
                failures.push((msg_ref, err));
            }
        }
        self.last_flush = Instant::now();
        failures
    }

    fn write_records(root: &std::path::Path, msg_ref: &MsgRef, records: &[ArchiveRecord]) -> Result<(), ArchiveError> {
        let segments = msg_ref.path_segments();
        let (last, dirs) = segments
            .split_last()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "ref is never empty"))?;
        let mut dir_path = root.to_path_buf();
        for dir in dirs {
            dir_path.push(dir);
        }
        fs::create_dir_all(&dir_path)?;
        let path = dir_path.join(format!("{last}.jsonl"));
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        for record in records {
            serde_json::to_writer(&mut file, record)?;
            file.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Total on-disk size of every `.jsonl` file under the archive root, in
    /// bytes. Used by `admin.stats.get { include: { archiveSize } }` (§6);
    /// walks the whole tree, so callers only request it when asked to.
    pub fn size_bytes(&self) -> u64 {
        fn walk(dir: &std::path::Path) -> u64 {
            let Ok(entries) = fs::read_dir(dir) else { return 0 };
            entries
                .filter_map(Result::ok)
                .map(|entry| {
                    let path = entry.path();
                    if path.is_dir() {
                        walk(&path)
                    } else {
                        entry.metadata().map(|m| m.len()).unwrap_or(0)
                    }
                })
                .sum()
        }
        walk(&self.root)
    }

    /// Replay every record for a ref, in append order. Stops at the first
    /// corrupt line rather than failing the whole replay.
    pub fn replay(&self, msg_ref: &MsgRef) -> Result<Vec<ArchiveRecord>, ArchiveError> {
        let path = self.path_for(msg_ref);
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut records = Vec::new();
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(_) => break,
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
