// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hub_core::MessageBuilder;
use tempfile::tempdir;

#[test]
fn read_snapshot_returns_default_when_file_missing() {
    let dir = tempdir().unwrap();
    let storage = Storage::new(dir.path().join("snapshot.bin"), Duration::from_secs(1));
    let registry = MigrationRegistry::new();
    let result = storage.read_snapshot(&registry, Vec::new()).unwrap();
    assert!(result.is_empty());
}

#[test]
fn flush_pending_writes_and_read_snapshot_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.bin");
    let mut storage = Storage::new(&path, Duration::from_secs(1));
    let msg = MessageBuilder::default().msg_ref("t1").build();

    storage.schedule_write(vec![msg.clone()], 7);
    storage.flush_pending().unwrap();
    assert!(!storage.has_pending());

    let registry = MigrationRegistry::new();
    let loaded = storage.read_snapshot(&registry, Vec::new()).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].msg_ref, msg.msg_ref);
}

#[test]
fn maybe_flush_respects_the_throttle_interval() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.bin");
    let mut storage = Storage::new(&path, Duration::from_secs(3600));
    let msg = MessageBuilder::default().msg_ref("t1").build();

    storage.schedule_write(vec![msg], 1);
    let wrote = storage.maybe_flush(Instant::now()).unwrap();
    assert!(wrote, "first flush is never throttled");
    assert!(!storage.has_pending());

    storage.schedule_write(vec![], 2);
    let wrote_again = storage.maybe_flush(Instant::now()).unwrap();
    assert!(!wrote_again, "second flush is within the throttle window");
    assert!(storage.has_pending());
}
