// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hub_core::MessageBuilder;
use tempfile::tempdir;

#[test]
fn dotted_ref_maps_to_nested_subdirectory() {
    let dir = tempdir().unwrap();
    let archive = Archive::new(dir.path(), Duration::from_secs(1));
    let path = archive.path_for(&MsgRef::new("dwd.warning.123"));
    assert_eq!(path, dir.path().join("dwd").join("warning").join("123.jsonl"));
}

#[test]
fn ref_without_dots_is_a_flat_file() {
    let dir = tempdir().unwrap();
    let archive = Archive::new(dir.path(), Duration::from_secs(1));
    let path = archive.path_for(&MsgRef::new("t1"));
    assert_eq!(path, dir.path().join("t1.jsonl"));
}

#[test]
fn flush_writes_buffered_records_and_replay_reads_them_back() {
    let dir = tempdir().unwrap();
    let mut archive = Archive::new(dir.path(), Duration::from_secs(1));
    let msg = MessageBuilder::default().msg_ref("dwd.warning.123").build();

    archive.append(msg.msg_ref.clone(), ArchiveRecord::Create { at: 1, message: msg.clone() });
    archive.append(
        msg.msg_ref.clone(),
        ArchiveRecord::Delete { at: 2, reason: DeleteReason::Purge, message: msg.clone() },
    );
    let failures = archive.flush();
    assert!(failures.is_empty());

    let records = archive.replay(&msg.msg_ref).unwrap();
    assert_eq!(records.len(), 2);
    assert!(matches!(records[0], ArchiveRecord::Create { .. }));
    assert!(matches!(records[1], ArchiveRecord::Delete { reason: DeleteReason::Purge, .. }));
}

#[test]
fn replay_of_missing_ref_is_empty() {
    let dir = tempdir().unwrap();
    let archive = Archive::new(dir.path(), Duration::from_secs(1));
    let records = archive.replay(&MsgRef::new("never-written")).unwrap();
    assert!(records.is_empty());
}

#[test]
fn replay_stops_at_first_corrupt_line() {
    let dir = tempdir().unwrap();
    let mut archive = Archive::new(dir.path(), Duration::from_secs(1));
    let msg = MessageBuilder::default().msg_ref("t1").build();
    archive.append(msg.msg_ref.clone(), ArchiveRecord::Create { at: 1, message: msg.clone() });
    archive.flush();

    let path = archive.path_for(&msg.msg_ref);
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(b"not-valid-json\n").unwrap();
    file.write_all(
        serde_json::to_string(&ArchiveRecord::Delete {
            at: 2,
            reason: DeleteReason::Purge,
            message: msg.clone(),
        })
        .unwrap()
        .as_bytes(),
    )
    .unwrap();

    let records = archive.replay(&msg.msg_ref).unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn needs_flush_is_false_for_an_empty_buffer() {
    let dir = tempdir().unwrap();
    let archive = Archive::new(dir.path(), Duration::from_secs(1));
    assert!(!archive.needs_flush(Instant::now()));
}
