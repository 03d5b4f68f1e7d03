// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hub_core::{Kind, LifecycleState, Message, MessageBuilder, OriginType};

fn msg(msg_ref: &str) -> Message {
    MessageBuilder::default().msg_ref(msg_ref).build()
}

const NOW: u64 = 1_700_000_000_000; // 2023-11-14T22:13:20Z

#[test]
fn current_counts_by_kind_and_lifecycle() {
    let mut task = msg("task");
    task.kind = Kind::Task;
    let mut status = msg("status");
    status.kind = Kind::Status;
    status.lifecycle.state = LifecycleState::Acked;

    let summary = compute_stats(&[task, status], NOW, 0, IoStats::default());
    assert_eq!(summary.current.total, 2);
    assert_eq!(summary.current.by_kind[&Kind::Task], 1);
    assert_eq!(summary.current.by_kind[&Kind::Status], 1);
    assert_eq!(summary.current.by_lifecycle[&LifecycleState::Open], 1);
    assert_eq!(summary.current.by_lifecycle[&LifecycleState::Acked], 1);
}

#[test]
fn current_counts_hidden_states_too_unlike_default_query_view() {
    let mut deleted = msg("deleted");
    deleted.lifecycle.state = LifecycleState::Deleted;

    let summary = compute_stats(&[deleted], NOW, 0, IoStats::default());
    assert_eq!(summary.current.total, 1);
    assert_eq!(summary.current.by_lifecycle[&LifecycleState::Deleted], 1);
}

#[test]
fn by_origin_system_only_counts_messages_that_set_it() {
    let mut bridged = msg("bridged");
    bridged.origin.kind = OriginType::Automation;
    bridged.origin.system = Some("zigbee".to_string());
    let manual = msg("manual");

    let summary = compute_stats(&[bridged, manual], NOW, 0, IoStats::default());
    assert_eq!(summary.current.by_origin_system["zigbee"], 1);
    assert_eq!(summary.current.by_origin_system.len(), 1);
}

#[test]
fn overdue_due_at_counts_as_overdue_not_today() {
    let mut overdue = msg("overdue");
    overdue.timing.due_at = Some(NOW - 60_000);

    let summary = compute_stats(&[overdue], NOW, 0, IoStats::default());
    assert_eq!(summary.schedule.overdue, 1);
    assert_eq!(summary.schedule.today, 0);
    assert_eq!(summary.schedule.total, 1);
}

#[test]
fn closed_state_excludes_message_from_schedule_bucket() {
    let mut done = msg("done");
    done.lifecycle.state = LifecycleState::Closed;
    done.timing.due_at = Some(NOW + 60_000);

    let summary = compute_stats(&[done], NOW, 0, IoStats::default());
    assert_eq!(summary.schedule.total, 0, "only open messages count toward the schedule");
}

#[test]
fn done_bucket_counts_closed_and_deleted_by_state_changed_at() {
    let mut closed_today = msg("closed-today");
    closed_today.lifecycle.state = LifecycleState::Closed;
    closed_today.lifecycle.state_changed_at = NOW;

    let summary = compute_stats(&[closed_today], NOW, 0, IoStats::default());
    assert_eq!(summary.done.today, 1);
    assert_eq!(summary.done.last_closed_at, Some(NOW));
}

#[test]
fn io_stats_are_none_when_not_supplied() {
    let summary = compute_stats(&[], NOW, 0, IoStats::default());
    assert_eq!(summary.io.storage_bytes, None);
    assert_eq!(summary.io.archive_bytes, None);
}

#[test]
fn meta_carries_generated_at_and_tz_offset() {
    let summary = compute_stats(&[], NOW, -300, IoStats::default());
    assert_eq!(summary.meta.generated_at, NOW);
    assert_eq!(summary.meta.tz_offset_minutes, -300);
}
