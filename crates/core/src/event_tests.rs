// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::message::test_support::MessageBuilder;

#[test]
fn single_batch_has_exactly_one_message() {
    let msg = MessageBuilder::default().build();
    let batch = NotifyBatch::single(NotificationEvent::Added, msg);
    assert_eq!(batch.messages.len(), 1);
    assert!(!batch.is_empty());
}

#[test]
fn many_batch_can_be_empty() {
    let batch = NotifyBatch::many(NotificationEvent::Due, Vec::new());
    assert!(batch.is_empty());
}
