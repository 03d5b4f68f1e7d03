// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Notify dispatch payload (§4.5): `dispatch(event, message|messages[])`.

use crate::constants::NotificationEvent;
use crate::message::Message;

/// A batch of messages sharing a single dispatch event. Single-message
/// dispatches (`added`, `recreated`, `recovered`, `updated`, `deleted` for
/// one ref) use a one-element batch; the lifecycle scheduler's `due`,
/// `expired`, and bulk `deleted` dispatches use the full batch so plugins
/// see one event per poll tick rather than one per message (§5).
#[derive(Debug, Clone)]
pub struct NotifyBatch {
    pub event: NotificationEvent,
    pub messages: Vec<Message>,
}

impl NotifyBatch {
    pub fn single(event: NotificationEvent, message: Message) -> Self {
        Self { event, messages: vec![message] }
    }

    pub fn many(event: NotificationEvent, messages: Vec<Message>) -> Self {
        Self { event, messages }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
