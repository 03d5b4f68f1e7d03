// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Closed enum sets for the message schema.
//!
//! Every field here rejects unknown values at validation time (see
//! [`crate::factory`]) rather than at use sites — an unrecognized `kind` or
//! `level` never makes it into the canonical table.

use serde::{Deserialize, Serialize};

/// What a message represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Task,
    Status,
    Appointment,
    Shoppinglist,
    Inventorylist,
}

crate::simple_display! {
    Kind {
        Task => "task",
        Status => "status",
        Appointment => "appointment",
        Shoppinglist => "shoppinglist",
        Inventorylist => "inventorylist",
    }
}

/// Urgency level. Closed set of ten-point steps, mirroring the host's
/// existing notification-severity scale.
///
/// Serializes/deserializes as its plain integer (`0`, `10`, …), not the
/// variant name — the wire format is the numeric scale, and a numeric
/// string (`"10"`) is rejected exactly like any other non-integer (§4.1,
/// §8: `level = "10"` rejected on add).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    L0 = 0,
    L10 = 10,
    L20 = 20,
    L30 = 30,
    L40 = 40,
    L50 = 50,
}

impl Level {
    pub const ALL: [Level; 6] = [Level::L0, Level::L10, Level::L20, Level::L30, Level::L40, Level::L50];

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Rejects any integer outside the closed `{0,10,20,30,40,50}` set.
impl TryFrom<i64> for Level {
    type Error = InvalidEnumValue;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Level::L0),
            10 => Ok(Level::L10),
            20 => Ok(Level::L20),
            30 => Ok(Level::L30),
            40 => Ok(Level::L40),
            50 => Ok(Level::L50),
            other => Err(InvalidEnumValue { field: "level", value: other.to_string() }),
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl Serialize for Level {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        Level::try_from(value).map_err(serde::de::Error::custom)
    }
}

/// Lifecycle state of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Open,
    Acked,
    Snoozed,
    Closed,
    Deleted,
    Expired,
}

crate::simple_display! {
    LifecycleState {
        Open => "open",
        Acked => "acked",
        Snoozed => "snoozed",
        Closed => "closed",
        Deleted => "deleted",
        Expired => "expired",
    }
}

impl LifecycleState {
    /// `{closed, deleted, expired}` — invisible to default queries, but
    /// still occupying the canonical list until hard-delete retention.
    pub fn is_quasi_deleted(self) -> bool {
        matches!(self, LifecycleState::Closed | LifecycleState::Deleted | LifecycleState::Expired)
    }

    /// `{deleted, expired}` — eligible for hard-delete retention sweeps.
    pub fn is_retained_quasi_deleted(self) -> bool {
        matches!(self, LifecycleState::Deleted | LifecycleState::Expired)
    }

    /// Hidden from `query_messages({})` unless explicitly requested.
    pub fn is_hidden_by_default(self) -> bool {
        matches!(self, LifecycleState::Deleted | LifecycleState::Expired)
    }
}

/// Who/what produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginType {
    Manual,
    Import,
    Automation,
}

crate::simple_display! {
    OriginType {
        Manual => "manual",
        Import => "import",
        Automation => "automation",
    }
}

/// An operation a message's `actions` allowlist may permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Ack,
    Close,
    Delete,
    Snooze,
    Open,
    Link,
    Custom,
}

crate::simple_display! {
    ActionType {
        Ack => "ack",
        Close => "close",
        Delete => "delete",
        Snooze => "snooze",
        Open => "open",
        Link => "link",
        Custom => "custom",
    }
}

/// The closed set of events the Notify dispatcher fans out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationEvent {
    Added,
    Recreated,
    Recovered,
    Updated,
    Due,
    Deleted,
    Expired,
}

crate::simple_display! {
    NotificationEvent {
        Added => "added",
        Recreated => "recreated",
        Recovered => "recovered",
        Updated => "updated",
        Due => "due",
        Deleted => "deleted",
        Expired => "expired",
    }
}

impl NotificationEvent {
    pub const ALL: [NotificationEvent; 7] = [
        NotificationEvent::Added,
        NotificationEvent::Recreated,
        NotificationEvent::Recovered,
        NotificationEvent::Updated,
        NotificationEvent::Due,
        NotificationEvent::Deleted,
        NotificationEvent::Expired,
    ];
}

/// Kind of an attachment payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentType {
    Ssml,
    Image,
    Video,
    File,
}

crate::simple_display! {
    AttachmentType {
        Ssml => "ssml",
        Image => "image",
        Video => "video",
        File => "file",
    }
}

/// A rejected attempt to parse a closed enum value (used by the factory when
/// normalizing untyped/JSON input into the strict schema).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {field}: {value:?}")]
pub struct InvalidEnumValue {
    pub field: &'static str,
    pub value: String,
}

/// The full closed constants set, as returned by `admin.constants.get`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    pub kinds: Vec<Kind>,
    pub levels: Vec<Level>,
    pub lifecycle_states: Vec<LifecycleState>,
    pub origin_types: Vec<OriginType>,
    pub action_types: Vec<ActionType>,
    pub notification_events: Vec<NotificationEvent>,
    pub attachment_types: Vec<AttachmentType>,
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            kinds: vec![
                Kind::Task,
                Kind::Status,
                Kind::Appointment,
                Kind::Shoppinglist,
                Kind::Inventorylist,
            ],
            levels: Level::ALL.to_vec(),
            lifecycle_states: vec![
                LifecycleState::Open,
                LifecycleState::Acked,
                LifecycleState::Snoozed,
                LifecycleState::Closed,
                LifecycleState::Deleted,
                LifecycleState::Expired,
            ],
            origin_types: vec![OriginType::Manual, OriginType::Import, OriginType::Automation],
            action_types: vec![
                ActionType::Ack,
                ActionType::Close,
                ActionType::Delete,
                ActionType::Snooze,
                ActionType::Open,
                ActionType::Link,
                ActionType::Custom,
            ],
            notification_events: NotificationEvent::ALL.to_vec(),
            attachment_types: vec![
                AttachmentType::Ssml,
                AttachmentType::Image,
                AttachmentType::Video,
                AttachmentType::File,
            ],
        }
    }
}

#[cfg(test)]
#[path = "constants_tests.rs"]
mod tests;
