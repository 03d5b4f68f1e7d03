// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The canonical message entity (§3 of the message-hub schema) and its
//! structured sub-blocks.

use crate::constants::{ActionType, AttachmentType, Kind, Level, LifecycleState, NotificationEvent, OriginType};
use crate::refid::MsgRef;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where a message came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Origin {
    #[serde(rename = "type")]
    pub kind: OriginType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Origin {
    pub fn manual() -> Self {
        Self { kind: OriginType::Manual, system: None, id: None }
    }
}

/// Lifecycle state plus the bookkeeping the core manages on every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lifecycle {
    pub state: LifecycleState,
    pub state_changed_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_changed_by: Option<String>,
}

impl Lifecycle {
    pub fn open(now_ms: u64) -> Self {
        Self { state: LifecycleState::Open, state_changed_at: now_ms, state_changed_by: None }
    }
}

/// All millisecond-epoch timing fields, plus the per-event `notifiedAt` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remind_every: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<u64>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub notified_at: HashMap<NotificationEvent, u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_budget: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_at: Option<u64>,
}

impl Timing {
    /// Finite-reminder due check used by the due-poll loop (§4.8): a
    /// `notifyAt` that has arrived and isn't past `expiresAt`. The
    /// "no `notifyAt` at all" due case only applies at creation time and is
    /// handled separately by [`crate::lifecycle::is_immediately_due`].
    pub fn is_due(&self, now_ms: u64) -> bool {
        let not_expired = !matches!(self.expires_at, Some(exp) if exp <= now_ms);
        not_expired && matches!(self.notify_at, Some(at) if at <= now_ms)
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        matches!(self.expires_at, Some(exp) if exp < now_ms)
    }
}

/// Freeform structured detail block. Block-replaced on patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumables: Option<Vec<String>>,
}

/// Channel routing rules for a message's audience.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceChannels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
}

impl AudienceChannels {
    /// `*`/`all` always match; otherwise membership in the list.
    fn list_matches(list: &[String], channel: &str) -> bool {
        list.iter().any(|c| c == "*" || c.eq_ignore_ascii_case("all") || c == channel)
    }

    /// The audience-channel routing predicate shared by Notify (§4.5) and the
    /// query engine's `audience.channels.routeTo` filter (§4.9).
    pub fn routes_to(&self, plugin_channel: Option<&str>) -> bool {
        match plugin_channel {
            None => match &self.include {
                None => true,
                Some(inc) => inc.is_empty(),
            },
            Some(channel) => {
                if let Some(exclude) = &self.exclude {
                    if Self::list_matches(exclude, channel) {
                        return false;
                    }
                }
                match &self.include {
                    None => true,
                    Some(include) if include.is_empty() => true,
                    Some(include) => Self::list_matches(include, channel),
                }
            }
        }
    }
}

/// Freeform audience block. Block-replaced on patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audience {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<AudienceChannels>,
}

impl Audience {
    pub fn routes_to(&self, plugin_channel: Option<&str>) -> bool {
        match &self.channels {
            Some(channels) => channels.routes_to(plugin_channel),
            None => true,
        }
    }
}

/// A single metric sample: value, optional unit, and the timestamp it was
/// recorded at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    pub val: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub ts: u64,
}

/// An ordered key → [`MetricValue`] mapping, merged by key on patch.
///
/// Serializes via a tagged envelope (`{"__type":"Map","value":[[k,v],...]}`)
/// so a loader can tell a "metric map" apart from a plain options object —
/// the same reason the host distinguishes Map-typed fields elsewhere.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics(pub IndexMap<String, MetricValue>);

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge-by-key patch application: `None` in `patch` removes the key.
    pub fn merge(&mut self, patch: IndexMap<String, Option<MetricValue>>) {
        for (k, v) in patch {
            match v {
                Some(value) => {
                    self.0.insert(k, value);
                }
                None => {
                    self.0.shift_remove(&k);
                }
            }
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "__type", rename = "Map")]
struct MapEnvelope {
    value: Vec<(String, MetricValue)>,
}

impl Serialize for Metrics {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let value: Vec<(String, MetricValue)> =
            self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        MapEnvelope { value }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Metrics {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let envelope = MapEnvelope::deserialize(deserializer)?;
        Ok(Metrics(envelope.value.into_iter().collect()))
    }
}

/// An amount with an optional unit (used by `listItems[].quantity`/`perUnit`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    pub val: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A single shopping/inventory list entry, merged by `id` on patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_unit: Option<Amount>,
    #[serde(default)]
    pub checked: bool,
}

/// An operation this message's `actions` allowlist permits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionType,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

/// An attached media/SSML payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: AttachmentType,
    pub value: String,
}

/// Progress tracking: `startedAt`/`finishedAt` are core-managed (§4.1), never
/// set directly by a producer patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    #[serde(default)]
    pub percentage: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<u64>,
}

impl Progress {
    /// Apply the percentage-crossing rules from §4.1: `startedAt` is set once
    /// on 0→>0, `finishedAt` is set at 100 and cleared below 100.
    pub fn apply_percentage(&mut self, percentage: u8, now_ms: u64) {
        let was_zero = self.percentage == 0;
        self.percentage = percentage;
        if was_zero && percentage > 0 && self.started_at.is_none() {
            self.started_at = Some(now_ms);
        }
        if percentage >= 100 {
            self.finished_at = Some(now_ms);
        } else {
            self.finished_at = None;
        }
    }
}

/// The canonical message entity (§3). Never exposed mutably outside the
/// Store — callers always get an owned clone or a rendered view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "ref")]
    pub msg_ref: MsgRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub title: String,
    pub text: String,
    pub kind: Kind,
    pub level: Level,
    pub origin: Origin,
    pub lifecycle: Lifecycle,
    pub timing: Timing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Details>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<Audience>,
    #[serde(default, skip_serializing_if = "Metrics::is_empty")]
    pub metrics: Metrics,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub list_items: Vec<ListItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<MsgRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
}

impl Message {
    pub fn is_quasi_deleted(&self) -> bool {
        self.lifecycle.state.is_quasi_deleted()
    }

    /// The inverse of §4.1's icon cap — applied once at normalization time.
    pub const ICON_MAX_LEN: usize = 10;
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;

    crate::builder! {
        pub struct MessageBuilder => Message {
            into {
                msg_ref: MsgRef = MsgRef::new("test-ref"),
                title: String = "Test message",
                text: String = "body",
            }
            set {
                kind: Kind = Kind::Task,
                level: Level = Level::L10,
                origin: Origin = Origin::manual(),
                timing: Timing = Timing::default(),
                lifecycle: Lifecycle = Lifecycle::open(0),
                metrics: Metrics = Metrics::default(),
                attachments: Vec<Attachment> = Vec::new(),
                list_items: Vec<ListItem> = Vec::new(),
                actions: Vec<Action> = Vec::new(),
                dependencies: Vec<MsgRef> = Vec::new(),
            }
            option {
                icon: String = None,
                details: Details = None,
                audience: Audience = None,
                progress: Progress = None,
            }
        }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
