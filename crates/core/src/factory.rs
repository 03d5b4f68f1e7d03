// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation and patch-application for the canonical [`Message`] shape.
//!
//! Rust's type system already closes most of the enum/integer validation the
//! original schema needed (an `i64` `level` can't arrive as a numeric
//! string, a `Kind` can't arrive unknown) — what's left for this module is
//! the normalization, required-field, and merge-semantics rules that aren't
//! expressible in the types alone.

use crate::clock::Clock;
use crate::constants::Level;
use crate::message::{
    Action, Attachment, Audience, Details, Lifecycle, ListItem, Message, MetricValue, Metrics,
    Origin, Progress, Timing,
};
use crate::refid::MsgRef;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// A patch field that distinguishes "omitted" from "explicitly null" from
/// "set to a value" — block-replace and single-field merge semantics both
/// need the middle case to mean "clear this field".
pub type PatchField<T> = Option<Option<T>>;

fn deserialize_patch_field<'de, D, T>(deserializer: D) -> Result<PatchField<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

mod patch_field {
    pub use super::deserialize_patch_field as deserialize;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ref must not be empty")]
    EmptyRef,
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("text must not be empty")]
    EmptyText,
    #[error("percentage must be in 0..=100, got {0}")]
    PercentageOutOfRange(u8),
}

/// Input to [`create_message`]. Mirrors [`Message`]'s producer-settable
/// fields; lifecycle and the core-managed timestamps are computed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInput {
    #[serde(rename = "ref")]
    pub msg_ref: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub title: String,
    pub text: String,
    pub kind: crate::constants::Kind,
    pub level: Level,
    pub origin: Origin,
    #[serde(default)]
    pub details: Option<Details>,
    #[serde(default)]
    pub audience: Option<Audience>,
    #[serde(default)]
    pub timing: TimingInput,
    #[serde(default)]
    pub metrics: IndexMap<String, MetricValue>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub list_items: Vec<ListItem>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub dependencies: Vec<MsgRef>,
    #[serde(default)]
    pub progress_percentage: Option<u8>,
}

impl Default for CreateInput {
    fn default() -> Self {
        Self {
            msg_ref: String::new(),
            icon: None,
            title: String::new(),
            text: String::new(),
            kind: crate::constants::Kind::Task,
            level: Level::L0,
            origin: Origin::manual(),
            details: None,
            audience: None,
            timing: TimingInput::default(),
            metrics: IndexMap::new(),
            attachments: Vec::new(),
            list_items: Vec::new(),
            actions: Vec::new(),
            dependencies: Vec::new(),
            progress_percentage: None,
        }
    }
}

/// The producer-settable subset of [`Timing`] (`createdAt`/`updatedAt` are
/// core-managed).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingInput {
    #[serde(default)]
    pub notify_at: Option<u64>,
    #[serde(default)]
    pub remind_every: Option<u64>,
    #[serde(default)]
    pub cooldown: Option<u64>,
    #[serde(default)]
    pub time_budget: Option<u64>,
    #[serde(default)]
    pub expires_at: Option<u64>,
    #[serde(default)]
    pub due_at: Option<u64>,
    #[serde(default)]
    pub start_at: Option<u64>,
    #[serde(default)]
    pub end_at: Option<u64>,
}

/// A producer patch. Every field's *presence* in the source JSON is
/// significant: omitted means "no change", `null` means "clear", a value
/// means "set" — see [`PatchField`]. Serialized the same way so the archive
/// can record and replay a patch event verbatim (§4.3, §8).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "patch_field::deserialize")]
    pub icon: PatchField<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "patch_field::deserialize")]
    pub title: PatchField<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "patch_field::deserialize")]
    pub text: PatchField<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "patch_field::deserialize")]
    pub details: PatchField<Details>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "patch_field::deserialize")]
    pub audience: PatchField<Audience>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "patch_field::deserialize")]
    pub origin: PatchField<Origin>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "patch_field::deserialize")]
    pub progress_percentage: PatchField<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "patch_field::deserialize")]
    pub lifecycle_state: PatchField<crate::constants::LifecycleState>,
    #[serde(default)]
    pub metrics: IndexMap<String, Option<MetricValue>>,
    #[serde(default)]
    pub list_items: IndexMap<String, Option<ListItem>>,
    #[serde(default)]
    pub timing: TimingPatch,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "patch_field::deserialize")]
    pub dependencies: PatchField<Vec<MsgRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "patch_field::deserialize")]
    pub attachments: PatchField<Vec<Attachment>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "patch_field::deserialize")]
    pub actions: PatchField<Vec<Action>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingPatch {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "patch_field::deserialize")]
    pub notify_at: PatchField<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "patch_field::deserialize")]
    pub remind_every: PatchField<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "patch_field::deserialize")]
    pub cooldown: PatchField<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "patch_field::deserialize")]
    pub time_budget: PatchField<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "patch_field::deserialize")]
    pub expires_at: PatchField<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "patch_field::deserialize")]
    pub due_at: PatchField<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "patch_field::deserialize")]
    pub start_at: PatchField<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "patch_field::deserialize")]
    pub end_at: PatchField<u64>,
}

fn apply_field(field: &mut Timing, patch: TimingPatch) {
    macro_rules! apply {
        ($name:ident) => {
            if let Some(v) = patch.$name {
                field.$name = v;
            }
        };
    }
    apply!(notify_at);
    apply!(remind_every);
    apply!(cooldown);
    apply!(time_budget);
    apply!(expires_at);
    apply!(due_at);
    apply!(start_at);
    apply!(end_at);
}

/// Trim leading/trailing whitespace and cap to [`Message::ICON_MAX_LEN`]
/// characters.
fn normalize_icon(icon: String) -> String {
    let trimmed = icon.trim();
    match trimmed.char_indices().nth(Message::ICON_MAX_LEN) {
        Some((byte_idx, _)) => trimmed[..byte_idx].to_string(),
        None => trimmed.to_string(),
    }
}

/// `createMessage(input) → normalized|null` (§4.1). Rejection is a
/// `ValidationError`, never a panic.
pub fn create_message(
    input: CreateInput,
    clock: &impl Clock,
) -> Result<Message, ValidationError> {
    let msg_ref = input.msg_ref.trim();
    if msg_ref.is_empty() {
        return Err(ValidationError::EmptyRef);
    }
    let title = input.title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    let text = input.text.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyText);
    }
    let percentage = input.progress_percentage.unwrap_or(0);
    if percentage > 100 {
        return Err(ValidationError::PercentageOutOfRange(percentage));
    }

    let now = clock.epoch_ms();
    let mut progress = None;
    if input.progress_percentage.is_some() {
        let mut p = Progress::default();
        p.apply_percentage(percentage, now);
        progress = Some(p);
    }

    Ok(Message {
        msg_ref: MsgRef::new(msg_ref),
        icon: input.icon.map(normalize_icon).filter(|s| !s.is_empty()),
        title: title.to_string(),
        text: text.to_string(),
        kind: input.kind,
        level: input.level,
        origin: input.origin,
        lifecycle: Lifecycle::open(now),
        timing: Timing {
            created_at: now,
            updated_at: None,
            notify_at: input.timing.notify_at,
            remind_every: input.timing.remind_every,
            cooldown: input.timing.cooldown,
            notified_at: Default::default(),
            time_budget: input.timing.time_budget,
            expires_at: input.timing.expires_at,
            due_at: input.timing.due_at,
            start_at: input.timing.start_at,
            end_at: input.timing.end_at,
        },
        details: input.details,
        audience: input.audience,
        metrics: Metrics(input.metrics),
        attachments: input.attachments,
        list_items: input.list_items,
        actions: input.actions,
        dependencies: input.dependencies,
        progress,
    })
}

/// `applyPatch(existing, patch, stealth) → normalized|null` (§4.1).
///
/// Returns a new [`Message`]; the caller (`Store::update_message`) decides
/// whether the result actually differs and whether to dispatch events.
pub fn apply_patch(
    existing: &Message,
    patch: Patch,
    stealth: bool,
    clock: &impl Clock,
) -> Result<Message, ValidationError> {
    let mut msg = existing.clone();
    let now = clock.epoch_ms();

    if let Some(title) = patch.title {
        let title = title.unwrap_or_default();
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        msg.title = trimmed.to_string();
    }
    if let Some(text) = patch.text {
        let text = text.unwrap_or_default();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        msg.text = trimmed.to_string();
    }
    if let Some(icon) = patch.icon {
        msg.icon = icon.map(normalize_icon).filter(|s| !s.is_empty());
    }
    if let Some(details) = patch.details {
        msg.details = details;
    }
    if let Some(audience) = patch.audience {
        msg.audience = audience;
    }
    if let Some(origin) = patch.origin {
        msg.origin = origin.unwrap_or_else(Origin::manual);
    }
    if let Some(dependencies) = patch.dependencies {
        msg.dependencies = dependencies.unwrap_or_default();
    }
    if let Some(attachments) = patch.attachments {
        msg.attachments = attachments.unwrap_or_default();
    }
    if let Some(actions) = patch.actions {
        msg.actions = actions.unwrap_or_default();
    }

    for (key, value) in patch.metrics {
        match value {
            Some(v) => {
                msg.metrics.0.insert(key, v);
            }
            None => {
                msg.metrics.0.shift_remove(&key);
            }
        }
    }

    for (id, value) in patch.list_items {
        match value {
            Some(mut item) => {
                item.id = id.clone();
                if let Some(existing_idx) = msg.list_items.iter().position(|i| i.id == id) {
                    msg.list_items[existing_idx] = item;
                } else {
                    msg.list_items.push(item);
                }
            }
            None => {
                msg.list_items.retain(|i| i.id != id);
            }
        }
    }

    apply_field(&mut msg.timing, patch.timing);

    if let Some(state) = patch.lifecycle_state {
        if let Some(state) = state {
            if state != msg.lifecycle.state {
                msg.lifecycle.state = state;
                msg.lifecycle.state_changed_at = now;
            }
        }
    }

    if let Some(percentage) = patch.progress_percentage {
        let percentage = percentage.unwrap_or(0);
        if percentage > 100 {
            return Err(ValidationError::PercentageOutOfRange(percentage));
        }
        let mut progress = msg.progress.take().unwrap_or_default();
        progress.apply_percentage(percentage, now);
        msg.progress = Some(progress);
    }

    if !stealth {
        msg.timing.updated_at = Some(now);
    }

    Ok(msg)
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
