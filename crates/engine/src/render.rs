// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Renderer: a pure function from canonical message to display view (§4.4).
//!
//! Expands `{{m.<metricKey>[.unit|.val|.ts]}}` and `{{t.<timingField>|filter}}`
//! placeholders embedded in `title`/`text` against the message's own
//! `metrics`/`timing` blocks, and computes the view-only `display`/
//! `actionsInactive` fields (§3). Never mutates the input; used only on read.

use chrono::{TimeZone, Utc};
use hub_core::{Action, ActionType, LifecycleState, Message};
use serde::{Deserialize, Serialize};

/// The view-only `display` block (§3): `icon`/`title`/`text` with template
/// placeholders expanded, plus the timestamp of the freshest metric that fed
/// into them (if any).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Display {
    pub icon: String,
    pub title: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered_data_ts: Option<u64>,
}

/// A rendered view of a [`Message`]: the canonical fields, flattened,
/// alongside the view-only `display` and `actionsInactive` blocks. Safe for
/// a caller to mutate freely — it holds no reference back into the Store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedMessage {
    #[serde(flatten)]
    pub message: Message,
    pub display: Display,
    #[serde(rename = "actionsInactive", default, skip_serializing_if = "Vec::is_empty")]
    pub actions_inactive: Vec<Action>,
}

/// Actions whose effect is already the message's current lifecycle state, or
/// that the state makes meaningless (§3: "hide `snooze` when already
/// snoozed"). `open`/`link`/`custom` are never lifecycle transitions, so
/// they're never auto-hidden here.
fn inactive_action_types(state: LifecycleState) -> &'static [ActionType] {
    use ActionType::{Ack, Close, Delete, Snooze};
    match state {
        LifecycleState::Open => &[],
        LifecycleState::Acked => &[Ack],
        LifecycleState::Snoozed => &[Ack, Snooze],
        LifecycleState::Closed => &[Ack, Close, Snooze],
        LifecycleState::Deleted | LifecycleState::Expired => &[Ack, Close, Snooze, Delete],
    }
}

fn actions_inactive_for(message: &Message) -> Vec<Action> {
    let inactive = inactive_action_types(message.lifecycle.state);
    message.actions.iter().filter(|a| inactive.contains(&a.kind)).cloned().collect()
}

/// Render a single message for a given locale. `locale` is threaded through
/// for filters (`datetime`) that are locale-sensitive in the host; this
/// implementation's `datetime` filter is locale-invariant (RFC 3339) since
/// the actual locale dictionary is an external collaborator (§6).
pub fn render(message: &Message, now_ms: u64, locale: &str) -> RenderedMessage {
    let title = expand_template(&message.title, message, now_ms, locale);
    let text = expand_template(&message.text, message, now_ms, locale);
    let rendered_data_ts = message.metrics.0.values().map(|m| m.ts).max();
    let display = Display { icon: message.icon.clone().unwrap_or_default(), title, text, rendered_data_ts };
    let actions_inactive = actions_inactive_for(message);
    RenderedMessage { message: message.clone(), display, actions_inactive }
}

pub fn render_all<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
    now_ms: u64,
    locale: &str,
) -> Vec<RenderedMessage> {
    messages.into_iter().map(|m| render(m, now_ms, locale)).collect()
}

/// Scans `input` for `{{...}}` placeholders and expands each in turn,
/// leaving anything that doesn't parse as a recognized placeholder intact
/// (a template typo should degrade gracefully, not panic or vanish).
fn expand_template(input: &str, message: &Message, now_ms: u64, locale: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        match after_open.find("}}") {
            Some(end) => {
                let expr = after_open[..end].trim();
                match resolve_placeholder(expr, message, now_ms, locale) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push_str("{{");
                        out.push_str(expr);
                        out.push_str("}}");
                    }
                }
                rest = &after_open[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after_open;
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve_placeholder(expr: &str, message: &Message, now_ms: u64, locale: &str) -> Option<String> {
    let (path, filter) = match expr.split_once('|') {
        Some((p, f)) => (p.trim(), Some(f.trim())),
        None => (expr, None),
    };
    let mut parts = path.splitn(2, '.');
    match parts.next()? {
        "m" => render_metric(parts.next()?, message),
        "t" => render_timing(parts.next()?, message, filter, now_ms, locale),
        _ => None,
    }
}

fn render_metric(rest: &str, message: &Message) -> Option<String> {
    let (key, suffix) = match rest.rsplit_once('.') {
        Some((key, suffix @ ("unit" | "val" | "ts"))) => (key, suffix),
        _ => (rest, "val"),
    };
    let metric = message.metrics.0.get(key)?;
    Some(match suffix {
        "unit" => metric.unit.clone().unwrap_or_default(),
        "ts" => metric.ts.to_string(),
        _ => format_number(metric.val),
    })
}

fn render_timing(field: &str, message: &Message, filter: Option<&str>, now_ms: u64, locale: &str) -> Option<String> {
    let value: Option<u64> = match field {
        "createdAt" => Some(message.timing.created_at),
        "updatedAt" => message.timing.updated_at,
        "expiresAt" => message.timing.expires_at,
        "notifyAt" => message.timing.notify_at,
        "remindEvery" => message.timing.remind_every,
        "dueAt" => message.timing.due_at,
        "startAt" => message.timing.start_at,
        "endAt" => message.timing.end_at,
        _ => return None,
    };

    match filter {
        Some(f) if f.starts_with("bool:") => {
            let (when_true, when_false) = f.strip_prefix("bool:")?.split_once('/').unwrap_or((f, ""));
            Some(if value.is_some() { when_true.to_string() } else { when_false.to_string() })
        }
        Some("datetime") => value.map(|ms| format_datetime(ms, locale)),
        Some("durationSince") => value.map(|ms| format_duration_since(ms, now_ms)),
        Some(_) | None => value.map(|ms| ms.to_string()),
    }
}

fn format_number(val: f64) -> String {
    if val.fract() == 0.0 && val.is_finite() {
        format!("{val:.0}")
    } else {
        val.to_string()
    }
}

/// RFC 3339 rendering. The actual locale-sensitive formatting dictionary is
/// an external collaborator (§6); `locale` is accepted but currently only
/// distinguishes nothing beyond the invariant RFC 3339 string.
fn format_datetime(epoch_ms: u64, _locale: &str) -> String {
    Utc.timestamp_millis_opt(epoch_ms as i64)
        .single()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

fn format_duration_since(epoch_ms: u64, now_ms: u64) -> String {
    let delta_ms = now_ms as i64 - epoch_ms as i64;
    let seconds = delta_ms.abs() / 1000;
    let (value, unit) = if seconds < 60 {
        (seconds, "s")
    } else if seconds < 3600 {
        (seconds / 60, "m")
    } else if seconds < 86_400 {
        (seconds / 3600, "h")
    } else {
        (seconds / 86_400, "d")
    };
    if delta_ms >= 0 {
        format!("{value}{unit} ago")
    } else {
        format!("in {value}{unit}")
    }
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
