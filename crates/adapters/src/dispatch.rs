// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notify's per-plugin fan-out (§4.5): audience-channel routing and
//! quiet-hours gating layered on top of a [`NotifyAdapter`].

use crate::notify::NotifyAdapter;
use async_trait::async_trait;
use hub_core::{Level, Message, MsgRef, NotificationEvent};

/// A configured quiet-hours window, expressed as minute-of-day
/// (`0..1440`). Supports wrapping past midnight (`start > end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuietHours {
    pub start_minute: u16,
    pub end_minute: u16,
}

impl QuietHours {
    pub fn contains(&self, minute_of_day: u16) -> bool {
        if self.start_minute <= self.end_minute {
            (self.start_minute..self.end_minute).contains(&minute_of_day)
        } else {
            minute_of_day >= self.start_minute || minute_of_day < self.end_minute
        }
    }
}

/// A single registered Notify plugin: a channel identity, routing
/// participation, quiet-hours policy, and the underlying delivery adapter.
pub struct NotifyPlugin<A: NotifyAdapter> {
    pub id: String,
    pub channel: Option<String>,
    pub quiet_hours: Option<QuietHours>,
    pub quiet_hours_urgency_threshold: Level,
    pub adapter: A,
}

impl<A: NotifyAdapter> NotifyPlugin<A> {
    pub fn new(id: impl Into<String>, adapter: A) -> Self {
        Self {
            id: id.into(),
            channel: None,
            quiet_hours: None,
            quiet_hours_urgency_threshold: Level::L30,
            adapter,
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_quiet_hours(mut self, quiet_hours: QuietHours, urgency_threshold: Level) -> Self {
        self.quiet_hours = Some(quiet_hours);
        self.quiet_hours_urgency_threshold = urgency_threshold;
        self
    }

    fn eligible(&self, message: &Message, event: NotificationEvent, minute_of_day: u16) -> bool {
        let routed = message
            .audience
            .as_ref()
            .map(|a| a.routes_to(self.channel.as_deref()))
            .unwrap_or(true);
        if !routed {
            return false;
        }
        let always_delivers = matches!(
            event,
            NotificationEvent::Added | NotificationEvent::Deleted | NotificationEvent::Expired
        );
        if always_delivers {
            return true;
        }
        match self.quiet_hours {
            Some(quiet_hours) if quiet_hours.contains(minute_of_day) => {
                message.level > self.quiet_hours_urgency_threshold
            }
            _ => true,
        }
    }

    /// Deliver `event` for every message this plugin is eligible to see.
    /// Returns the refs actually delivered, so the caller can bump
    /// `notifiedAt[event]` only for those.
    pub async fn dispatch(
        &self,
        event: NotificationEvent,
        messages: &[Message],
        minute_of_day: u16,
    ) -> Vec<MsgRef> {
        let mut delivered = Vec::new();
        for message in messages {
            if !self.eligible(message, event, minute_of_day) {
                continue;
            }
            match self.adapter.notify(&message.title, &message.text).await {
                Ok(()) => delivered.push(message.msg_ref.clone()),
                Err(err) => {
                    tracing::warn!(plugin = %self.id, ref_ = %message.msg_ref, error = %err, "notify plugin failed");
                }
            }
        }
        delivered
    }
}

/// Type-erased form of [`NotifyPlugin`] so a dispatcher can hold a
/// heterogeneous set of adapters.
#[async_trait]
pub trait DynNotifyPlugin: Send + Sync {
    fn id(&self) -> &str;
    async fn dispatch(
        &self,
        event: NotificationEvent,
        messages: &[Message],
        minute_of_day: u16,
    ) -> Vec<MsgRef>;
}

#[async_trait]
impl<A: NotifyAdapter> DynNotifyPlugin for NotifyPlugin<A> {
    fn id(&self) -> &str {
        &self.id
    }

    async fn dispatch(
        &self,
        event: NotificationEvent,
        messages: &[Message],
        minute_of_day: u16,
    ) -> Vec<MsgRef> {
        NotifyPlugin::dispatch(self, event, messages, minute_of_day).await
    }
}

/// Fans a batch out to every registered plugin. Per-plugin failures are
/// already swallowed inside `dispatch`; this only aggregates which refs
/// were delivered by at least one plugin, for the `notifiedAt` bump.
pub async fn dispatch_all(
    plugins: &[std::sync::Arc<dyn DynNotifyPlugin>],
    event: NotificationEvent,
    messages: &[Message],
    minute_of_day: u16,
) -> std::collections::HashSet<MsgRef> {
    let mut delivered = std::collections::HashSet::new();
    for plugin in plugins {
        for r in plugin.dispatch(event, messages, minute_of_day).await {
            delivered.insert(r);
        }
    }
    delivered
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
