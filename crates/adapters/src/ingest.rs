// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ingest: the host façade producer plugins run against (§4.6).
//!
//! A plugin only ever touches the resources handed to it through
//! [`IngestContext`] — scoped timers, an options resolver, a managed-objects
//! reporter, the closed constant sets, and a [`MutationSink`] onto the Store —
//! so `stop` can cancel everything the plugin registered without the plugin
//! cooperating. [`IngestHost`] also routes `stateChange`/`objectChange`
//! events to whichever plugins subscribed to the external id they concern
//! (§4.6); a plugin subscribes by calling [`SubscriptionRegistry::subscribe`]
//! on its context during `start`.
//!
//! [`MutationSink`] exists so this crate never depends on `hub-engine`
//! directly — `hub-engine::Store` already depends on this crate for
//! [`crate::dispatch::DynNotifyPlugin`], so a direct `hub-adapters -> Store`
//! dependency would be circular. `Store` implements `MutationSink` instead.

use async_trait::async_trait;
use hub_core::{Constants, CreateInput, HubError, Message, MsgRef, NotificationEvent, Patch};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// The Store mutations a producer is allowed to drive (§4.6, §6). Defined
/// here rather than taken as `hub_engine::Store` directly to avoid a
/// circular crate dependency; `hub-engine::Store` implements this trait.
#[async_trait]
pub trait MutationSink: Send + Sync {
    async fn add_message(&self, input: CreateInput) -> Result<Message, HubError>;
    async fn update_message(&self, msg_ref: &MsgRef, patch: Patch, stealth: bool) -> Result<Message, HubError>;
    async fn add_or_update_message(&self, input: CreateInput) -> Result<Message, HubError>;
    async fn remove_message(&self, msg_ref: &MsgRef) -> Result<Message, HubError>;
    async fn get_message_by_ref(&self, msg_ref: &MsgRef, include_hidden: bool) -> Option<Message>;
    async fn get_messages(&self) -> Vec<Message>;
}

/// Which plugins get a given external state/object id's change events
/// (§4.6). A plugin subscribes during its own `start`.
pub trait SubscriptionRegistry: Send + Sync {
    fn subscribe(&self, external_id: &str, plugin_id: &str);
    fn unsubscribe(&self, external_id: &str, plugin_id: &str);
    fn subscribers_of(&self, external_id: &str) -> Vec<String>;
}

#[derive(Default)]
pub struct SubscriptionStore {
    subscribers: Mutex<HashMap<String, Vec<String>>>,
}

impl SubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubscriptionRegistry for SubscriptionStore {
    fn subscribe(&self, external_id: &str, plugin_id: &str) {
        let mut subscribers = self.subscribers.lock();
        let ids = subscribers.entry(external_id.to_string()).or_default();
        if !ids.iter().any(|id| id == plugin_id) {
            ids.push(plugin_id.to_string());
        }
    }

    fn unsubscribe(&self, external_id: &str, plugin_id: &str) {
        if let Some(ids) = self.subscribers.lock().get_mut(external_id) {
            ids.retain(|id| id != plugin_id);
        }
    }

    fn subscribers_of(&self, external_id: &str) -> Vec<String> {
        self.subscribers.lock().get(external_id).cloned().unwrap_or_default()
    }
}

/// Contract producer plugins implement (§4.6).
#[async_trait]
pub trait IngestPlugin: Send + Sync {
    fn id(&self) -> &str;
    async fn start(&self, ctx: &IngestContext);
    async fn stop(&self, ctx: &IngestContext, reason: &str);
    async fn on_state_change(&self, _id: &str, _state: &Value, _ctx: &IngestContext) {}
    async fn on_object_change(&self, _id: &str, _obj: &Value, _ctx: &IngestContext) {}
    async fn on_timer(&self, _timer_id: &str, _ctx: &IngestContext) {}
    async fn on_notifications(&self, _event: NotificationEvent, _messages: &[Message]) {}
    async fn on_action(&self, _message_ref: &MsgRef, _action_id: &str, _ctx: &IngestContext) {}
}

struct TimerHandle {
    cancel: Arc<AtomicBool>,
    task: tokio::task::JoinHandle<()>,
}

impl TimerHandle {
    fn cancel(self) {
        self.cancel.store(true, Ordering::SeqCst);
        self.task.abort();
    }
}

/// Scoped timer registry: every timer a plugin creates is tracked under its
/// own id and torn down on [`ScopedTimers::clear_all`] (called by the host
/// on plugin `stop`). A timer whose callback fires after cancellation is a
/// no-op — the cancel flag is checked inside the spawned task, not just at
/// abort time, since `JoinHandle::abort` only takes effect at the next
/// await point.
#[derive(Default)]
pub struct ScopedTimers {
    timers: Mutex<HashMap<String, TimerHandle>>,
}

impl ScopedTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_timeout<F>(&self, id: impl Into<String>, delay: Duration, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let id = id.into();
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_inner = cancel.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !cancel_inner.load(Ordering::SeqCst) {
                callback();
            }
        });
        self.timers.lock().insert(id, TimerHandle { cancel, task });
    }

    pub fn set_interval<F>(&self, id: impl Into<String>, period: Duration, mut callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        let id = id.into();
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_inner = cancel.clone();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if cancel_inner.load(Ordering::SeqCst) {
                    break;
                }
                callback();
            }
        });
        self.timers.lock().insert(id, TimerHandle { cancel, task });
    }

    pub fn clear_timeout(&self, id: &str) {
        if let Some(handle) = self.timers.lock().remove(id) {
            handle.cancel();
        }
    }

    pub fn clear_interval(&self, id: &str) {
        self.clear_timeout(id);
    }

    pub fn clear_all(&self) {
        for (_, handle) in self.timers.lock().drain() {
            handle.cancel();
        }
    }

    pub fn active_count(&self) -> usize {
        self.timers.lock().len()
    }
}

/// Plugin-config-backed option lookup (`resolve_string/int/bool`).
pub trait OptionsResolver: Send + Sync {
    fn resolve_string(&self, key: &str, default: &str) -> String;
    fn resolve_int(&self, key: &str, default: i64) -> i64;
    fn resolve_bool(&self, key: &str, default: bool) -> bool;
}

/// An `OptionsResolver` backed by a flat JSON object, as loaded from a
/// plugin instance's config.
#[derive(Debug, Clone, Default)]
pub struct MapOptionsResolver(pub HashMap<String, Value>);

impl OptionsResolver for MapOptionsResolver {
    fn resolve_string(&self, key: &str, default: &str) -> String {
        self.0.get(key).and_then(Value::as_str).map(str::to_string).unwrap_or_else(|| default.to_string())
    }

    fn resolve_int(&self, key: &str, default: i64) -> i64 {
        self.0.get(key).and_then(Value::as_i64).unwrap_or(default)
    }

    fn resolve_bool(&self, key: &str, default: bool) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(default)
    }
}

/// Tracks which external state ids are "managed by" which plugin, so two
/// producers don't fight over the same id.
pub trait ManagedObjectsReporter: Send + Sync {
    fn mark_managed(&self, object_id: &str, plugin_id: &str);
    fn unmark_managed(&self, object_id: &str, plugin_id: &str);
    fn managed_by(&self, object_id: &str) -> Option<String>;
}

#[derive(Default)]
pub struct ManagedObjectStore {
    owners: Mutex<HashMap<String, String>>,
}

impl ManagedObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ManagedObjectsReporter for ManagedObjectStore {
    fn mark_managed(&self, object_id: &str, plugin_id: &str) {
        self.owners.lock().insert(object_id.to_string(), plugin_id.to_string());
    }

    fn unmark_managed(&self, object_id: &str, plugin_id: &str) {
        let mut owners = self.owners.lock();
        if owners.get(object_id).map(String::as_str) == Some(plugin_id) {
            owners.remove(object_id);
        }
    }

    fn managed_by(&self, object_id: &str) -> Option<String> {
        self.owners.lock().get(object_id).cloned()
    }
}

/// The shared resource façade handed to every running plugin.
pub struct IngestContext {
    pub timers: Arc<ScopedTimers>,
    pub options: Arc<dyn OptionsResolver>,
    pub managed_objects: Arc<dyn ManagedObjectsReporter>,
    pub subscriptions: Arc<dyn SubscriptionRegistry>,
    pub store: Arc<dyn MutationSink>,
    pub constants: Arc<Constants>,
}

impl IngestContext {
    pub fn new(
        options: Arc<dyn OptionsResolver>,
        managed_objects: Arc<dyn ManagedObjectsReporter>,
        subscriptions: Arc<dyn SubscriptionRegistry>,
        store: Arc<dyn MutationSink>,
        constants: Arc<Constants>,
    ) -> Self {
        Self { timers: Arc::new(ScopedTimers::new()), options, managed_objects, subscriptions, store, constants }
    }
}

/// Starts and stops [`IngestPlugin`]s, giving each its own [`IngestContext`]
/// and tearing down its scoped timers on stop. Owns the subscription
/// registry and the `store`/`constants` handles shared across every plugin,
/// and routes `stateChange`/`objectChange` events to subscribers (§4.6).
pub struct IngestHost {
    contexts: Mutex<HashMap<String, Arc<IngestContext>>>,
    plugins: Mutex<HashMap<String, Arc<dyn IngestPlugin>>>,
    subscriptions: Arc<SubscriptionStore>,
    store: Arc<dyn MutationSink>,
    constants: Arc<Constants>,
}

impl IngestHost {
    pub fn new(store: Arc<dyn MutationSink>) -> Self {
        Self {
            contexts: Mutex::new(HashMap::new()),
            plugins: Mutex::new(HashMap::new()),
            subscriptions: Arc::new(SubscriptionStore::new()),
            store,
            constants: Arc::new(Constants::default()),
        }
    }

    pub async fn start(
        &self,
        plugin: Arc<dyn IngestPlugin>,
        options: Arc<dyn OptionsResolver>,
        managed_objects: Arc<dyn ManagedObjectsReporter>,
    ) {
        let ctx = Arc::new(IngestContext::new(
            options,
            managed_objects,
            Arc::clone(&self.subscriptions) as Arc<dyn SubscriptionRegistry>,
            Arc::clone(&self.store),
            Arc::clone(&self.constants),
        ));
        plugin.start(&ctx).await;
        let id = plugin.id().to_string();
        self.contexts.lock().insert(id.clone(), ctx);
        self.plugins.lock().insert(id, plugin);
    }

    pub async fn stop(&self, plugin_id: &str, reason: &str) {
        let ctx = self.contexts.lock().remove(plugin_id);
        let plugin = self.plugins.lock().remove(plugin_id);
        if let (Some(ctx), Some(plugin)) = (ctx, plugin) {
            plugin.stop(&ctx, reason).await;
            ctx.timers.clear_all();
        }
    }

    /// Route a `stateChange(id, state)` event (§4.6) to every plugin
    /// subscribed to `id`.
    pub async fn route_state_change(&self, id: &str, state: &Value) {
        for (plugin, ctx) in self.subscribed_plugins(id) {
            plugin.on_state_change(id, state, &ctx).await;
        }
    }

    /// Route an `objectChange(id, obj)` event (§4.6) to every plugin
    /// subscribed to `id`.
    pub async fn route_object_change(&self, id: &str, obj: &Value) {
        for (plugin, ctx) in self.subscribed_plugins(id) {
            plugin.on_object_change(id, obj, &ctx).await;
        }
    }

    fn subscribed_plugins(&self, id: &str) -> Vec<(Arc<dyn IngestPlugin>, Arc<IngestContext>)> {
        let plugins = self.plugins.lock();
        let contexts = self.contexts.lock();
        self.subscriptions
            .subscribers_of(id)
            .into_iter()
            .filter_map(|plugin_id| Some((plugins.get(&plugin_id)?.clone(), contexts.get(&plugin_id)?.clone())))
            .collect()
    }
}

#[cfg(test)]
#[path = "ingest_tests.rs"]
mod tests;
