// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hub_core::{apply_patch, create_message, FakeClock, ValidationError};
use std::sync::atomic::AtomicUsize;
use std::time::Duration;

/// A minimal in-memory [`MutationSink`] for exercising [`IngestHost`]
/// without pulling in `hub-engine::Store` (would be a circular dev-dependency).
#[derive(Default)]
struct FakeMutationSink {
    clock: FakeClock,
    table: Mutex<HashMap<MsgRef, Message>>,
}

#[async_trait]
impl MutationSink for FakeMutationSink {
    async fn add_message(&self, input: CreateInput) -> Result<Message, HubError> {
        let msg_ref = MsgRef::new(input.msg_ref.trim());
        let message = create_message(input, &self.clock)?;
        self.table.lock().insert(msg_ref, message.clone());
        Ok(message)
    }

    async fn update_message(&self, msg_ref: &MsgRef, patch: Patch, stealth: bool) -> Result<Message, HubError> {
        let before = self.table.lock().get(msg_ref).cloned().ok_or_else(|| HubError::NotFound(msg_ref.clone()))?;
        let after = apply_patch(&before, patch, stealth, &self.clock)?;
        self.table.lock().insert(msg_ref.clone(), after.clone());
        Ok(after)
    }

    async fn add_or_update_message(&self, input: CreateInput) -> Result<Message, HubError> {
        let msg_ref = MsgRef::new(input.msg_ref.trim());
        if self.table.lock().contains_key(&msg_ref) {
            self.update_message(&msg_ref, Patch::default(), false).await
        } else {
            self.add_message(input).await
        }
    }

    async fn remove_message(&self, msg_ref: &MsgRef) -> Result<Message, HubError> {
        self.table.lock().remove(msg_ref).ok_or_else(|| HubError::NotFound(msg_ref.clone()))
    }

    async fn get_message_by_ref(&self, msg_ref: &MsgRef, _include_hidden: bool) -> Option<Message> {
        self.table.lock().get(msg_ref).cloned()
    }

    async fn get_messages(&self) -> Vec<Message> {
        self.table.lock().values().cloned().collect()
    }
}

fn fake_host() -> IngestHost {
    IngestHost::new(Arc::new(FakeMutationSink::default()))
}

#[test]
fn options_resolver_falls_back_to_default_when_key_missing() {
    let opts = MapOptionsResolver(HashMap::new());
    assert_eq!(opts.resolve_string("host", "localhost"), "localhost");
    assert_eq!(opts.resolve_int("port", 8080), 8080);
    assert!(opts.resolve_bool("enabled", true));
}

#[test]
fn options_resolver_reads_configured_values() {
    let mut map = HashMap::new();
    map.insert("host".to_string(), Value::String("example.com".into()));
    map.insert("port".to_string(), Value::from(9090));
    map.insert("enabled".to_string(), Value::Bool(false));
    let opts = MapOptionsResolver(map);

    assert_eq!(opts.resolve_string("host", "localhost"), "example.com");
    assert_eq!(opts.resolve_int("port", 8080), 9090);
    assert!(!opts.resolve_bool("enabled", true));
}

#[test]
fn managed_object_store_tracks_ownership() {
    let store = ManagedObjectStore::new();
    store.mark_managed("light.kitchen", "plugin-a");
    assert_eq!(store.managed_by("light.kitchen"), Some("plugin-a".to_string()));

    store.unmark_managed("light.kitchen", "plugin-b");
    assert_eq!(store.managed_by("light.kitchen"), Some("plugin-a".to_string()), "wrong owner cannot unmark");

    store.unmark_managed("light.kitchen", "plugin-a");
    assert_eq!(store.managed_by("light.kitchen"), None);
}

#[tokio::test]
async fn scoped_timeout_fires_callback() {
    let timers = ScopedTimers::new();
    let fired = Arc::new(AtomicBool::new(false));
    let fired2 = fired.clone();
    timers.set_timeout("t1", Duration::from_millis(5), move || {
        fired2.store(true, Ordering::SeqCst);
    });
    assert_eq!(timers.active_count(), 1);

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(fired.load(Ordering::SeqCst));
}

#[tokio::test]
async fn clearing_a_timeout_before_it_fires_suppresses_the_callback() {
    let timers = ScopedTimers::new();
    let fired = Arc::new(AtomicBool::new(false));
    let fired2 = fired.clone();
    timers.set_timeout("t1", Duration::from_millis(20), move || {
        fired2.store(true, Ordering::SeqCst);
    });
    timers.clear_timeout("t1");

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(!fired.load(Ordering::SeqCst));
}

#[tokio::test]
async fn clear_all_stops_an_interval() {
    let timers = ScopedTimers::new();
    let count = Arc::new(AtomicUsize::new(0));
    let count2 = count.clone();
    timers.set_interval("poll", Duration::from_millis(5), move || {
        count2.fetch_add(1, Ordering::SeqCst);
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    timers.clear_all();
    let seen_before_clear = count.load(Ordering::SeqCst);
    assert!(seen_before_clear > 0);

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(count.load(Ordering::SeqCst), seen_before_clear, "ticks after clear_all should not land");
    assert_eq!(timers.active_count(), 0);
}

struct NoopPlugin {
    id: String,
    started: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
}

#[async_trait]
impl IngestPlugin for NoopPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    async fn start(&self, ctx: &IngestContext) {
        self.started.store(true, Ordering::SeqCst);
        ctx.timers.set_timeout("boot", Duration::from_secs(3600), || {});
    }

    async fn stop(&self, _ctx: &IngestContext, _reason: &str) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn host_start_stop_tears_down_plugin_timers() {
    let host = fake_host();
    let started = Arc::new(AtomicBool::new(false));
    let stopped = Arc::new(AtomicBool::new(false));
    let plugin: Arc<dyn IngestPlugin> =
        Arc::new(NoopPlugin { id: "noop".into(), started: started.clone(), stopped: stopped.clone() });

    let options: Arc<dyn OptionsResolver> = Arc::new(MapOptionsResolver::default());
    let managed: Arc<dyn ManagedObjectsReporter> = Arc::new(ManagedObjectStore::new());
    host.start(plugin, options, managed).await;
    assert!(started.load(Ordering::SeqCst));

    host.stop("noop", "shutdown").await;
    assert!(stopped.load(Ordering::SeqCst));
}

struct RoutingPlugin {
    id: String,
    seen_state: Arc<Mutex<Option<(String, Value)>>>,
}

#[async_trait]
impl IngestPlugin for RoutingPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    async fn start(&self, ctx: &IngestContext) {
        ctx.subscriptions.subscribe("light.kitchen", self.id());
    }

    async fn stop(&self, _ctx: &IngestContext, _reason: &str) {}

    async fn on_state_change(&self, id: &str, state: &Value, _ctx: &IngestContext) {
        *self.seen_state.lock() = Some((id.to_string(), state.clone()));
    }
}

#[tokio::test]
async fn route_state_change_reaches_only_subscribed_plugins() {
    let host = fake_host();
    let seen_a = Arc::new(Mutex::new(None));
    let seen_b = Arc::new(Mutex::new(None));
    let plugin_a: Arc<dyn IngestPlugin> = Arc::new(RoutingPlugin { id: "a".into(), seen_state: seen_a.clone() });
    let plugin_b: Arc<dyn IngestPlugin> = Arc::new(RoutingPlugin { id: "b".into(), seen_state: seen_b.clone() });

    let options: Arc<dyn OptionsResolver> = Arc::new(MapOptionsResolver::default());
    let managed: Arc<dyn ManagedObjectsReporter> = Arc::new(ManagedObjectStore::new());
    host.start(plugin_a, Arc::clone(&options), Arc::clone(&managed)).await;

    let other: Arc<dyn IngestPlugin> = plugin_b;
    host.start(other, options, managed).await;

    host.route_state_change("light.kitchen", &Value::Bool(true)).await;

    assert_eq!(seen_a.lock().as_ref().map(|(id, _)| id.as_str()), Some("light.kitchen"));
    assert!(seen_b.lock().is_none(), "unsubscribed plugin should not be routed to");
}
