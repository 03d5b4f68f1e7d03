// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Store: the single canonical table and its mutation pipeline (§4.7).
//!
//! All mutations go through an `async` mutex around the canonical table, so
//! at any point at most one mutation is in flight; persistence and archive
//! writes are enqueued to their own buffered writers and never awaited
//! inline, which keeps mutation ordering intact without coupling mutation
//! latency to disk latency (§5).

use hub_adapters::{dispatch_all, DynNotifyPlugin, MutationSink};
use hub_core::{
    apply_patch, classify_creation, create_message, is_immediately_due, may_recreate, Clock,
    CreateInput, CreationClass, HubError, LifecycleState, Message, MsgRef, NotificationEvent,
    Patch, SystemClock, TimingPatch,
};
use hub_storage::{Archive, ArchiveRecord, DeleteReason, Storage};
use parking_lot::Mutex as SyncMutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex as AsyncMutex;

/// Minute-of-day (`0..1440`) for a given epoch-ms timestamp, used by quiet
/// hours and Notify fan-out (§4.5).
pub fn minute_of_day(epoch_ms: u64) -> u16 {
    const MS_PER_DAY: u64 = 86_400_000;
    const MS_PER_MINUTE: u64 = 60_000;
    ((epoch_ms % MS_PER_DAY) / MS_PER_MINUTE) as u16
}

/// Builds a full-replace [`Patch`] from a [`CreateInput`], for
/// `add_or_update_message`'s fallback to update-in-place on conflict.
fn patch_from_create_input(input: &CreateInput) -> Patch {
    Patch {
        icon: Some(input.icon.clone()),
        title: Some(Some(input.title.clone())),
        text: Some(Some(input.text.clone())),
        details: Some(input.details.clone()),
        audience: Some(input.audience.clone()),
        origin: Some(Some(input.origin.clone())),
        progress_percentage: Some(input.progress_percentage),
        lifecycle_state: None,
        metrics: input.metrics.iter().map(|(k, v)| (k.clone(), Some(v.clone()))).collect(),
        list_items: input.list_items.iter().map(|i| (i.id.clone(), Some(i.clone()))).collect(),
        timing: TimingPatch {
            notify_at: Some(input.timing.notify_at),
            remind_every: Some(input.timing.remind_every),
            cooldown: Some(input.timing.cooldown),
            time_budget: Some(input.timing.time_budget),
            expires_at: Some(input.timing.expires_at),
            due_at: Some(input.timing.due_at),
            start_at: Some(input.timing.start_at),
            end_at: Some(input.timing.end_at),
        },
        dependencies: Some(Some(input.dependencies.clone())),
        attachments: Some(Some(input.attachments.clone())),
        actions: Some(Some(input.actions.clone())),
    }
}

fn deletion_patch(reason_state: LifecycleState) -> Patch {
    let mut patch = Patch::default();
    patch.lifecycle_state = Some(Some(reason_state));
    patch.timing.notify_at = Some(None);
    patch
}

/// The canonical message table, the mutation pipeline, and the wiring to
/// Storage/Archive/Notify. A single instance is the source of truth; the
/// lifecycle scheduler, the admin command bus, and the ingest host all hold
/// an `Arc<Store>` (§9).
pub struct Store<C: Clock = SystemClock> {
    table: AsyncMutex<HashMap<MsgRef, Message>>,
    storage: SyncMutex<Storage>,
    archive: SyncMutex<Archive>,
    plugins: SyncMutex<Vec<Arc<dyn DynNotifyPlugin>>>,
    archive_seq: AtomicU64,
    clock: C,
}

impl<C: Clock> Store<C> {
    pub fn new(clock: C, storage: Storage, archive: Archive, initial: Vec<Message>) -> Self {
        let table = initial.into_iter().map(|m| (m.msg_ref.clone(), m)).collect();
        Self {
            table: AsyncMutex::new(table),
            storage: SyncMutex::new(storage),
            archive: SyncMutex::new(archive),
            plugins: SyncMutex::new(Vec::new()),
            archive_seq: AtomicU64::new(0),
            clock,
        }
    }

    pub fn register_plugin(&self, plugin: Arc<dyn DynNotifyPlugin>) {
        self.plugins.lock().push(plugin);
    }

    fn schedule_persist(&self, table: &HashMap<MsgRef, Message>) {
        let messages: Vec<Message> = table.values().cloned().collect();
        let seq = self.archive_seq.load(Ordering::SeqCst);
        self.storage.lock().schedule_write(messages, seq);
    }

    fn archive_append(&self, msg_ref: MsgRef, record: ArchiveRecord) {
        self.archive.lock().append(msg_ref, record);
        self.archive_seq.fetch_add(1, Ordering::SeqCst);
    }

    async fn dispatch(&self, event: NotificationEvent, messages: Vec<Message>) {
        if messages.is_empty() {
            return;
        }
        let plugins = self.plugins.lock().clone();
        if plugins.is_empty() {
            return;
        }
        let minute = minute_of_day(self.clock.epoch_ms());
        dispatch_all(&plugins, event, &messages, minute).await;
    }

    /// Bump `timing.notifiedAt[event]` in place after a dispatch attempt
    /// (§4.5). This is core bookkeeping, not a producer-visible patch, so it
    /// doesn't generate its own archive `patch` record (§9 open question 3).
    async fn mark_notified(&self, msg_ref: &MsgRef, event: NotificationEvent) {
        let now = self.clock.epoch_ms();
        let mut table = self.table.lock().await;
        if let Some(msg) = table.get_mut(msg_ref) {
            msg.timing.notified_at.insert(event, now);
        }
        self.schedule_persist(&table);
    }

    /// `add_message(msg)` (§4.7).
    pub async fn add_message(&self, input: CreateInput) -> Result<Message, HubError> {
        let new_msg = create_message(input, &self.clock)?;
        let msg_ref = new_msg.msg_ref.clone();
        let now = self.clock.epoch_ms();

        let mut table = self.table.lock().await;
        let prior = table.get(&msg_ref).cloned();
        let had_prior = prior.is_some();
        if let Some(existing) = &prior {
            if !may_recreate(std::slice::from_ref(&existing.lifecycle.state)) {
                return Err(HubError::Conflict(msg_ref));
            }
        }

        let purged_at = prior.as_ref().map(|existing| existing.lifecycle.state_changed_at);
        let class = classify_creation(had_prior, purged_at, new_msg.timing.cooldown, now);

        if let Some(existing) = prior {
            table.remove(&msg_ref);
            self.archive_append(
                msg_ref.clone(),
                ArchiveRecord::Delete { at: now, reason: DeleteReason::PurgeOnRecreate, message: existing },
            );
        }

        table.insert(msg_ref.clone(), new_msg.clone());
        self.schedule_persist(&table);
        self.archive_append(msg_ref.clone(), ArchiveRecord::Create { at: now, message: new_msg.clone() });
        drop(table);

        let event = match class {
            CreationClass::Added => NotificationEvent::Added,
            CreationClass::Recreated => NotificationEvent::Recreated,
            CreationClass::Recovered => NotificationEvent::Recovered,
        };
        self.dispatch(event, vec![new_msg.clone()]).await;
        self.mark_notified(&msg_ref, event).await;

        if is_immediately_due(new_msg.lifecycle.state, new_msg.timing.notify_at, class) {
            self.dispatch(NotificationEvent::Due, vec![new_msg.clone()]).await;
            self.mark_notified(&msg_ref, NotificationEvent::Due).await;
        }

        Ok(self.table.lock().await.get(&msg_ref).cloned().unwrap_or(new_msg))
    }

    /// `update_message(ref, patch, stealth)` (§4.7).
    pub async fn update_message(
        &self,
        msg_ref: &MsgRef,
        patch: Patch,
        stealth: bool,
    ) -> Result<Message, HubError> {
        let mut table = self.table.lock().await;
        let before = table.get(msg_ref).cloned().ok_or_else(|| HubError::NotFound(msg_ref.clone()))?;
        let after = apply_patch(&before, patch.clone(), stealth, &self.clock)?;
        table.insert(msg_ref.clone(), after.clone());
        self.schedule_persist(&table);
        self.archive_append(
            msg_ref.clone(),
            ArchiveRecord::Patch { at: self.clock.epoch_ms(), patch, before: before.clone(), after: after.clone() },
        );
        drop(table);

        let updated_bumped = !stealth && after.timing.updated_at != before.timing.updated_at;
        let transitioned_to_terminal =
            matches!(after.lifecycle.state, LifecycleState::Deleted | LifecycleState::Expired);
        if updated_bumped && !transitioned_to_terminal {
            self.dispatch(NotificationEvent::Updated, vec![after.clone()]).await;
            self.mark_notified(msg_ref, NotificationEvent::Updated).await;
        }

        let now = self.clock.epoch_ms();
        let due_now = !stealth
            && after.timing.notify_at.is_none()
            && after.lifecycle.state == LifecycleState::Open
            && !after.timing.is_expired(now);
        if due_now {
            self.dispatch(NotificationEvent::Due, vec![after.clone()]).await;
            self.mark_notified(msg_ref, NotificationEvent::Due).await;
        }

        Ok(self.table.lock().await.get(msg_ref).cloned().unwrap_or(after))
    }

    /// `add_or_update_message(msg)`: `add_message`, falling back to a
    /// full-replace `update_message` when a non-quasi-deleted entry already
    /// occupies the ref.
    pub async fn add_or_update_message(&self, input: CreateInput) -> Result<Message, HubError> {
        let msg_ref = MsgRef::new(input.msg_ref.trim());
        match self.add_message(input.clone()).await {
            Ok(msg) => Ok(msg),
            Err(HubError::Conflict(_)) => {
                self.update_message(&msg_ref, patch_from_create_input(&input), false).await
            }
            Err(e) => Err(e),
        }
    }

    /// `remove_message(ref)`: soft-delete via `update_message`, then dispatch
    /// `deleted` explicitly (§4.7) since a transition into `deleted` always
    /// suppresses `update_message`'s own `updated` dispatch.
    pub async fn remove_message(&self, msg_ref: &MsgRef) -> Result<Message, HubError> {
        let after = self.update_message(msg_ref, deletion_patch(LifecycleState::Deleted), false).await?;
        self.dispatch(NotificationEvent::Deleted, vec![after.clone()]).await;
        self.mark_notified(msg_ref, NotificationEvent::Deleted).await;
        Ok(self.table.lock().await.get(msg_ref).cloned().unwrap_or(after))
    }

    /// `get_message_by_ref(ref, view?)`. `include_hidden` surfaces
    /// `deleted`/`expired` entries that the default view omits.
    pub async fn get_message_by_ref(&self, msg_ref: &MsgRef, include_hidden: bool) -> Option<Message> {
        let table = self.table.lock().await;
        table
            .get(msg_ref)
            .filter(|m| include_hidden || !m.lifecycle.state.is_hidden_by_default())
            .cloned()
    }

    /// `get_messages()`: every message visible in the default view.
    pub async fn get_messages(&self) -> Vec<Message> {
        let table = self.table.lock().await;
        table.values().filter(|m| !m.lifecycle.state.is_hidden_by_default()).cloned().collect()
    }

    /// A consistent snapshot of the full canonical table (including hidden
    /// states), for the query engine (§4.9) to filter/sort/page over.
    pub async fn snapshot(&self) -> Vec<Message> {
        self.table.lock().await.values().cloned().collect()
    }

    /// Prune loop tick (§4.8 #1): soft-expire messages past `expiresAt` and
    /// emit a single `expired` batch event.
    pub async fn tick_prune(&self) -> Vec<MsgRef> {
        let now = self.clock.epoch_ms();
        let mut table = self.table.lock().await;
        let mut expired = Vec::new();
        for msg in table.values_mut() {
            let already_terminal = matches!(msg.lifecycle.state, LifecycleState::Expired | LifecycleState::Deleted);
            if msg.timing.is_expired(now) && !already_terminal {
                msg.lifecycle.state = LifecycleState::Expired;
                msg.lifecycle.state_changed_at = now;
                msg.timing.notify_at = None;
                expired.push(msg.clone());
            }
        }
        if !expired.is_empty() {
            self.schedule_persist(&table);
        }
        drop(table);
        if !expired.is_empty() {
            self.dispatch(NotificationEvent::Expired, expired.clone()).await;
            for msg in &expired {
                self.mark_notified(&msg.msg_ref, NotificationEvent::Expired).await;
            }
        }
        expired.into_iter().map(|m| m.msg_ref).collect()
    }

    /// Close-sweep tick (§4.8 #2): every `closed` message transitions to
    /// `deleted` via the normal `remove_message` path.
    pub async fn tick_close_sweep(&self) -> Vec<MsgRef> {
        let refs: Vec<MsgRef> = {
            let table = self.table.lock().await;
            table.values().filter(|m| m.lifecycle.state == LifecycleState::Closed).map(|m| m.msg_ref.clone()).collect()
        };
        for msg_ref in &refs {
            let _ = self.remove_message(msg_ref).await;
        }
        refs
    }

    /// Hard-delete tick (§4.8 #3): purge `deleted`/`expired` entries whose
    /// retention window has elapsed.
    pub async fn tick_hard_delete(&self, retention: Duration) -> Vec<MsgRef> {
        let now = self.clock.epoch_ms();
        let retention_ms = retention.as_millis() as u64;
        let mut table = self.table.lock().await;
        let purge_refs: Vec<MsgRef> = table
            .values()
            .filter(|m| {
                m.lifecycle.state.is_retained_quasi_deleted()
                    && m.lifecycle.state_changed_at.saturating_add(retention_ms) <= now
            })
            .map(|m| m.msg_ref.clone())
            .collect();
        let mut purged = Vec::new();
        for msg_ref in &purge_refs {
            if let Some(msg) = table.remove(msg_ref) {
                purged.push(msg);
            }
        }
        if !purged.is_empty() {
            self.schedule_persist(&table);
        }
        drop(table);
        for msg in purged {
            self.archive_append(
                msg.msg_ref.clone(),
                ArchiveRecord::Delete { at: now, reason: DeleteReason::Purge, message: msg },
            );
        }
        purge_refs
    }

    /// Due-poll tick (§4.8 #4): dispatch a `due` batch and reschedule each
    /// message's `notifyAt` (stealth — no `updatedAt` bump, no `updated`
    /// event).
    pub async fn tick_due_poll(&self) -> Vec<MsgRef> {
        let now = self.clock.epoch_ms();
        let mut table = self.table.lock().await;
        let mut due = Vec::new();
        for msg in table.values_mut() {
            if msg.lifecycle.state == LifecycleState::Open && msg.timing.is_due(now) {
                msg.timing.notify_at = msg.timing.remind_every.map(|every| now + every);
                due.push(msg.clone());
            }
        }
        if !due.is_empty() {
            self.schedule_persist(&table);
        }
        drop(table);
        if !due.is_empty() {
            self.dispatch(NotificationEvent::Due, due.clone()).await;
            for msg in &due {
                self.mark_notified(&msg.msg_ref, NotificationEvent::Due).await;
            }
        }
        due.into_iter().map(|m| m.msg_ref).collect()
    }

    /// The clock's current reading, for callers (e.g. the command bus) that
    /// need "now" without owning a separate clock handle.
    pub fn epoch_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }

    /// On-disk size of the snapshot file and the archive tree, in bytes.
    /// Walking the archive tree is the expensive part, so `admin.stats.get`
    /// only calls this when `include.archiveSize` is requested.
    pub fn io_stats(&self) -> (u64, u64) {
        (self.storage.lock().size_bytes(), self.archive.lock().size_bytes())
    }

    /// Write the pending snapshot if `storage.writeIntervalMs` has elapsed
    /// since the last write (§4.2). Driven by the daemon's writer-flush
    /// tick, independent of the lifecycle scheduler ticks.
    pub fn maybe_flush_storage(&self) {
        if let Err(err) = self.storage.lock().maybe_flush(Instant::now()) {
            tracing::warn!(error = %err, "storage periodic flush failed");
        }
    }

    /// Flush buffered archive records if `archive.flushIntervalMs` has
    /// elapsed since the last flush (§4.3).
    pub fn maybe_flush_archive(&self) {
        if self.archive.lock().needs_flush(Instant::now()) {
            for (msg_ref, err) in self.archive.lock().flush() {
                tracing::warn!(%msg_ref, error = %err, "archive periodic flush failed");
            }
        }
    }

    /// Flush storage and archive synchronously, best-effort. Called on
    /// shutdown after the scheduler loops have stopped (§5, §9).
    pub fn flush(&self) {
        if let Err(err) = self.storage.lock().flush_pending() {
            tracing::warn!(error = %err, "storage flush on shutdown failed");
        }
        for (msg_ref, err) in self.archive.lock().flush() {
            tracing::warn!(%msg_ref, error = %err, "archive flush on shutdown failed");
        }
    }
}

/// Lets an Ingest producer (§4.6) drive Store mutations without this crate
/// depending back on `hub-adapters::ingest` — only the trait does.
#[async_trait::async_trait]
impl<C: Clock> MutationSink for Store<C> {
    async fn add_message(&self, input: CreateInput) -> Result<Message, HubError> {
        Store::add_message(self, input).await
    }

    async fn update_message(&self, msg_ref: &MsgRef, patch: Patch, stealth: bool) -> Result<Message, HubError> {
        Store::update_message(self, msg_ref, patch, stealth).await
    }

    async fn add_or_update_message(&self, input: CreateInput) -> Result<Message, HubError> {
        Store::add_or_update_message(self, input).await
    }

    async fn remove_message(&self, msg_ref: &MsgRef) -> Result<Message, HubError> {
        Store::remove_message(self, msg_ref).await
    }

    async fn get_message_by_ref(&self, msg_ref: &MsgRef, include_hidden: bool) -> Option<Message> {
        Store::get_message_by_ref(self, msg_ref, include_hidden).await
    }

    async fn get_messages(&self) -> Vec<Message> {
        Store::get_messages(self).await
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
