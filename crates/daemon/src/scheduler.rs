// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The lifecycle scheduler (§4.8) and the storage/archive writer-flush
//! ticks (§4.2/§4.3), each as its own throttled `tokio::time::interval`
//! loop racing a shared shutdown signal (§9: "stop ingest → stop due-poll →
//! flush archive → flush storage").

use crate::config::SchedulerConfig;
use hub_core::Clock;
use hub_engine::Store;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

fn spawn_tick<C, F>(
    interval_ms: u64,
    shutdown: CancellationToken,
    store: Arc<Store<C>>,
    tick: F,
) -> Option<JoinHandle<()>>
where
    C: Clock + 'static,
    F: for<'a> Fn(&'a Store<C>) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + 'a>>
        + Send
        + 'static,
{
    if interval_ms == 0 {
        return None;
    }
    let mut timer = tokio::time::interval(Duration::from_millis(interval_ms));
    Some(tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = timer.tick() => tick(&store).await,
                _ = shutdown.cancelled() => break,
            }
        }
    }))
}

/// Spawns every scheduler-loop task and returns their handles, so the
/// caller can `abort`/await them during shutdown teardown.
pub fn spawn_all<C: Clock + 'static>(
    store: Arc<Store<C>>,
    config: &SchedulerConfig,
    shutdown: CancellationToken,
) -> Vec<JoinHandle<()>> {
    let hard_delete_retention = Duration::from_millis(config.hard_delete_after_ms);

    [
        spawn_tick(config.prune_interval_ms, shutdown.clone(), Arc::clone(&store), |store| {
            Box::pin(async move {
                store.tick_prune().await;
            })
        }),
        spawn_tick(config.delete_closed_interval_ms, shutdown.clone(), Arc::clone(&store), |store| {
            Box::pin(async move {
                store.tick_close_sweep().await;
            })
        }),
        spawn_tick(config.hard_delete_interval_ms, shutdown.clone(), Arc::clone(&store), move |store| {
            Box::pin(async move {
                store.tick_hard_delete(hard_delete_retention).await;
            })
        }),
        spawn_tick(config.notifier_interval_ms, shutdown.clone(), Arc::clone(&store), |store| {
            Box::pin(async move {
                store.tick_due_poll().await;
            })
        }),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Spawns the storage/archive writer-flush ticks (§4.2/§4.3). These are
/// ambient durability plumbing, not part of the lifecycle scheduler proper,
/// so they're started and stopped independently.
pub fn spawn_writers<C: Clock + 'static>(
    store: Arc<Store<C>>,
    storage_interval_ms: u64,
    archive_interval_ms: u64,
    shutdown: CancellationToken,
) -> Vec<JoinHandle<()>> {
    [
        spawn_tick(storage_interval_ms, shutdown.clone(), Arc::clone(&store), |store| {
            Box::pin(async move {
                store.maybe_flush_storage();
            })
        }),
        spawn_tick(archive_interval_ms, shutdown.clone(), Arc::clone(&store), |store| {
            Box::pin(async move {
                store.maybe_flush_archive();
            })
        }),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
