// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The message-hub daemon binary: wires the Store to its durability layers
//! and notify plugins, runs the lifecycle scheduler (§4.8), and serves the
//! command bus over a Unix-domain socket (§6).
//!
//! Shutdown teardown order (§9): stop the listener → stop the scheduler
//! loops → flush archive → flush storage.

use hub_adapters::{DesktopNotifyAdapter, NotifyPlugin, QuietHours};
use hub_core::SystemClock;
use hub_daemon::config::Config;
use hub_daemon::{listener, scheduler};
use hub_storage::{Archive, MigrationRegistry, Storage};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("HUB_CONFIG_PATH") {
        return PathBuf::from(path);
    }
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("hub").join("hub.toml")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::load(&config_path())?;
    tracing::info!(?config, "starting hub-daemon");

    let storage = Storage::new(config.snapshot_path(), Duration::from_millis(config.storage.write_interval_ms));
    let archive = Archive::new(config.archive.base_dir.clone(), Duration::from_millis(config.archive.flush_interval_ms));
    let registry = MigrationRegistry::new();
    let initial = storage.read_snapshot(&registry, Vec::new())?;

    let store = Arc::new(hub_engine::Store::new(SystemClock, storage, archive, initial));

    let mut desktop_plugin = NotifyPlugin::new("desktop", DesktopNotifyAdapter::new());
    if let Some(window) = config.quiet_hours.first() {
        let (start_minute, end_minute) = window.to_minutes()?;
        desktop_plugin = desktop_plugin.with_quiet_hours(QuietHours { start_minute, end_minute }, window.urgency_threshold);
    }
    store.register_plugin(Arc::new(desktop_plugin));

    if let Some(parent) = config.daemon.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = std::fs::remove_file(&config.daemon.socket_path);
    let unix_listener = UnixListener::bind(&config.daemon.socket_path)?;
    tracing::info!(socket = %config.daemon.socket_path.display(), "listening");

    let shutdown = CancellationToken::new();
    let mut handles = scheduler::spawn_all(Arc::clone(&store), &config.scheduler, shutdown.clone());
    handles.extend(scheduler::spawn_writers(
        Arc::clone(&store),
        config.storage.write_interval_ms,
        config.archive.flush_interval_ms,
        shutdown.clone(),
    ));

    let listener_task = tokio::spawn(listener::run(
        unix_listener,
        Arc::clone(&store),
        config.daemon.tz_offset_minutes,
        config.daemon.locale.clone(),
        shutdown.clone(),
    ));

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");

    shutdown.cancel();
    let _ = listener_task.await;
    for handle in handles {
        let _ = handle.await;
    }
    store.flush();
    let _ = std::fs::remove_file(&config.daemon.socket_path);

    Ok(())
}
