//! End-to-end specs: spawn the real `hub-daemon` binary against a scratch
//! state directory, drive it with the real `hub` CLI binary, and check the
//! observable behavior neither binary's own unit tests can see (the two
//! processes actually talking over a Unix-domain socket).

use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::time::{Duration, Instant};

use assert_cmd::cargo::cargo_bin;
use tempfile::TempDir;

struct Daemon {
    child: Child,
    socket_path: PathBuf,
    _state_dir: TempDir,
}

impl Daemon {
    fn spawn() -> Self {
        let state_dir = TempDir::new().expect("tempdir");
        let socket_path = state_dir.path().join("hub.sock");

        let child = Command::new(cargo_bin("hub-daemon"))
            .env("HUB_DAEMON_SOCKET_PATH", &socket_path)
            .env("HUB_STORAGE_BASE_DIR", state_dir.path().join("storage"))
            .env("HUB_ARCHIVE_BASE_DIR", state_dir.path().join("archive"))
            .env("HUB_SCHEDULER_NOTIFIER_INTERVAL_MS", "50")
            .env("RUST_LOG", "warn")
            .spawn()
            .expect("spawn hub-daemon");

        wait_for_socket(&socket_path);

        Daemon { child, socket_path, _state_dir: state_dir }
    }

    fn cli(&self) -> Command {
        let mut cmd = Command::new(cargo_bin("hub"));
        cmd.arg("--socket").arg(&self.socket_path);
        cmd
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn wait_for_socket(path: &Path) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if path.exists() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("hub-daemon did not create its socket within 5s: {}", path.display());
}

#[test]
fn ping_succeeds_once_the_daemon_is_listening() {
    let daemon = Daemon::spawn();
    let output = daemon.cli().arg("ping").output().expect("run hub ping");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Pong"));
}

#[test]
fn constants_reports_every_closed_enum_the_daemon_was_built_with() {
    let daemon = Daemon::spawn();
    let output = daemon.cli().arg("constants").output().expect("run hub constants");
    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(body["type"], "Constants");
    assert!(body["kinds"].as_array().is_some_and(|a| !a.is_empty()));
    assert!(body["levels"].as_array().is_some_and(|a| !a.is_empty()));
}

#[test]
fn stats_reflects_current_and_done_counts_as_zero_on_an_empty_store() {
    let daemon = Daemon::spawn();
    let output = daemon.cli().arg("stats").output().expect("run hub stats");
    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(body["type"], "Stats");
    assert_eq!(body["current"]["total"], 0);
}

#[test]
fn querying_with_an_unknown_ref_returns_an_empty_page_not_an_error() {
    let daemon = Daemon::spawn();
    let output =
        daemon.cli().arg("query").arg(r#"{"where":{"kind":"task"}}"#).output().expect("run hub query");
    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(body["type"], "MessagesQuery");
    assert_eq!(body["total"], 0);
}

#[test]
fn acking_a_message_that_does_not_exist_is_reported_as_a_daemon_error() {
    let daemon = Daemon::spawn();
    let output = daemon.cli().arg("ack").arg("no-such-ref").output().expect("run hub ack");
    assert!(!output.status.success());
}
