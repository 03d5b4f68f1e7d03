// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admin CLI for the message-hub daemon: issues one `hub-wire` request per
//! invocation over the Unix-domain command bus and prints the JSON reply.

mod client;

use clap::{Parser, Subcommand};
use client::{resolve_socket_path, DaemonClient};
use hub_wire::{Request, StatsInclude};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hub", about = "Admin CLI for the message-hub daemon")]
struct Cli {
    /// Path to the daemon's Unix-domain socket. Defaults to
    /// `$HUB_DAEMON_SOCKET_PATH`, then the platform state directory.
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the daemon is alive.
    Ping,
    /// Print the enum constants the daemon was built with.
    Constants,
    /// Print aggregate counts (§4.9).
    Stats {
        /// Also compute the on-disk archive size (walks the archive directory).
        #[arg(long)]
        archive_size: bool,
    },
    /// Run a query against the message table. `spec` is the JSON request body
    /// (`{"where": ..., "sort": [...], "page": {...}}`).
    Query {
        spec: String,
    },
    /// Acknowledge an open message in place.
    Ack {
        r#ref: String,
    },
    /// Transition a message to `closed`.
    Close {
        r#ref: String,
    },
    /// Soft-delete a single message.
    Delete {
        r#ref: String,
    },
    /// Soft-delete a batch of messages.
    DeleteMany {
        refs: Vec<String>,
    },
    /// Push `notifyAt` out to `until` (epoch milliseconds).
    Snooze {
        r#ref: String,
        until: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = DaemonClient::new(resolve_socket_path(cli.socket.as_deref()));

    let request = match cli.command {
        Command::Ping => Request::Ping,
        Command::Constants => Request::ConstantsGet,
        Command::Stats { archive_size } => {
            Request::StatsGet { include: StatsInclude { archive_size, archive_size_max_age_ms: None } }
        }
        Command::Query { spec } => {
            let spec = serde_json::from_str(&spec)?;
            Request::MessagesQuery { spec }
        }
        Command::Ack { r#ref } => Request::MessageAck { r#ref },
        Command::Close { r#ref } => Request::MessageClose { r#ref },
        Command::Delete { r#ref } => Request::MessageDelete { r#ref },
        Command::DeleteMany { refs } => Request::MessagesDelete { refs },
        Command::Snooze { r#ref, until } => Request::MessageSnooze { r#ref, until },
    };

    match client.send(&request).await {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
