// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! TinyChat CLI
//!
//! Terminal client for the TinyChat room. Every line typed is sent as a
//! message; lines starting with `/` are commands.

mod config;
mod display;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tinychat_core::network::{current_time_millis, DEFAULT_SERVER_ADDR};
use tinychat_core::{CallbackHandler, ChatRoom, CursorState, RoomEvent, RoomState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "tinychat")]
#[command(version, about = "Single-room chat client")]
struct Cli {
    /// Data directory (default: platform data dir + /tinychat)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Chat server address (host:port)
    #[arg(long, env = "TINYCHAT_SERVER", default_value = DEFAULT_SERVER_ADDR)]
    server: String,

    /// Reachability probe interval in seconds
    #[arg(long, env = "TINYCHAT_PROBE_INTERVAL_SECS", default_value_t = 5)]
    probe_interval: u64,
}

/// A line typed by the user.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Send(String),
    Suspend,
    Resume,
    Background,
    Foreground,
    History(Option<u64>),
    Status,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Send(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match parts.next().unwrap_or_default() {
        "suspend" => Input::Suspend,
        "resume" => Input::Resume,
        "background" => Input::Background,
        "foreground" => Input::Foreground,
        "history" => Input::History(parts.next().and_then(|m| m.parse().ok())),
        "status" => Input::Status,
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => Input::Unknown(other.to_string()),
    }
}

/// Start of a `/history` window `minutes` back from `now`, defaulting to an hour.
fn history_since(now: i64, minutes: Option<u64>) -> i64 {
    let minutes = i64::try_from(minutes.unwrap_or(60)).unwrap_or(i64::MAX);
    now.saturating_sub(minutes.saturating_mul(60_000))
}

fn print_help() {
    display::info("Type a message and press enter to send it.");
    println!("  /history [minutes]  Request messages from the last N minutes (default 60)");
    println!("  /status             Show connection state and queued messages");
    println!("  /suspend, /resume   Stop or restart the reachability probe");
    println!("  /background         Suspend and close the connection");
    println!("  /foreground         Resume after /background");
    println!("  /quit               Leave the room");
}

fn on_event(event: RoomEvent) {
    match event {
        RoomEvent::MessageReceived { text, client_time } => {
            display::chat_message(&text, client_time)
        }
        RoomEvent::OfflineMessageQueued { .. } => display::warning(
            "Message sent while offline. It will be delivered when you reconnect.",
        ),
        RoomEvent::StateChanged { state } => match state {
            RoomState::Connected => display::success("Connected"),
            RoomState::Disconnected => display::warning("Disconnected"),
            RoomState::Suspended => display::info("Suspended"),
        },
        RoomEvent::QueueFlushed { sent, failed } if sent > 0 || failed > 0 => {
            display::info(&format!("Delivered {} queued message(s), {} pending", sent, failed))
        }
        other => debug!(?other, "Room event"),
    }
}

async fn print_status(room: &ChatRoom) -> Result<()> {
    let state = room.state().await?;
    let queued = room.queued_messages().await?;
    let last = match room.last_connected().await? {
        CursorState::Unset => "never".to_string(),
        CursorState::Set(ts) => ts.to_string(),
    };

    println!("  State:          {:?}", state);
    println!("  Queued:         {}", queued.len());
    println!("  Last connected: {}", last);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tinychat_core=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = CliConfig {
        data_dir: CliConfig::resolve_data_dir(cli.data_dir),
        server_addr: cli.server,
        probe_interval_secs: cli.probe_interval,
    };
    std::fs::create_dir_all(&config.data_dir)?;

    let room = ChatRoom::builder(config.chat_config())
        .event_handler(Arc::new(CallbackHandler::new(on_event)))
        .start()?;

    display::info(&format!(
        "Joined {} (data dir {:?}). Type /help for commands.",
        config.server_addr, config.data_dir
    ));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            Input::Send(text) => room.send_message(text)?,
            Input::Suspend => room.suspend()?,
            Input::Resume => room.resume()?,
            Input::Background => room.enter_background()?,
            Input::Foreground => room.enter_foreground()?,
            Input::History(minutes) => {
                room.download_since(history_since(current_time_millis(), minutes))?;
            }
            Input::Status => print_status(&room).await?,
            Input::Help => print_help(),
            Input::Quit => break,
            Input::Unknown(command) => display::error(&format!("Unknown command: /{}", command)),
            Input::Empty => {}
        }
    }

    room.shutdown().await?;
    display::success("Goodbye");
    Ok(())
}
