// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Chat Room
//!
//! Orchestrates reachability, the transport, the outgoing queue and the sync
//! cursor.
//!
//! # Concurrency
//!
//! All room state is owned by a single task. [`ChatRoom`] handles, the
//! transport and the reachability monitor only post commands into its
//! channel, so queue and cursor mutations are strictly serialized and public
//! calls never wait on network I/O. Collaborators hold a weak sender: once
//! every handle is dropped the task shuts down even if the transport is still
//! alive.
//!
//! # State machine
//!
//! ```text
//!              resume()                    reachable / transport connected
//! Suspended ------------> Disconnected <------------------------------> Connected
//!     ^                          |          unreachable / transport lost     |
//!     +------------- suspend() --+-------------------------------------------+
//! ```
//!
//! Entering contact (the transport connected, or reachability became
//! reachable while connected) pulls history since the cursor, advances the
//! cursor to now and flushes the outgoing queue, in that order. A reachable
//! server with the transport down is reconnected on the reachability change
//! and on every probe tick while active.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::network::{
    current_time_millis, encode_history_request, encode_message, HistoryRequest, JsonFramer,
    Message, Reachability, ReachabilityListener, ReachabilityStatus, TcpReachability,
    TcpTransport, Transport, TransportListener,
};
use crate::storage::{
    CursorState, FileStore, KeyValueStore, OutgoingQueue, StorageError, SyncCursor,
};

use super::config::ChatConfig;
use super::error::{ChatError, ChatResult};
use super::events::{EventDispatcher, EventHandler, RoomEvent};

/// Room lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    /// Periodic tasks stopped (app in background or not yet resumed).
    Suspended,
    /// Active, server not reachable.
    Disconnected,
    /// Active, server reachable.
    Connected,
}

enum Command {
    SendMessage(String),
    Resume,
    Suspend,
    Setup,
    Teardown,
    DownloadSince(i64),
    FlushOutgoing,
    BytesReceived(Vec<u8>),
    TransportConnected,
    TransportDisconnected,
    ReachabilityChanged(ReachabilityStatus),
    State(oneshot::Sender<RoomState>),
    QueuedMessages(oneshot::Sender<Vec<Message>>),
    LastConnected(oneshot::Sender<Result<CursorState, StorageError>>),
    Shutdown(oneshot::Sender<()>),
}

/// Listener handed to collaborators. Holds only a weak sender.
struct RoomEventSink {
    commands: mpsc::WeakUnboundedSender<Command>,
}

impl RoomEventSink {
    fn post(&self, command: Command) {
        if let Some(commands) = self.commands.upgrade() {
            let _ = commands.send(command);
        }
    }
}

impl TransportListener for RoomEventSink {
    fn on_bytes_received(&self, bytes: &[u8]) {
        self.post(Command::BytesReceived(bytes.to_vec()));
    }

    fn on_connected(&self) {
        self.post(Command::TransportConnected);
    }

    fn on_disconnected(&self) {
        self.post(Command::TransportDisconnected);
    }
}

impl ReachabilityListener for RoomEventSink {
    fn on_reachability_changed(&self, status: ReachabilityStatus) {
        self.post(Command::ReachabilityChanged(status));
    }
}

/// Builder for [`ChatRoom`].
///
/// Collaborators left unset default to the production implementations
/// derived from the config: [`TcpTransport`], [`TcpReachability`] and a
/// [`FileStore`] in the data directory.
pub struct ChatRoomBuilder {
    config: ChatConfig,
    transport: Option<Arc<dyn Transport>>,
    reachability: Option<Arc<dyn Reachability>>,
    store: Option<Arc<dyn KeyValueStore>>,
    events: EventDispatcher,
}

impl ChatRoomBuilder {
    /// Creates a builder for `config`.
    pub fn new(config: ChatConfig) -> Self {
        ChatRoomBuilder {
            config,
            transport: None,
            reachability: None,
            store: None,
            events: EventDispatcher::new(),
        }
    }

    /// Uses a custom transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Uses a custom reachability monitor.
    pub fn reachability(mut self, reachability: Arc<dyn Reachability>) -> Self {
        self.reachability = Some(reachability);
        self
    }

    /// Uses a custom settings store for the sync cursor.
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Registers an event handler.
    pub fn event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.events.add_handler(handler);
        self
    }

    /// Loads persisted state and spawns the room task.
    ///
    /// Must be called from within a tokio runtime. The room resumes
    /// immediately: the probe starts and the transport is asked to connect.
    pub fn start(self) -> ChatResult<ChatRoom> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            ChatError::Configuration("chat room must be started inside a tokio runtime".into())
        })?;

        let ChatRoomBuilder {
            config,
            transport,
            reachability,
            store,
            events,
        } = self;

        let transport = transport
            .unwrap_or_else(|| Arc::new(TcpTransport::new(config.transport_config())));
        let reachability = reachability.unwrap_or_else(|| {
            Arc::new(TcpReachability::new(
                &config.server_addr,
                config.probe_interval,
                config.connect_timeout,
            ))
        });
        let store =
            store.unwrap_or_else(|| Arc::new(FileStore::open(config.preferences_path())));

        let (commands, receiver) = mpsc::unbounded_channel();
        let sink = Arc::new(RoomEventSink {
            commands: commands.downgrade(),
        });

        let worker = RoomWorker {
            transport,
            reachability,
            queue: OutgoingQueue::load(config.outgoing_path()),
            cursor: SyncCursor::new(store),
            framer: JsonFramer::new(),
            events,
            state: RoomState::Suspended,
            probe: None,
            probe_interval: config.probe_interval,
            sink,
        };
        runtime.spawn(worker.run(receiver));

        Ok(ChatRoom { commands })
    }
}

/// Handle to a running chat room.
///
/// Cheap to clone. Commands are processed in the order they are posted;
/// queries observe the effects of every command posted before them.
#[derive(Clone)]
pub struct ChatRoom {
    commands: mpsc::UnboundedSender<Command>,
}

impl ChatRoom {
    /// Returns a builder for a room with `config`.
    pub fn builder(config: ChatConfig) -> ChatRoomBuilder {
        ChatRoomBuilder::new(config)
    }

    /// Sends a message composed by the user.
    ///
    /// Delivered immediately when the server is reachable; otherwise queued
    /// on disk and an [`RoomEvent::OfflineMessageQueued`] is emitted.
    pub fn send_message(&self, text: impl Into<String>) -> ChatResult<()> {
        self.post(Command::SendMessage(text.into()))
    }

    /// Starts the periodic reachability probe and connects the transport.
    pub fn resume(&self) -> ChatResult<()> {
        self.post(Command::Resume)
    }

    /// Stops the periodic probe. Does not close the transport.
    pub fn suspend(&self) -> ChatResult<()> {
        self.post(Command::Suspend)
    }

    /// Asks the transport to connect.
    pub fn setup(&self) -> ChatResult<()> {
        self.post(Command::Setup)
    }

    /// Records the last contact (if connected) and disconnects the transport.
    pub fn teardown(&self) -> ChatResult<()> {
        self.post(Command::Teardown)
    }

    /// Host moved to the background: suspend and tear down the connection.
    pub fn enter_background(&self) -> ChatResult<()> {
        self.suspend()?;
        self.teardown()
    }

    /// Host returned to the foreground.
    pub fn enter_foreground(&self) -> ChatResult<()> {
        self.resume()
    }

    /// Requests every message newer than `since` from the server.
    ///
    /// Replayed messages arrive through the normal receive path and are
    /// indistinguishable from live traffic.
    pub fn download_since(&self, since: i64) -> ChatResult<()> {
        self.post(Command::DownloadSince(since))
    }

    /// Attempts to deliver every queued message.
    pub fn flush_outgoing(&self) -> ChatResult<()> {
        self.post(Command::FlushOutgoing)
    }

    /// Returns the current room state.
    pub async fn state(&self) -> ChatResult<RoomState> {
        self.query(Command::State).await
    }

    /// Returns the messages waiting in the outgoing queue.
    pub async fn queued_messages(&self) -> ChatResult<Vec<Message>> {
        self.query(Command::QueuedMessages).await
    }

    /// Returns the sync cursor without initializing it.
    pub async fn last_connected(&self) -> ChatResult<CursorState> {
        Ok(self.query(Command::LastConnected).await??)
    }

    /// Stops the room: notifier off, transport torn down, task ended.
    pub async fn shutdown(&self) -> ChatResult<()> {
        self.query(Command::Shutdown).await
    }

    /// Returns true once the room task has stopped.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    fn post(&self, command: Command) -> ChatResult<()> {
        self.commands
            .send(command)
            .map_err(|_| ChatError::RoomClosed)
    }

    async fn query<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> ChatResult<T> {
        let (reply, response) = oneshot::channel();
        self.post(command(reply))?;
        response.await.map_err(|_| ChatError::RoomClosed)
    }
}

enum Wake {
    Command(Option<Command>),
    Probe,
}

struct RoomWorker {
    transport: Arc<dyn Transport>,
    reachability: Arc<dyn Reachability>,
    queue: OutgoingQueue,
    cursor: SyncCursor,
    framer: JsonFramer,
    events: EventDispatcher,
    state: RoomState,
    probe: Option<Interval>,
    probe_interval: Duration,
    sink: Arc<RoomEventSink>,
}

impl RoomWorker {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        info!(queued = self.queue.len(), "Chat room started");
        self.reachability.start_notifier(self.sink.clone());
        self.resume().await;

        loop {
            let wake = tokio::select! {
                command = commands.recv() => Wake::Command(command),
                _ = next_probe(&mut self.probe) => Wake::Probe,
            };

            match wake {
                Wake::Probe => self.probe_tick().await,
                Wake::Command(Some(command)) => {
                    if !self.handle(command).await {
                        return;
                    }
                }
                Wake::Command(None) => break,
            }
        }

        self.shutdown().await;
    }

    /// Returns false once the room has shut down.
    async fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::SendMessage(text) => self.send_message(text).await,
            Command::Resume => self.resume().await,
            Command::Suspend => self.suspend(),
            Command::Setup => self.setup().await,
            Command::Teardown => self.teardown().await,
            Command::DownloadSince(since) => {
                self.download_since(since).await;
            }
            Command::FlushOutgoing => self.flush().await,
            Command::BytesReceived(bytes) => self.bytes_received(&bytes),
            Command::TransportConnected => self.transport_connected().await,
            Command::TransportDisconnected => self.set_active_state(false),
            Command::ReachabilityChanged(status) => self.reachability_changed(status).await,
            Command::State(reply) => {
                let _ = reply.send(self.state);
            }
            Command::QueuedMessages(reply) => {
                let _ = reply.send(self.queue.messages().to_vec());
            }
            Command::LastConnected(reply) => {
                let _ = reply.send(self.cursor.state());
            }
            Command::Shutdown(reply) => {
                self.shutdown().await;
                let _ = reply.send(());
                return false;
            }
        }
        true
    }

    // === Lifecycle ===

    async fn resume(&mut self) {
        let mut probe = interval_at(Instant::now() + self.probe_interval, self.probe_interval);
        probe.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.probe = Some(probe);
        info!("Resumed");

        self.classify();
        self.setup().await;
    }

    fn suspend(&mut self) {
        self.probe = None;
        self.set_state(RoomState::Suspended);
        info!("Suspended");
    }

    async fn setup(&mut self) {
        if let Err(e) = self.transport.connect(self.sink.clone()).await {
            warn!(error = %e, "Connect failed");
        }
    }

    async fn teardown(&mut self) {
        if self.transport.is_connected() {
            self.touch_cursor();
        }
        if let Err(e) = self.transport.disconnect().await {
            warn!(error = %e, "Disconnect failed");
        }
    }

    async fn shutdown(&mut self) {
        self.probe = None;
        self.reachability.stop_notifier();
        self.teardown().await;
        self.set_state(RoomState::Suspended);
        info!("Chat room stopped");
    }

    async fn probe_tick(&mut self) {
        if self.classify() && !self.transport.is_connected() {
            debug!("Server reachable but transport down; reconnecting");
            self.setup().await;
        }
    }

    /// Moves the state to match reachability. Returns true when reachable.
    fn classify(&mut self) -> bool {
        let reachable = self.reachability.current_status().is_reachable();
        if reachable && matches!(self.cursor.state(), Ok(CursorState::Unset)) {
            self.touch_cursor();
        }
        self.set_state(if reachable {
            RoomState::Connected
        } else {
            RoomState::Disconnected
        });
        reachable
    }

    // === Collaborator events ===

    async fn reachability_changed(&mut self, status: ReachabilityStatus) {
        let reachable = status.is_reachable();
        debug!(?status, "Handling reachability change");
        self.set_active_state(reachable);

        if !reachable {
            self.transport.set_connected(false);
        } else if self.transport.is_connected() {
            self.sync_after_contact().await;
        } else if self.state != RoomState::Suspended {
            // Sync runs from the connected event.
            self.setup().await;
        } else {
            debug!("Suspended; reconnect deferred until resume");
        }
    }

    async fn transport_connected(&mut self) {
        // Bytes buffered from a previous connection belong to a dead stream.
        self.framer.reset();
        self.set_active_state(true);
        self.sync_after_contact().await;
    }

    fn bytes_received(&mut self, bytes: &[u8]) {
        for message in self.framer.feed_bytes(bytes) {
            self.events.dispatch(RoomEvent::MessageReceived {
                text: message.text,
                client_time: message.client_time,
            });
        }
    }

    // === Sync ===

    async fn sync_after_contact(&mut self) {
        match self.cursor.get() {
            Ok(since) => {
                self.download_since(since).await;
            }
            Err(e) => warn!(error = %e, "Failed to read sync cursor; skipping history"),
        }
        self.touch_cursor();
        self.flush().await;
    }

    async fn download_since(&mut self, since: i64) -> bool {
        if !self.transport.is_connected() {
            debug!(since, "Not connected; skipping history download");
            return false;
        }

        let elapsed_secs = current_time_millis().saturating_sub(since) / 1000;
        info!(since, elapsed_secs, "Downloading messages");

        let payload = match encode_history_request(&HistoryRequest { since }) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to encode history request");
                return false;
            }
        };
        match self.transport.write(&payload).await {
            Ok(()) => {
                self.events.dispatch(RoomEvent::HistoryRequested { since });
                true
            }
            Err(e) => {
                warn!(error = %e, "History request failed");
                false
            }
        }
    }

    async fn send_message(&mut self, text: String) {
        let message = Message::new(text);

        if self.reachability.current_status().is_reachable() {
            if deliver(self.transport.as_ref(), &self.cursor, &message).await {
                return;
            }
            debug!("Immediate send failed; queueing for the next flush");
            self.enqueue(message);
        } else {
            let text = message.text.clone();
            self.enqueue(message);
            self.events
                .dispatch(RoomEvent::OfflineMessageQueued { text });
        }
    }

    async fn flush(&mut self) {
        if self.queue.is_empty() {
            return;
        }

        let transport = self.transport.as_ref();
        let cursor = &self.cursor;
        let outcome = self
            .queue
            .flush(|message| async move { deliver(transport, cursor, &message).await })
            .await;

        info!(sent = outcome.sent, failed = outcome.failed, "Outgoing queue flushed");
        self.events.dispatch(RoomEvent::QueueFlushed {
            sent: outcome.sent,
            failed: outcome.failed,
        });
    }

    fn enqueue(&mut self, message: Message) {
        if let Err(e) = self.queue.append(message) {
            warn!(error = %e, "Failed to persist outgoing queue");
        }
    }

    // === State helpers ===

    fn touch_cursor(&self) {
        if let Err(e) = self.cursor.set_now() {
            warn!(error = %e, "Failed to update sync cursor");
        }
    }

    fn set_state(&mut self, state: RoomState) {
        if self.state == state {
            return;
        }
        debug!(from = ?self.state, to = ?state, "Room state changed");
        self.state = state;
        self.events.dispatch(RoomEvent::StateChanged { state });
    }

    /// Moves between Connected and Disconnected; ignored while suspended.
    fn set_active_state(&mut self, connected: bool) {
        if self.state == RoomState::Suspended {
            return;
        }
        self.set_state(if connected {
            RoomState::Connected
        } else {
            RoomState::Disconnected
        });
    }
}

/// Writes one message; on success the cursor advances to now.
async fn deliver(transport: &dyn Transport, cursor: &SyncCursor, message: &Message) -> bool {
    let payload = match encode_message(message) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Failed to encode message");
            return false;
        }
    };

    match transport.write(&payload).await {
        Ok(()) => {
            debug!(client_time = message.client_time, "Sent message");
            if let Err(e) = cursor.set_now() {
                warn!(error = %e, "Failed to update sync cursor");
            }
            true
        }
        Err(e) => {
            debug!(error = %e, "Send failed");
            false
        }
    }
}

async fn next_probe(probe: &mut Option<Interval>) {
    match probe {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
