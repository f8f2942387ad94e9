// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Chat Room Test Harness
//!
//! Starts a room over mock collaborators and records its events.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tinychat_core::api::{ChatConfig, ChatRoom, EventHandler, RoomEvent};
use tinychat_core::network::{MockReachability, MockTransport, ReachabilityStatus};
use tinychat_core::storage::{MemoryStore, SyncCursor};

/// Handler that keeps every event it sees.
#[derive(Default)]
pub struct EventRecorder {
    events: Mutex<Vec<RoomEvent>>,
}

impl EventRecorder {
    pub fn events(&self) -> Vec<RoomEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn received_texts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RoomEvent::MessageReceived { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, expected: &RoomEvent) -> bool {
        self.events.lock().iter().any(|event| event == expected)
    }
}

impl EventHandler for EventRecorder {
    fn on_event(&self, event: RoomEvent) {
        self.events.lock().push(event);
    }
}

/// A running room and handles on all of its collaborators.
pub struct RoomHarness {
    pub room: ChatRoom,
    pub transport: Arc<MockTransport>,
    pub reachability: Arc<MockReachability>,
    pub store: Arc<MemoryStore>,
    pub events: Arc<EventRecorder>,
}

impl RoomHarness {
    pub fn cursor(&self) -> SyncCursor {
        SyncCursor::new(self.store.clone())
    }

    /// Waits until every command posted so far has been processed.
    pub async fn settle(&self) {
        settle(&self.room).await;
    }
}

/// Round-trips a few queries so that commands posted by collaborators while
/// handling earlier commands are processed too.
pub async fn settle(room: &ChatRoom) {
    for _ in 0..3 {
        room.state().await.expect("room is running");
    }
}

/// Starts a room in `data_dir` with the given collaborators.
pub fn start_room_with(
    data_dir: &Path,
    status: ReachabilityStatus,
    transport: MockTransport,
    store: Arc<MemoryStore>,
) -> RoomHarness {
    let transport = Arc::new(transport);
    let reachability = Arc::new(MockReachability::new(status));
    let events = Arc::new(EventRecorder::default());

    let room = ChatRoom::builder(ChatConfig::with_data_dir(data_dir))
        .transport(transport.clone())
        .reachability(reachability.clone())
        .store(store.clone())
        .event_handler(events.clone())
        .start()
        .expect("room starts inside a runtime");

    RoomHarness {
        room,
        transport,
        reachability,
        store,
        events,
    }
}

/// Starts a room that cannot reach the server.
pub fn start_offline_room(data_dir: &Path, store: Arc<MemoryStore>) -> RoomHarness {
    let transport = MockTransport::new();
    transport.set_fail_connect(true);
    start_room_with(data_dir, ReachabilityStatus::NotReachable, transport, store)
}

/// Starts a room that reaches the server and connects.
pub fn start_online_room(data_dir: &Path, store: Arc<MemoryStore>) -> RoomHarness {
    start_room_with(
        data_dir,
        ReachabilityStatus::ReachableViaWideArea,
        MockTransport::new(),
        store,
    )
}
