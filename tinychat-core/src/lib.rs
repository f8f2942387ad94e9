// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! TinyChat Core Library
//!
//! Sync and transport orchestration for a single-room chat client.
//! Messages are JSON objects on a raw TCP stream; outgoing messages survive
//! offline periods in a persisted queue and history gaps are closed with a
//! last-connected cursor.

pub mod api;
pub mod network;
pub mod storage;

pub use api::{
    CallbackHandler, ChatConfig, ChatError, ChatResult, ChatRoom, ChatRoomBuilder, EventHandler,
    RoomEvent, RoomState,
};
pub use network::{
    JsonFramer, Message, MockTransport, NetworkError, Reachability, ReachabilityStatus,
    TcpReachability, TcpTransport, Transport,
};
pub use storage::{CursorState, FileStore, KeyValueStore, MemoryStore, OutgoingQueue, StorageError, SyncCursor};
