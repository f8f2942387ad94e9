// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! TinyChat API Layer
//!
//! High-level API for the TinyChat chat room.
//!
//! # Overview
//!
//! The API layer coordinates:
//! - Reachability monitoring
//! - The transport connection
//! - The persisted outgoing queue
//! - History sync through the last-connected cursor
//! - Event delivery to the presentation layer
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tinychat_core::api::{CallbackHandler, ChatConfig, ChatRoom, RoomEvent};
//!
//! let room = ChatRoom::builder(ChatConfig::from_env())
//!     .event_handler(Arc::new(CallbackHandler::new(|event| {
//!         if let RoomEvent::MessageReceived { text, .. } = event {
//!             println!("{text}");
//!         }
//!     })))
//!     .start()?;
//!
//! room.send_message("hello")?;
//! ```

mod config;
mod error;
mod events;
mod room;

pub use config::{ChatConfig, PREFERENCES_FILE};
pub use error::{ChatError, ChatResult};
pub use events::{CallbackHandler, EventDispatcher, EventHandler, RoomEvent};
pub use room::{ChatRoom, ChatRoomBuilder, RoomState};
