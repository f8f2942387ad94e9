// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Event System
//!
//! Callbacks for chat room events. This is the contract the presentation
//! layer implements: `MessageReceived` is "show message" and
//! `OfflineMessageQueued` is "show the sent-while-offline notice".

use std::sync::Arc;

use super::room::RoomState;

/// Events emitted by a chat room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// A message arrived from the server (live or history replay).
    MessageReceived {
        /// Message text.
        text: String,
        /// Sender's client timestamp in milliseconds.
        client_time: i64,
    },

    /// A message was queued because the server was unreachable.
    OfflineMessageQueued {
        /// The queued message text.
        text: String,
    },

    /// The room state changed.
    StateChanged {
        /// The new state.
        state: RoomState,
    },

    /// A history request was written to the server.
    HistoryRequested {
        /// Lower bound of the requested history.
        since: i64,
    },

    /// An outgoing queue flush finished.
    QueueFlushed {
        /// Messages delivered.
        sent: usize,
        /// Messages still queued.
        failed: usize,
    },
}

/// Event handler trait.
///
/// Implement this trait to receive chat room events. Handlers run on the
/// room task and should return quickly.
pub trait EventHandler: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: RoomEvent);
}

/// Simple callback-based event handler.
///
/// Wraps a closure for easy event handling.
pub struct CallbackHandler<F>
where
    F: Fn(RoomEvent) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(RoomEvent) + Send + Sync,
{
    /// Creates a new callback handler.
    pub fn new(callback: F) -> Self {
        CallbackHandler { callback }
    }
}

impl<F> EventHandler for CallbackHandler<F>
where
    F: Fn(RoomEvent) + Send + Sync,
{
    fn on_event(&self, event: RoomEvent) {
        (self.callback)(event);
    }
}

/// Event dispatcher for managing multiple handlers.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    /// Creates a new event dispatcher.
    pub fn new() -> Self {
        EventDispatcher {
            handlers: Vec::new(),
        }
    }

    /// Adds an event handler.
    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    /// Removes all handlers.
    pub fn clear_handlers(&mut self) {
        self.handlers.clear();
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Dispatches an event to all handlers.
    pub fn dispatch(&self, event: RoomEvent) {
        for handler in &self.handlers {
            handler.on_event(event.clone());
        }
    }
}
