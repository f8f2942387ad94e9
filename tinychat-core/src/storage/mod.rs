// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Persistent Storage Module
//!
//! Local state that survives restarts: the outgoing message queue (a JSON
//! file) and the sync cursor (an entry in a key-value settings store).

mod cursor;
mod error;
mod outgoing;
mod store;

pub use cursor::{CursorState, SyncCursor, LAST_CONNECTED_KEY};
pub use error::StorageError;
pub use outgoing::{FlushOutcome, OutgoingQueue, OUTGOING_MESSAGES_FILE};
pub use store::{FileStore, KeyValueStore, MemoryStore};
