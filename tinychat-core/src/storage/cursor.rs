// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sync Cursor
//!
//! Persisted "last successful contact" timestamp used as the lower bound of
//! history replay.

use std::sync::Arc;

use super::error::StorageError;
use super::store::KeyValueStore;
use crate::network::current_time_millis;

/// Store key of the cursor.
pub const LAST_CONNECTED_KEY: &str = "lastTimeConnected";

/// Cursor value as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Never written (or written as 0).
    Unset,
    /// Last contact in milliseconds since the Unix epoch.
    Set(i64),
}

impl CursorState {
    /// Returns the timestamp if set.
    pub fn value(&self) -> Option<i64> {
        match self {
            CursorState::Unset => None,
            CursorState::Set(ts) => Some(*ts),
        }
    }
}

/// Watermark of the last successful contact with the server.
#[derive(Clone)]
pub struct SyncCursor {
    store: Arc<dyn KeyValueStore>,
}

impl SyncCursor {
    /// Creates a cursor over `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        SyncCursor { store }
    }

    /// Reads the cursor without initializing it.
    pub fn state(&self) -> Result<CursorState, StorageError> {
        Ok(match self.store.get_i64(LAST_CONNECTED_KEY)? {
            None | Some(0) => CursorState::Unset,
            Some(ts) => CursorState::Set(ts),
        })
    }

    /// Returns the cursor, initializing it to now if it was never set.
    pub fn get(&self) -> Result<i64, StorageError> {
        match self.state()? {
            CursorState::Set(ts) => Ok(ts),
            CursorState::Unset => self.set_now(),
        }
    }

    /// Advances the cursor to now and returns the stored value.
    ///
    /// A clock that went backwards never moves the cursor back.
    pub fn set_now(&self) -> Result<i64, StorageError> {
        let now = current_time_millis();
        let next = match self.state()? {
            CursorState::Set(ts) if ts > now => ts,
            _ => now,
        };
        self.store.set_i64(LAST_CONNECTED_KEY, next)?;
        Ok(next)
    }

    /// Overwrites the cursor with an explicit timestamp.
    pub fn set(&self, ts: i64) -> Result<(), StorageError> {
        self.store.set_i64(LAST_CONNECTED_KEY, ts)
    }
}
