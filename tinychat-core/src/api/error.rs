// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! API Error Types
//!
//! Unified error type for the TinyChat API layer.

use thiserror::Error;

use crate::network::NetworkError;
use crate::storage::StorageError;

/// Unified error type for TinyChat operations.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Network operation failed.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The room task has stopped.
    #[error("chat room is closed")]
    RoomClosed,
}

/// Result type alias for TinyChat operations.
pub type ChatResult<T> = Result<T, ChatError>;
