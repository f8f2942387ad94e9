// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Outgoing Message Queue
//!
//! Messages composed while the server was unreachable, persisted as a JSON
//! array. The file exists exactly when the queue is non-empty. Writes go
//! straight to the file with no rename step, so a crash mid-write can lose
//! the queue; queued chat messages are treated as perishable.

use std::fs;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::error::StorageError;
use crate::network::Message;

/// File name of the persisted queue inside the data directory.
pub const OUTGOING_MESSAGES_FILE: &str = "OutgoingMessages.json";

/// Result of a flush attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushOutcome {
    /// Messages delivered and removed from the queue.
    pub sent: usize,
    /// Messages that failed and remain queued.
    pub failed: usize,
}

/// Ordered, disk-backed queue of undelivered messages.
#[derive(Debug)]
pub struct OutgoingQueue {
    path: PathBuf,
    messages: Vec<Message>,
}

impl OutgoingQueue {
    /// Creates an empty queue persisted at `path` without touching the disk.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        OutgoingQueue {
            path: path.as_ref().to_path_buf(),
            messages: Vec::new(),
        }
    }

    /// Loads the queue persisted at `path`.
    ///
    /// A missing, unreadable or corrupt file yields an empty queue.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let mut queue = OutgoingQueue::new(path);
        match fs::read(&queue.path) {
            Ok(data) => match serde_json::from_slice::<Vec<Message>>(&data) {
                Ok(messages) => {
                    info!(count = messages.len(), "Loaded outgoing messages");
                    queue.messages = messages;
                }
                Err(e) => {
                    warn!(path = %queue.path.display(), error = %e, "Discarding unreadable outgoing queue");
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %queue.path.display(), error = %e, "Failed to read outgoing queue");
            }
        }
        queue
    }

    /// Appends a message and persists the whole queue.
    ///
    /// The message stays queued in memory even if persisting fails.
    pub fn append(&mut self, message: Message) -> Result<(), StorageError> {
        self.messages.push(message);
        self.persist()
    }

    /// Attempts to send every queued message in order.
    ///
    /// Afterwards the queue holds exactly the messages for which `send`
    /// returned `false`, in their original relative order, and the file
    /// reflects that subset (or is removed when nothing failed).
    pub async fn flush<F, Fut>(&mut self, mut send: F) -> FlushOutcome
    where
        F: FnMut(Message) -> Fut,
        Fut: Future<Output = bool>,
    {
        if self.messages.is_empty() {
            return FlushOutcome::default();
        }

        let pending = std::mem::take(&mut self.messages);
        let mut failed = Vec::new();
        let mut sent = 0;

        for message in pending {
            if send(message.clone()).await {
                sent += 1;
            } else {
                failed.push(message);
            }
        }

        let outcome = FlushOutcome {
            sent,
            failed: failed.len(),
        };
        self.messages = failed;
        if let Err(e) = self.persist() {
            warn!(error = %e, "Failed to persist outgoing queue after flush");
        }
        debug!(sent = outcome.sent, failed = outcome.failed, "Flushed outgoing queue");
        outcome
    }

    /// Removes every queued message and the backing file.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.messages.clear();
        self.persist()
    }

    /// Returns the queued messages in send order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of queued messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StorageError> {
        if self.messages.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec(&self.messages)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
