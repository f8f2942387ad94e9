// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Key-Value Store
//!
//! Small process-wide settings store for integer values such as the sync
//! cursor. Injected into the room so tests can use [`MemoryStore`].

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::warn;

use super::error::StorageError;

/// Persistent key-value store for integer settings.
pub trait KeyValueStore: Send + Sync {
    /// Reads a value, `None` if the key was never written.
    fn get_i64(&self, key: &str) -> Result<Option<i64>, StorageError>;

    /// Writes a value, replacing any previous one.
    fn set_i64(&self, key: &str, value: i64) -> Result<(), StorageError>;
}

/// In-memory store (for testing).
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, i64>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_i64(&self, key: &str) -> Result<Option<i64>, StorageError> {
        Ok(self.values.lock().get(key).copied())
    }

    fn set_i64(&self, key: &str, value: i64) -> Result<(), StorageError> {
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }
}

/// JSON-file backed store.
///
/// The whole map is rewritten on every `set_i64`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, i64>>,
}

impl FileStore {
    /// Opens the store at `path`, creating it lazily on first write.
    ///
    /// An unreadable or corrupt file is logged and treated as empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read(&path) {
            Ok(data) => serde_json::from_slice(&data).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring corrupt preferences file");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read preferences file");
                BTreeMap::new()
            }
        };

        FileStore {
            path,
            values: Mutex::new(values),
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get_i64(&self, key: &str) -> Result<Option<i64>, StorageError> {
        Ok(self.values.lock().get(key).copied())
    }

    fn set_i64(&self, key: &str, value: i64) -> Result<(), StorageError> {
        let mut values = self.values.lock();
        values.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&*values)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
