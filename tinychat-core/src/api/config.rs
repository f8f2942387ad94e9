// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration
//!
//! Runtime settings for a chat room, with environment overrides.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::network::{TransportConfig, DEFAULT_MAX_READ_LENGTH, DEFAULT_SERVER_ADDR};
use crate::storage::OUTGOING_MESSAGES_FILE;

/// File name of the settings store inside the data directory.
pub const PREFERENCES_FILE: &str = "preferences.json";

/// Chat room configuration.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Chat server address (`host:port`).
    pub server_addr: String,
    /// Directory holding the outgoing queue and settings.
    pub data_dir: PathBuf,
    /// Interval of the periodic reachability probe.
    pub probe_interval: Duration,
    /// Transport connect timeout.
    pub connect_timeout: Duration,
    /// Maximum bytes read from the server at once.
    pub max_read_length: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig {
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
            data_dir: PathBuf::from("tinychat_data"),
            probe_interval: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(10),
            max_read_length: DEFAULT_MAX_READ_LENGTH,
        }
    }
}

impl ChatConfig {
    /// Creates a config with defaults and the given data directory.
    pub fn with_data_dir<P: Into<PathBuf>>(data_dir: P) -> Self {
        ChatConfig {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Loads defaults overridden by environment variables.
    ///
    /// - `TINYCHAT_SERVER`: server address
    /// - `TINYCHAT_DATA_DIR`: data directory
    /// - `TINYCHAT_PROBE_INTERVAL_SECS`: probe interval in seconds
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ChatConfig::from_env`] with an explicit variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ChatConfig::default();

        if let Some(server) = lookup("TINYCHAT_SERVER") {
            config.server_addr = server;
        }
        if let Some(dir) = lookup("TINYCHAT_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup("TINYCHAT_PROBE_INTERVAL_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) if secs > 0 => config.probe_interval = Duration::from_secs(secs),
                _ => warn!(value = %secs, "Ignoring invalid TINYCHAT_PROBE_INTERVAL_SECS"),
            }
        }

        config
    }

    /// Returns the outgoing queue file path.
    pub fn outgoing_path(&self) -> PathBuf {
        self.data_dir.join(OUTGOING_MESSAGES_FILE)
    }

    /// Returns the settings store file path.
    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join(PREFERENCES_FILE)
    }

    /// Returns the transport configuration.
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            server_addr: self.server_addr.clone(),
            connect_timeout: self.connect_timeout,
            max_read_length: self.max_read_length,
        }
    }
}
