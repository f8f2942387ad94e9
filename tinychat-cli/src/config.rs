// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI Configuration

use std::path::PathBuf;
use std::time::Duration;

use tinychat_core::ChatConfig;

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Data directory for the outgoing queue and settings.
    pub data_dir: PathBuf,
    /// Chat server address.
    pub server_addr: String,
    /// Reachability probe interval in seconds.
    pub probe_interval_secs: u64,
}

impl CliConfig {
    /// Resolves the data directory, defaulting to the platform data dir.
    pub fn resolve_data_dir(data_dir: Option<PathBuf>) -> PathBuf {
        data_dir.unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("tinychat")
        })
    }

    /// Builds the chat room configuration.
    pub fn chat_config(&self) -> ChatConfig {
        let mut config = ChatConfig::with_data_dir(&self.data_dir);
        config.server_addr = self.server_addr.clone();
        config.probe_interval = Duration::from_secs(self.probe_interval_secs.max(1));
        config
    }
}
