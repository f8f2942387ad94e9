// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transport Trait
//!
//! Platform-agnostic abstraction for the byte channel to the chat server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::error::NetworkError;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, NetworkError>;

/// Default chat server endpoint.
pub const DEFAULT_SERVER_ADDR: &str = "52.91.109.76:1234";

/// Maximum number of bytes delivered per read.
pub const DEFAULT_MAX_READ_LENGTH: usize = 4 * 1024;

/// Configuration for transport connections.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Server address (`host:port`).
    pub server_addr: String,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Maximum bytes handed to the listener per read.
    pub max_read_length: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
            connect_timeout: Duration::from_secs(10),
            max_read_length: DEFAULT_MAX_READ_LENGTH,
        }
    }
}

impl TransportConfig {
    /// Creates a config for the given server address.
    pub fn new(server_addr: &str) -> Self {
        TransportConfig {
            server_addr: server_addr.to_string(),
            ..Default::default()
        }
    }
}

/// Receives events pushed by a transport.
///
/// Implementations must not keep the consumer alive; the chat room hands out
/// listeners that hold only a weak reference to its task.
pub trait TransportListener: Send + Sync {
    /// Called with each chunk of bytes read from the server.
    fn on_bytes_received(&self, bytes: &[u8]);

    /// Called when a connection has been established.
    fn on_connected(&self);

    /// Called when the connection is lost or closed by the peer.
    fn on_disconnected(&self);
}

/// Transport trait for the chat server connection.
///
/// Abstracts the underlying byte channel (TCP, TLS, ...) so the room can be
/// driven by a mock in tests.
///
/// # Example
///
/// ```ignore
/// use tinychat_core::network::{MockTransport, Transport};
///
/// let transport = MockTransport::new();
/// transport.connect(listener).await?;
/// transport.write(b"{\"since\":0}").await?;
/// transport.disconnect().await?;
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connects to the server and starts delivering events to `listener`.
    ///
    /// Calling this while already connected is a no-op.
    async fn connect(&self, listener: Arc<dyn TransportListener>) -> TransportResult<()>;

    /// Disconnects from the server.
    ///
    /// Safe to call even if not connected.
    async fn disconnect(&self) -> TransportResult<()>;

    /// Writes one complete payload.
    ///
    /// Blocks until the payload is written or the write fails.
    async fn write(&self, payload: &[u8]) -> TransportResult<()>;

    /// Returns the connected flag.
    fn is_connected(&self) -> bool;

    /// Overrides the connected flag from reachability results.
    fn set_connected(&self, connected: bool);
}
