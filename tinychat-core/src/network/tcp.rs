// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! TCP Transport
//!
//! Real transport implementation over a plain tokio TCP stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::error::NetworkError;
use super::transport::{Transport, TransportConfig, TransportListener, TransportResult};

/// An open connection: the write half plus the task pumping the read half.
struct Connection {
    writer: OwnedWriteHalf,
    reader: JoinHandle<()>,
}

/// TCP transport for the chat server.
///
/// # Example
///
/// ```ignore
/// use tinychat_core::network::{TcpTransport, TransportConfig};
///
/// let transport = TcpTransport::new(TransportConfig::new("127.0.0.1:1234"));
/// transport.connect(listener).await?;
/// ```
pub struct TcpTransport {
    config: TransportConfig,
    connection: Mutex<Option<Connection>>,
    connected: Arc<AtomicBool>,
}

impl TcpTransport {
    /// Creates a disconnected transport.
    pub fn new(config: TransportConfig) -> Self {
        TcpTransport {
            config,
            connection: Mutex::new(None),
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&self, listener: Arc<dyn TransportListener>) -> TransportResult<()> {
        let mut connection = self.connection.lock().await;
        if let Some(existing) = connection.take() {
            if !existing.reader.is_finished() && self.is_connected() {
                *connection = Some(existing);
                return Ok(());
            }
            // Marked down by the owner or closed by the peer: start over.
            existing.reader.abort();
        }

        let addr = &self.config.server_addr;
        let stream = timeout(self.config.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| NetworkError::Timeout(self.config.connect_timeout.as_millis() as u64))?
            .map_err(|e| NetworkError::ConnectionFailed(format!("{}: {}", addr, e)))?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!(error = %e, "Failed to set TCP_NODELAY");
        }

        let (mut read_half, writer) = stream.into_split();
        self.connected.store(true, Ordering::SeqCst);
        info!(addr = %addr, "Connected to chat server");

        // Connected must reach the listener before any bytes do.
        listener.on_connected();

        let connected = self.connected.clone();
        let max_read_length = self.config.max_read_length.max(1);
        let reader = tokio::spawn(async move {
            let mut buf = vec![0u8; max_read_length];
            loop {
                match read_half.read(&mut buf).await {
                    Ok(0) => {
                        info!("Chat server closed the connection");
                        break;
                    }
                    Ok(n) => listener.on_bytes_received(&buf[..n]),
                    Err(e) => {
                        warn!(error = %e, "Read from chat server failed");
                        break;
                    }
                }
            }
            connected.store(false, Ordering::SeqCst);
            listener.on_disconnected();
        });

        *connection = Some(Connection { writer, reader });
        Ok(())
    }

    async fn disconnect(&self) -> TransportResult<()> {
        let mut connection = self.connection.lock().await;
        self.connected.store(false, Ordering::SeqCst);
        if let Some(mut conn) = connection.take() {
            conn.reader.abort();
            if let Err(e) = conn.writer.shutdown().await {
                debug!(error = %e, "Shutdown of write half failed");
            }
            info!("Disconnected from chat server");
        }
        Ok(())
    }

    async fn write(&self, payload: &[u8]) -> TransportResult<()> {
        let mut connection = self.connection.lock().await;
        let conn = connection.as_mut().ok_or(NetworkError::NotConnected)?;

        let result = async {
            conn.writer.write_all(payload).await?;
            conn.writer.flush().await
        }
        .await;

        result.map_err(|e| {
            self.connected.store(false, Ordering::SeqCst);
            NetworkError::SendFailed(e.to_string())
        })
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }
}
