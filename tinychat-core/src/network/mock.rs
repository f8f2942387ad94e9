// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock Transport
//!
//! In-memory transport for tests: records writes, scripts failures and lets
//! the test push inbound events through the registered listener.
//!
//! Like the TCP transport, writes need a completed `connect`; flipping the
//! flag with `set_connected(true)` alone does not open a connection.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::NetworkError;
use super::transport::{Transport, TransportListener, TransportResult};

#[derive(Default)]
struct MockState {
    connected: bool,
    /// A connect completed and no disconnect followed.
    open: bool,
    fail_connect: bool,
    fail_writes: bool,
    write_script: VecDeque<bool>,
    written: Vec<Vec<u8>>,
    write_attempts: usize,
    connect_count: usize,
    disconnect_count: usize,
    listener: Option<Arc<dyn TransportListener>>,
}

/// Mock transport for testing.
#[derive(Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
}

impl MockTransport {
    /// Creates a disconnected mock whose connects and writes succeed.
    pub fn new() -> Self {
        MockTransport::default()
    }

    /// Makes subsequent `connect` calls fail.
    pub fn set_fail_connect(&self, fail: bool) {
        self.state.lock().fail_connect = fail;
    }

    /// Makes every write fail (unless scripted).
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Queues per-write outcomes, consumed one per write attempt.
    pub fn script_writes(&self, outcomes: impl IntoIterator<Item = bool>) {
        self.state.lock().write_script.extend(outcomes);
    }

    /// Returns successfully written payloads in order.
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.state.lock().written.clone()
    }

    /// Returns successfully written payloads parsed as JSON.
    pub fn written_json(&self) -> Vec<serde_json::Value> {
        self.state
            .lock()
            .written
            .iter()
            .filter_map(|payload| serde_json::from_slice(payload).ok())
            .collect()
    }

    /// Returns the number of write attempts, successful or not.
    pub fn write_attempts(&self) -> usize {
        self.state.lock().write_attempts
    }

    /// Returns the number of successful connects.
    pub fn connect_count(&self) -> usize {
        self.state.lock().connect_count
    }

    /// Returns the number of disconnects.
    pub fn disconnect_count(&self) -> usize {
        self.state.lock().disconnect_count
    }

    /// Clears recorded writes.
    pub fn clear_written(&self) {
        let mut state = self.state.lock();
        state.written.clear();
        state.write_attempts = 0;
    }

    /// Delivers inbound bytes to the listener.
    pub fn deliver(&self, bytes: &[u8]) {
        if let Some(listener) = self.listener() {
            listener.on_bytes_received(bytes);
        }
    }

    /// Simulates a socket-level connect.
    pub fn simulate_connected(&self) {
        {
            let mut state = self.state.lock();
            state.connected = true;
            state.open = true;
        }
        if let Some(listener) = self.listener() {
            listener.on_connected();
        }
    }

    /// Simulates the peer closing the connection.
    pub fn simulate_disconnected(&self) {
        {
            let mut state = self.state.lock();
            state.connected = false;
            state.open = false;
        }
        if let Some(listener) = self.listener() {
            listener.on_disconnected();
        }
    }

    fn listener(&self) -> Option<Arc<dyn TransportListener>> {
        self.state.lock().listener.clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, listener: Arc<dyn TransportListener>) -> TransportResult<()> {
        {
            let mut state = self.state.lock();
            state.listener = Some(listener.clone());
            if state.fail_connect {
                return Err(NetworkError::ConnectionFailed("mock connect failure".into()));
            }
            if state.connected && state.open {
                return Ok(());
            }
            state.connected = true;
            state.open = true;
            state.connect_count += 1;
        }
        listener.on_connected();
        Ok(())
    }

    async fn disconnect(&self) -> TransportResult<()> {
        let mut state = self.state.lock();
        state.connected = false;
        state.open = false;
        state.disconnect_count += 1;
        Ok(())
    }

    async fn write(&self, payload: &[u8]) -> TransportResult<()> {
        let mut state = self.state.lock();
        state.write_attempts += 1;
        if !state.connected || !state.open {
            return Err(NetworkError::NotConnected);
        }
        let succeed = match state.write_script.pop_front() {
            Some(outcome) => outcome,
            None => !state.fail_writes,
        };
        if !succeed {
            return Err(NetworkError::SendFailed("mock write failure".into()));
        }
        state.written.push(payload.to_vec());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    fn set_connected(&self, connected: bool) {
        self.state.lock().connected = connected;
    }
}
