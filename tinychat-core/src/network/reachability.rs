// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reachability Monitor
//!
//! Classifies the network path to the chat server and notifies a listener
//! when the classification changes.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info};

/// Reachability classification of the chat server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReachabilityStatus {
    /// No usable path to the server.
    #[default]
    NotReachable,
    /// Reachable through a local network interface.
    ReachableViaLocalNetwork,
    /// Reachable through a wide-area network.
    ReachableViaWideArea,
}

impl ReachabilityStatus {
    /// Returns true for either reachable classification.
    pub fn is_reachable(&self) -> bool {
        !matches!(self, ReachabilityStatus::NotReachable)
    }
}

/// Receives reachability change notifications.
pub trait ReachabilityListener: Send + Sync {
    /// Called when the classification changes.
    fn on_reachability_changed(&self, status: ReachabilityStatus);
}

/// Source of reachability information.
pub trait Reachability: Send + Sync {
    /// Returns the last known classification without blocking.
    fn current_status(&self) -> ReachabilityStatus;

    /// Starts delivering change notifications to `listener`.
    fn start_notifier(&self, listener: Arc<dyn ReachabilityListener>);

    /// Stops delivering change notifications.
    fn stop_notifier(&self);
}

/// Probes the server with TCP connects.
///
/// The notifier task probes every `interval`; [`current_status`] reads the
/// cached result of the last probe.
///
/// [`current_status`]: Reachability::current_status
pub struct TcpReachability {
    server_addr: String,
    interval: Duration,
    timeout: Duration,
    status: Arc<Mutex<ReachabilityStatus>>,
    notifier: Mutex<Option<JoinHandle<()>>>,
}

impl TcpReachability {
    /// Creates a monitor for `server_addr` (`host:port`).
    pub fn new(server_addr: &str, interval: Duration, timeout: Duration) -> Self {
        TcpReachability {
            server_addr: server_addr.to_string(),
            interval,
            timeout,
            status: Arc::new(Mutex::new(ReachabilityStatus::default())),
            notifier: Mutex::new(None),
        }
    }
}

impl Reachability for TcpReachability {
    fn current_status(&self) -> ReachabilityStatus {
        *self.status.lock()
    }

    fn start_notifier(&self, listener: Arc<dyn ReachabilityListener>) {
        let mut notifier = self.notifier.lock();
        if notifier.is_some() {
            return;
        }

        let server_addr = self.server_addr.clone();
        let probe_timeout = self.timeout;
        let status = self.status.clone();
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        *notifier = Some(tokio::spawn(async move {
            loop {
                ticker.tick().await;
                let next = probe(&server_addr, probe_timeout).await;
                let changed = {
                    let mut current = status.lock();
                    let changed = *current != next;
                    *current = next;
                    changed
                };
                if changed {
                    info!(status = ?next, "Reachability changed");
                    listener.on_reachability_changed(next);
                }
            }
        }));
    }

    fn stop_notifier(&self) {
        if let Some(handle) = self.notifier.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for TcpReachability {
    fn drop(&mut self) {
        self.stop_notifier();
    }
}

/// Probes `server_addr` once and classifies the result.
pub async fn probe(server_addr: &str, probe_timeout: Duration) -> ReachabilityStatus {
    let stream = match timeout(probe_timeout, TcpStream::connect(server_addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            debug!(addr = server_addr, error = %e, "Probe failed");
            return ReachabilityStatus::NotReachable;
        }
        Err(_) => {
            debug!(addr = server_addr, "Probe timed out");
            return ReachabilityStatus::NotReachable;
        }
    };

    match stream.local_addr() {
        Ok(local) if is_local_network(local.ip()) => ReachabilityStatus::ReachableViaLocalNetwork,
        _ => ReachabilityStatus::ReachableViaWideArea,
    }
}

fn is_local_network(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_loopback() || v4.is_private() || v4.is_link_local(),
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
        }
    }
}

/// Reachability with a settable status (for testing).
#[derive(Default)]
pub struct MockReachability {
    status: Mutex<ReachabilityStatus>,
    listener: Mutex<Option<Arc<dyn ReachabilityListener>>>,
}

impl MockReachability {
    /// Creates a mock reporting `status`.
    pub fn new(status: ReachabilityStatus) -> Self {
        MockReachability {
            status: Mutex::new(status),
            listener: Mutex::new(None),
        }
    }

    /// Changes the reported status without notifying.
    pub fn set_status(&self, status: ReachabilityStatus) {
        *self.status.lock() = status;
    }

    /// Changes the status and notifies the listener, if one is registered.
    pub fn change_status(&self, status: ReachabilityStatus) {
        self.set_status(status);
        let listener = self.listener.lock().clone();
        if let Some(listener) = listener {
            listener.on_reachability_changed(status);
        }
    }

    /// Returns true while a notifier is registered.
    pub fn is_notifying(&self) -> bool {
        self.listener.lock().is_some()
    }
}

impl Reachability for MockReachability {
    fn current_status(&self) -> ReachabilityStatus {
        *self.status.lock()
    }

    fn start_notifier(&self, listener: Arc<dyn ReachabilityListener>) {
        *self.listener.lock() = Some(listener);
    }

    fn stop_notifier(&self) {
        self.listener.lock().take();
    }
}
