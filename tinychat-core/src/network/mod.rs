// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Network + Transport Layer
//!
//! Everything between the chat room and the raw byte channel.
//!
//! # Architecture
//!
//! The network layer consists of:
//! - **Transport trait**: byte channel to the server, with TCP and mock implementations
//! - **Reachability trait**: network path classification and change notifications
//! - **Message types**: JSON wire payloads
//! - **Framer**: splits the inbound character stream into message objects

mod error;
mod framer;
mod message;
mod mock;
mod reachability;
mod tcp;
mod transport;

// Error types
pub use error::NetworkError;

// Message types
pub use message::{
    current_time_millis, encode_history_request, encode_message, HistoryRequest, Message,
};

// Framing
pub use framer::JsonFramer;

// Transport abstraction
pub use transport::{
    Transport, TransportConfig, TransportListener, TransportResult, DEFAULT_MAX_READ_LENGTH,
    DEFAULT_SERVER_ADDR,
};

// Reachability
pub use reachability::{
    probe, MockReachability, Reachability, ReachabilityListener, ReachabilityStatus,
    TcpReachability,
};

// Mock transport for testing
pub use mock::MockTransport;

// TCP transport for production
pub use tcp::TcpTransport;
