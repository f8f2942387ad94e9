// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Wire Message Types
//!
//! JSON payloads exchanged with the chat server:
//! - chat messages: `{"msg": "<text>", "client_time": <ms>}`
//! - history requests: `{"since": <ms>}`

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serialize};

use super::error::NetworkError;

/// A chat message, either composed locally or decoded from the server.
///
/// Messages carry no identity; duplicates are tolerated and never merged.
/// `PartialEq` compares the fields and exists for tests only. The outgoing
/// queue and the inbound path never use it to deduplicate, so two equal
/// messages are both queued and both sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message text.
    #[serde(rename = "msg")]
    pub text: String,
    /// Client timestamp in milliseconds since the Unix epoch.
    #[serde(deserialize_with = "deserialize_millis")]
    pub client_time: i64,
}

impl Message {
    /// Creates a message stamped with the current time.
    pub fn new(text: impl Into<String>) -> Self {
        Message {
            text: text.into(),
            client_time: current_time_millis(),
        }
    }

    /// Creates a message with an explicit timestamp.
    pub fn with_time(text: impl Into<String>, client_time: i64) -> Self {
        Message {
            text: text.into(),
            client_time,
        }
    }
}

/// Request for all messages newer than `since`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRequest {
    /// Lower bound in milliseconds since the Unix epoch.
    pub since: i64,
}

/// Encodes a chat message for the wire.
pub fn encode_message(message: &Message) -> Result<Vec<u8>, NetworkError> {
    Ok(serde_json::to_vec(message)?)
}

/// Encodes a history request for the wire.
pub fn encode_history_request(request: &HistoryRequest) -> Result<Vec<u8>, NetworkError> {
    Ok(serde_json::to_vec(request)?)
}

/// Returns the wall clock in milliseconds since the Unix epoch.
pub fn current_time_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Older clients and the server may send `client_time` as a double.
fn deserialize_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Millis {
        Int(i64),
        Float(f64),
    }

    match Millis::deserialize(deserializer)? {
        Millis::Int(ms) => Ok(ms),
        Millis::Float(ms) if ms.is_finite() => Ok(ms.trunc() as i64),
        Millis::Float(_) => Err(serde::de::Error::custom("client_time is not finite")),
    }
}
