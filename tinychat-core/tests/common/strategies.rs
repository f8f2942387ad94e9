// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Proptest Strategies

use proptest::prelude::*;
use tinychat_core::Message;

/// Message text the framer can carry: no braces, quotes, backslashes or newlines.
pub fn message_text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ,.!?:-]{0,40}"
}

/// Client timestamps in a realistic range.
pub fn client_time_strategy() -> impl Strategy<Value = i64> {
    1_000_000_000_000i64..2_000_000_000_000i64
}

/// A single well-formed message.
pub fn message_strategy() -> impl Strategy<Value = Message> {
    (message_text_strategy(), client_time_strategy())
        .prop_map(|(text, ts)| Message::with_time(text, ts))
}

/// Encodes a message the way the server does: single quotes instead of double.
pub fn server_encoding(message: &Message) -> String {
    format!(
        "{{'msg':'{}','client_time':{}}}",
        message.text, message.client_time
    )
}
