// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! JSON Object Framer
//!
//! Splits the server's byte stream into individual message objects.
//!
//! The server writes `{...}` objects back to back, with optional newlines
//! between them and single quotes in place of double quotes. Framing is
//! deliberately naive: every `}` ends a candidate object. A candidate that
//! fails to decode is dropped and framing continues with the next character,
//! so one malformed object costs exactly one message and never stalls the
//! stream.
//!
//! # Known defect
//!
//! A literal `}` inside message text is indistinguishable from the closing
//! brace, so such a message is cut short and dropped. The same holds for a
//! literal `'` in text, which quote normalization turns into `"`. The wire
//! protocol has no escaping scheme that would let the framer tell them apart.

use tracing::{debug, warn};

use super::message::Message;

/// Incremental framer over the inbound character stream.
#[derive(Debug, Default)]
pub struct JsonFramer {
    /// Prefix of the object currently being received. Never holds newlines.
    buffer: String,
    /// Trailing bytes of an incomplete UTF-8 sequence from the last read.
    pending: Vec<u8>,
}

impl JsonFramer {
    /// Creates an empty framer.
    pub fn new() -> Self {
        JsonFramer::default()
    }

    /// Feeds a chunk of text and returns every message it completes.
    pub fn feed(&mut self, chunk: &str) -> Vec<Message> {
        let normalized = chunk.replace('\'', "\"");
        let mut messages = Vec::new();

        for ch in normalized.chars() {
            if ch == '\n' {
                continue;
            }
            self.buffer.push(ch);
            if ch != '}' {
                continue;
            }

            match serde_json::from_str::<Message>(&self.buffer) {
                Ok(message) => {
                    debug!(client_time = message.client_time, "Decoded message");
                    messages.push(message);
                }
                Err(e) => {
                    warn!(candidate = %self.buffer, error = %e, "Dropping malformed object");
                }
            }
            self.buffer.clear();
        }

        messages
    }

    /// Feeds raw bytes from the transport.
    ///
    /// An incomplete UTF-8 sequence at the end of `bytes` is held back until
    /// the next call; invalid sequences are replaced with U+FFFD.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Vec<Message> {
        self.pending.extend_from_slice(bytes);

        let mut text = String::with_capacity(self.pending.len());
        let mut rest: &[u8] = &self.pending;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    text.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }
        let carry = rest.to_vec();
        self.pending = carry;

        self.feed(&text)
    }

    /// Returns the partial object received so far.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Discards any partial object and held-back bytes.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.pending.clear();
    }
}

// INLINE_TEST_REQUIRED: Tests private pending byte carry-over between reads
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_utf8_sequence_is_carried_over() {
        let mut framer = JsonFramer::new();
        let payload = "{\"msg\":\"caf\u{e9}\",\"client_time\":1}".as_bytes();
        let split = payload
            .iter()
            .position(|&b| b == 0xC3)
            .map(|i| i + 1)
            .unwrap();

        assert!(framer.feed_bytes(&payload[..split]).is_empty());
        assert_eq!(framer.pending, vec![0xC3]);

        let messages = framer.feed_bytes(&payload[split..]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "caf\u{e9}");
        assert!(framer.pending.is_empty());
    }

    #[test]
    fn test_invalid_bytes_are_replaced() {
        let mut framer = JsonFramer::new();
        let mut payload = b"{\"msg\":\"a".to_vec();
        payload.push(0xFF);
        payload.extend_from_slice(b"b\",\"client_time\":2}");

        let messages = framer.feed_bytes(&payload);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "a\u{fffd}b");
        assert!(framer.pending.is_empty());
    }

    #[test]
    fn test_reset_clears_pending_bytes() {
        let mut framer = JsonFramer::new();
        framer.feed_bytes(&[b'{', b'"', 0xE2, 0x82]);
        assert_eq!(framer.buffered(), "{\"");
        assert_eq!(framer.pending.len(), 2);

        framer.reset();
        assert_eq!(framer.buffered(), "");
        assert!(framer.pending.is_empty());
    }
}
