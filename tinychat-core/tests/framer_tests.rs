// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for network::framer

mod common;

use common::strategies::*;
use proptest::prelude::*;
use tinychat_core::network::{JsonFramer, Message};

#[test]
fn test_single_quoted_object() {
    let mut framer = JsonFramer::new();
    let messages = framer.feed("{'msg':'hello','client_time':1700000000000}");

    assert_eq!(messages, vec![Message::with_time("hello", 1_700_000_000_000)]);
    assert!(framer.buffered().is_empty());
}

#[test]
fn test_back_to_back_objects_with_newlines() {
    let mut framer = JsonFramer::new();
    let messages = framer.feed(
        "{\"msg\":\"a\",\"client_time\":1}\n{\"msg\":\"b\",\n\"client_time\":2}{\"msg\":\"c\",\"client_time\":3}\n",
    );

    let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["a", "b", "c"]);
}

#[test]
fn test_object_split_across_chunks() {
    let mut framer = JsonFramer::new();

    assert!(framer.feed("{'msg':'hel").is_empty());
    assert_eq!(framer.buffered(), "{\"msg\":\"hel");
    assert!(framer.feed("lo','client_").is_empty());

    let messages = framer.feed("time':5}");
    assert_eq!(messages, vec![Message::with_time("hello", 5)]);
}

#[test]
fn test_malformed_object_is_dropped_and_framing_continues() {
    let mut framer = JsonFramer::new();
    let messages = framer.feed("{'msg':'good','client_time':1}{not json}{'msg':'next','client_time':2}");

    let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["good", "next"]);
}

#[test]
fn test_object_missing_fields_is_dropped() {
    let mut framer = JsonFramer::new();
    assert!(framer.feed("{'msg':'no time'}").is_empty());
    assert!(framer.feed("{'since':5}").is_empty());
    assert!(framer.buffered().is_empty());
}

#[test]
fn test_truncated_object_resyncs_on_next_brace() {
    let mut framer = JsonFramer::new();

    // Connection cut mid-object: the partial prefix merges with the next
    // object and both are lost, after which framing is back in step.
    let messages = framer.feed("{'msg':'cut{'msg':'lost','client_time':1}{'msg':'ok','client_time':2}");

    assert_eq!(messages, vec![Message::with_time("ok", 2)]);
}

#[test]
fn test_brace_in_text_loses_message() {
    let mut framer = JsonFramer::new();
    let messages = framer.feed("{'msg':'smile :}','client_time':1}{'msg':'after','client_time':2}");

    // Known limitation: the first `}` ends the candidate early.
    let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["after"]);
}

#[test]
fn test_float_client_time_is_truncated() {
    let mut framer = JsonFramer::new();
    let messages = framer.feed("{'msg':'x','client_time':1700000000123.9}");
    assert_eq!(messages[0].client_time, 1_700_000_000_123);
}

#[test]
fn test_feed_bytes_matches_feed() {
    let mut framer = JsonFramer::new();
    let messages = framer.feed_bytes("{'msg':'ünïcødé','client_time':9}".as_bytes());
    assert_eq!(messages, vec![Message::with_time("ünïcødé", 9)]);
}

#[test]
fn test_reset_discards_partial_object() {
    let mut framer = JsonFramer::new();
    framer.feed("{'msg':'partial");
    framer.reset();

    assert!(framer.buffered().is_empty());
    assert_eq!(
        framer.feed("{'msg':'whole','client_time':1}"),
        vec![Message::with_time("whole", 1)]
    );
}

proptest! {
    #[test]
    fn prop_newlines_between_objects_are_ignored(
        messages in prop::collection::vec(message_strategy(), 1..8),
        newlines in prop::collection::vec(0usize..3, 8),
    ) {
        let mut stream = String::new();
        for (i, message) in messages.iter().enumerate() {
            stream.push_str(&server_encoding(message));
            stream.push_str(&"\n".repeat(newlines[i]));
        }

        let mut framer = JsonFramer::new();
        prop_assert_eq!(framer.feed(&stream), messages);
    }

    #[test]
    fn prop_chunking_does_not_change_output(
        messages in prop::collection::vec(message_strategy(), 1..6),
        split in any::<prop::sample::Index>(),
    ) {
        let stream: String = messages.iter().map(server_encoding).collect();
        let at = split.index(stream.len() + 1);
        // Server encoding is ASCII, so any byte index is a char boundary.
        let (head, tail) = stream.split_at(at);

        let mut framer = JsonFramer::new();
        let mut decoded = framer.feed(head);
        decoded.extend(framer.feed(tail));
        prop_assert_eq!(decoded, messages);
    }

    #[test]
    fn prop_one_malformed_object_costs_one_message(
        before in prop::collection::vec(message_strategy(), 0..4),
        after in prop::collection::vec(message_strategy(), 0..4),
        garbage in "[a-z ]{0,20}",
    ) {
        let mut stream: String = before.iter().map(server_encoding).collect();
        stream.push('{');
        stream.push_str(&garbage);
        stream.push('}');
        stream.extend(after.iter().map(server_encoding));

        let mut framer = JsonFramer::new();
        let mut expected = before.clone();
        expected.extend(after.iter().cloned());
        prop_assert_eq!(framer.feed(&stream), expected);
    }
}
