// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for network::message

use tinychat_core::network::{
    current_time_millis, encode_history_request, encode_message, HistoryRequest, Message,
};

#[test]
fn test_message_wire_shape() {
    let payload = encode_message(&Message::with_time("hi", 1_700_000_000_000)).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&payload).unwrap();

    assert_eq!(
        value,
        serde_json::json!({ "msg": "hi", "client_time": 1_700_000_000_000i64 })
    );
}

#[test]
fn test_history_request_wire_shape() {
    let payload = encode_history_request(&HistoryRequest { since: 42 }).unwrap();
    assert_eq!(payload, br#"{"since":42}"#.to_vec());
}

#[test]
fn test_message_new_stamps_current_time() {
    let before = current_time_millis();
    let message = Message::new("now");
    let after = current_time_millis();

    assert!(message.client_time >= before && message.client_time <= after);
}

#[test]
fn test_decode_accepts_float_client_time() {
    let message: Message = serde_json::from_str(r#"{"msg":"x","client_time":12.75}"#).unwrap();
    assert_eq!(message.client_time, 12);
}

#[test]
fn test_decode_rejects_missing_fields() {
    assert!(serde_json::from_str::<Message>(r#"{"msg":"x"}"#).is_err());
    assert!(serde_json::from_str::<Message>(r#"{"client_time":1}"#).is_err());
}

#[test]
fn test_decode_ignores_unknown_fields() {
    let message: Message =
        serde_json::from_str(r#"{"msg":"x","client_time":1,"room":"lobby"}"#).unwrap();
    assert_eq!(message, Message::with_time("x", 1));
}

#[test]
fn test_queue_file_format_round_trips() {
    let queue = vec![Message::with_time("a", 1), Message::with_time("b", 2)];
    let json = serde_json::to_string(&queue).unwrap();

    assert_eq!(
        json,
        r#"[{"msg":"a","client_time":1},{"msg":"b","client_time":2}]"#
    );
    let back: Vec<Message> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, queue);
}
