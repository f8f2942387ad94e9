// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for storage::outgoing

use std::fs;

use tempfile::TempDir;
use tinychat_core::network::Message;
use tinychat_core::storage::{FlushOutcome, OutgoingQueue, OUTGOING_MESSAGES_FILE};

fn queue_in(dir: &TempDir) -> OutgoingQueue {
    OutgoingQueue::load(dir.path().join(OUTGOING_MESSAGES_FILE))
}

#[test]
fn test_load_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let queue = queue_in(&dir);
    assert!(queue.is_empty());
}

#[test]
fn test_load_corrupt_file_is_empty() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(OUTGOING_MESSAGES_FILE), b"{ not a list").unwrap();

    let queue = queue_in(&dir);
    assert!(queue.is_empty());
}

#[test]
fn test_append_persists_whole_queue() {
    let dir = TempDir::new().unwrap();
    let mut queue = queue_in(&dir);

    queue.append(Message::with_time("first", 1)).unwrap();
    queue.append(Message::with_time("second", 2)).unwrap();

    let reloaded = queue_in(&dir);
    assert_eq!(reloaded.messages(), queue.messages());
    assert_eq!(reloaded.len(), 2);
}

#[test]
fn test_append_creates_missing_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join(OUTGOING_MESSAGES_FILE);
    let mut queue = OutgoingQueue::new(&path);

    queue.append(Message::with_time("x", 1)).unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn test_flush_all_success_removes_file() {
    let dir = TempDir::new().unwrap();
    let mut queue = queue_in(&dir);
    queue.append(Message::with_time("a", 1)).unwrap();
    queue.append(Message::with_time("b", 2)).unwrap();

    let mut seen = Vec::new();
    let outcome = queue
        .flush(|message| {
            seen.push(message.text);
            async { true }
        })
        .await;

    assert_eq!(outcome, FlushOutcome { sent: 2, failed: 0 });
    assert_eq!(seen, vec!["a", "b"]);
    assert!(queue.is_empty());
    assert!(!queue.path().exists());
}

#[tokio::test]
async fn test_identical_messages_are_never_merged() {
    let dir = TempDir::new().unwrap();
    let mut queue = queue_in(&dir);
    queue.append(Message::with_time("same", 7)).unwrap();
    queue.append(Message::with_time("same", 7)).unwrap();
    assert_eq!(queue_in(&dir).len(), 2);

    let mut seen = Vec::new();
    let outcome = queue
        .flush(|message| {
            seen.push((message.text, message.client_time));
            async { true }
        })
        .await;

    assert_eq!(outcome, FlushOutcome { sent: 2, failed: 0 });
    assert_eq!(seen, vec![("same".to_string(), 7), ("same".to_string(), 7)]);
}

#[tokio::test]
async fn test_flush_all_failure_keeps_everything() {
    let dir = TempDir::new().unwrap();
    let mut queue = queue_in(&dir);
    queue.append(Message::with_time("stuck", 1)).unwrap();

    let outcome = queue.flush(|_| async { false }).await;

    assert_eq!(outcome, FlushOutcome { sent: 0, failed: 1 });
    assert_eq!(queue.messages(), &[Message::with_time("stuck", 1)]);
    assert_eq!(queue_in(&dir).messages(), queue.messages());
}

#[tokio::test]
async fn test_flush_alternating_outcomes_preserves_order() {
    let dir = TempDir::new().unwrap();
    let mut queue = queue_in(&dir);
    for i in 0..6 {
        queue.append(Message::with_time(format!("m{}", i), i)).unwrap();
    }

    let mut attempt = 0;
    let outcome = queue
        .flush(|_| {
            attempt += 1;
            let ok = attempt % 2 == 0;
            async move { ok }
        })
        .await;

    assert_eq!(outcome, FlushOutcome { sent: 3, failed: 3 });
    let texts: Vec<&str> = queue.messages().iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["m0", "m2", "m4"]);

    let reloaded = queue_in(&dir);
    assert_eq!(reloaded.messages(), queue.messages());
}

#[tokio::test]
async fn test_flush_empty_queue_is_noop() {
    let dir = TempDir::new().unwrap();
    let mut queue = queue_in(&dir);

    let mut calls = 0;
    let outcome = queue
        .flush(|_| {
            calls += 1;
            async { true }
        })
        .await;

    assert_eq!(outcome, FlushOutcome::default());
    assert_eq!(calls, 0);
}

#[test]
fn test_clear_removes_file() {
    let dir = TempDir::new().unwrap();
    let mut queue = queue_in(&dir);
    queue.append(Message::with_time("x", 1)).unwrap();

    queue.clear().unwrap();
    assert!(queue.is_empty());
    assert!(!queue.path().exists());

    // Clearing again with no file is fine.
    queue.clear().unwrap();
}
