// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

use super::*;
use cue_core::test_support::pending_unit;

fn id(s: &str) -> WorkId {
    WorkId::new(s)
}

#[test]
fn enqueue_then_get_finds_pending() {
    let mut store = WorkStore::new();
    store.enqueue(pending_unit("w-1", "task", serde_json::json!({}), Instant::now()));
    let unit = store.get(&id("w-1")).expect("present");
    assert_eq!(unit.state, LifecycleState::Pending);
}

#[test]
fn idempotent_submission_is_indexed() {
    let mut store = WorkStore::new();
    let now = Instant::now();
    let mut unit = pending_unit("w-1", "task", serde_json::json!({}), now);
    unit.idempotency_key = Some("key-a".into());
    store.enqueue(unit);
    assert_eq!(store.find_idempotent("key-a"), Some(id("w-1")));
    assert_eq!(store.find_idempotent("key-b"), None);
}

#[test]
fn start_running_moves_out_of_pending() {
    let mut store = WorkStore::new();
    let now = Instant::now();
    store.enqueue(pending_unit("w-1", "task", serde_json::json!({}), now));
    let unit = store.take_pending(&id("w-1")).expect("present");
    let running = store.start_running(unit, now);
    assert_eq!(running.state, LifecycleState::Running);
    assert!(store.take_pending(&id("w-1")).is_none());
    assert_eq!(store.get(&id("w-1")).unwrap().state, LifecycleState::Running);
}

#[test]
fn finish_running_moves_to_terminal() {
    let mut store = WorkStore::new();
    let now = Instant::now();
    store.enqueue(pending_unit("w-1", "task", serde_json::json!({}), now));
    let unit = store.take_pending(&id("w-1")).unwrap();
    store.start_running(unit, now);
    let finished = store
        .finish_running(&id("w-1"), LifecycleState::Completed, Some(serde_json::json!(1)), None, now)
        .expect("present");
    assert_eq!(finished.state, LifecycleState::Completed);
    assert_eq!(finished.result, Some(serde_json::json!(1)));
    assert_eq!(store.get(&id("w-1")).unwrap().state, LifecycleState::Completed);
}

#[test]
fn skip_to_completed_never_sets_started_at() {
    let mut store = WorkStore::new();
    let now = Instant::now();
    store.enqueue(pending_unit("w-1", "task", serde_json::json!({}), now));
    let unit = store.take_pending(&id("w-1")).unwrap();
    let done = store.skip_to_completed(unit, now);
    assert_eq!(done.state, LifecycleState::Completed);
    assert!(!done.was_executed());
}

#[test]
fn cancel_pending_succeeds_only_while_pending() {
    let mut store = WorkStore::new();
    let now = Instant::now();
    store.enqueue(pending_unit("w-1", "task", serde_json::json!({}), now));
    assert!(store.cancel_pending(&id("w-1"), now));
    assert!(!store.cancel_pending(&id("w-1"), now));

    store.enqueue(pending_unit("w-2", "task", serde_json::json!({}), now));
    let unit = store.take_pending(&id("w-2")).unwrap();
    store.start_running(unit, now);
    assert!(!store.cancel_pending(&id("w-2"), now));
}

#[test]
fn pending_snapshot_preserves_order() {
    let mut store = WorkStore::new();
    let now = Instant::now();
    store.enqueue(pending_unit("w-1", "task", serde_json::json!({}), now));
    store.enqueue(pending_unit("w-2", "task", serde_json::json!({}), now));
    let ids: Vec<_> = store.pending_snapshot().into_iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![id("w-1"), id("w-2")]);
}
