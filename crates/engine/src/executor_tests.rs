// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

use super::*;
use crate::config::OrchestratorConfig;
use crate::orchestrator::Orchestrator;
use cue_core::{FakeClock, SequentialIdGen, Task};
use parking_lot::Mutex as PlMutex;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

fn orchestrator() -> Orchestrator<FakeClock> {
    Orchestrator::with_clock_and_id_gen(
        OrchestratorConfig::default(),
        FakeClock::new(),
        SequentialIdGen::new("w"),
    )
}

#[tokio::test]
async fn run_unit_fires_start_then_complete_with_result() {
    let orch = orchestrator();
    let events = Arc::new(PlMutex::new(Vec::new()));
    let e1 = events.clone();
    orch.on_start(move |unit| e1.lock().push(format!("start:{}", unit.id)));
    let e2 = events.clone();
    orch.on_complete(move |unit, result, _duration| {
        e2.lock().push(format!("complete:{}:{}", unit.id, result));
    });
    orch.task("t", None, 1, Task::sync(|_| Ok(serde_json::json!({"ok": 1})))).unwrap();
    let id = orch.submit("t", serde_json::json!({})).unwrap();

    let dispatches = orch.inner.tick();
    assert_eq!(dispatches.len(), 1);
    crate::executor::run_unit(orch.inner.clone(), dispatches.into_iter().next().unwrap()).await;

    let unit = orch.get(&id).unwrap();
    assert_eq!(unit.state, LifecycleState::Completed);
    assert_eq!(unit.result, Some(serde_json::json!({"ok": 1})));
    assert!(unit.error.is_none());
    assert_eq!(
        *events.lock(),
        vec![format!("start:{id}"), format!("complete:{id}:{{\"ok\":1}}")]
    );
}

#[tokio::test]
async fn run_unit_fires_on_failure_and_stores_stringified_error() {
    let orch = orchestrator();
    let seen = Arc::new(PlMutex::new(None));
    let seen2 = seen.clone();
    orch.on_failure(move |unit, error| *seen2.lock() = Some((unit.id.clone(), error.to_string())));
    orch.task("t", None, 1, Task::sync(|_| Err("boom".to_string()))).unwrap();
    let id = orch.submit("t", serde_json::json!({})).unwrap();

    let dispatches = orch.inner.tick();
    crate::executor::run_unit(orch.inner.clone(), dispatches.into_iter().next().unwrap()).await;

    let unit = orch.get(&id).unwrap();
    assert_eq!(unit.state, LifecycleState::Failed);
    assert_eq!(unit.error.as_deref(), Some("boom"));
    assert!(unit.result.is_none());
    assert_eq!(seen.lock().clone(), Some((id, "boom".to_string())));
}

#[tokio::test]
async fn run_unit_awaits_async_handlers() {
    let orch = orchestrator();
    orch.task(
        "t",
        None,
        1,
        Task::async_fn(|_unit| async move {
            tokio::task::yield_now().await;
            Ok(serde_json::json!({"async": true}))
        }),
    )
    .unwrap();
    let id = orch.submit("t", serde_json::json!({})).unwrap();

    let dispatches = orch.inner.tick();
    crate::executor::run_unit(orch.inner.clone(), dispatches.into_iter().next().unwrap()).await;

    let unit = orch.get(&id).unwrap();
    assert_eq!(unit.state, LifecycleState::Completed);
    assert_eq!(unit.result, Some(serde_json::json!({"async": true})));
}

#[tokio::test]
async fn run_unit_releases_gate_capacity_on_completion() {
    let orch = orchestrator();
    orch.service("svc", None, Some(1)).unwrap();
    orch.task("t", Some("svc"), 1, Task::sync(|_| Ok(serde_json::json!(null)))).unwrap();
    let first = orch.submit("t", serde_json::json!({})).unwrap();
    let second = orch.submit("t", serde_json::json!({})).unwrap();

    let dispatches = orch.inner.tick();
    assert_eq!(dispatches.len(), 1, "concurrency cap of 1 admits only the first unit");
    crate::executor::run_unit(orch.inner.clone(), dispatches.into_iter().next().unwrap()).await;
    assert_eq!(orch.get(&first).unwrap().state, LifecycleState::Completed);

    let dispatches = orch.inner.tick();
    assert_eq!(dispatches.len(), 1, "release freed the slot for the second unit");
    assert_eq!(dispatches[0].unit.id, second);
}

#[tokio::test]
async fn run_unit_swallows_panicking_observation_callbacks() {
    let orch = orchestrator();
    orch.on_start(|_unit| panic!("on_start boom"));
    orch.on_complete(|_unit, _result, _duration| panic!("on_complete boom"));
    orch.task("t", None, 1, Task::sync(|_| Ok(serde_json::json!(null)))).unwrap();
    let id = orch.submit("t", serde_json::json!({})).unwrap();

    let dispatches = orch.inner.tick();
    crate::executor::run_unit(orch.inner.clone(), dispatches.into_iter().next().unwrap()).await;

    assert_eq!(orch.get(&id).unwrap().state, LifecycleState::Completed);
}

#[tokio::test]
async fn run_unit_does_not_leave_a_stale_in_flight_reservation() {
    let orch = orchestrator();
    orch.service("svc", None, Some(1)).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));
    let c1 = counter.clone();
    orch.task(
        "t",
        Some("svc"),
        1,
        Task::sync(move |_| {
            c1.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(serde_json::json!(null))
        }),
    )
    .unwrap();
    orch.submit("t", serde_json::json!({})).unwrap();

    let dispatches = orch.inner.tick();
    crate::executor::run_unit(orch.inner.clone(), dispatches.into_iter().next().unwrap()).await;

    // A second unit bound to the same capacity-1 service must be admitted
    // once the first has released its slot.
    orch.submit("t", serde_json::json!({})).unwrap();
    let dispatches = orch.inner.tick();
    assert_eq!(dispatches.len(), 1);
}
