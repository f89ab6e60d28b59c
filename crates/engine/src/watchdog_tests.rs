// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

use super::*;
use crate::config::OrchestratorConfig;
use crate::orchestrator::Orchestrator;
use cue_core::{FakeClock, SequentialIdGen, Task};
use parking_lot::Mutex as PlMutex;
use std::sync::Arc;
use std::time::Duration;

fn orchestrator_with(config: OrchestratorConfig) -> (Orchestrator<FakeClock>, FakeClock) {
    let clock = FakeClock::new();
    let orch = Orchestrator::with_clock_and_id_gen(config, clock.clone(), SequentialIdGen::new("w"));
    (orch, clock)
}

#[test]
fn pending_timeout_fails_the_unit() {
    let config = OrchestratorConfig::builder().pending_timeout(0.1).build();
    let (orch, clock) = orchestrator_with(config);
    orch.task("t", None, 1, Task::sync(|_| Ok(serde_json::json!(null)))).unwrap();
    orch.is_ready(|_| false);
    let id = orch.submit("t", serde_json::json!({})).unwrap();

    clock.advance(Duration::from_millis(150));
    orch.inner.tick();

    let unit = orch.get(&id).unwrap();
    assert_eq!(unit.state, LifecycleState::Failed);
    assert!(unit.error.as_ref().unwrap().contains("Pending timeout"));
}

#[test]
fn pending_warning_fires_exactly_once() {
    let config = OrchestratorConfig::builder().pending_warn_after(0.05).build();
    let (orch, clock) = orchestrator_with(config);
    orch.task("t", None, 1, Task::sync(|_| Ok(serde_json::json!(null)))).unwrap();
    orch.is_ready(|_| false);

    let warnings = Arc::new(PlMutex::new(0));
    let warnings2 = warnings.clone();
    orch.on_pending_warning(move |_unit, _seconds| *warnings2.lock() += 1);

    orch.submit("t", serde_json::json!({})).unwrap();
    clock.advance(Duration::from_millis(100));
    orch.inner.tick();
    orch.inner.tick();
    orch.inner.tick();

    assert_eq!(*warnings.lock(), 1);
}

#[test]
fn stall_warning_fires_when_nothing_completes() {
    let config = OrchestratorConfig::builder().stall_warn_after(1.0).build();
    let (orch, clock) = orchestrator_with(config);
    orch.task("t", None, 1, Task::sync(|_| Ok(serde_json::json!(null)))).unwrap();
    orch.is_ready(|_| false);

    let seen = Arc::new(PlMutex::new(None));
    let seen2 = seen.clone();
    orch.on_stall_warning(move |seconds, pending_count| *seen2.lock() = Some((seconds, pending_count)));

    orch.submit("t", serde_json::json!({})).unwrap();
    clock.advance(Duration::from_millis(1500));
    orch.inner.tick();

    let (seconds, pending_count) = seen.lock().expect("stall warning fired");
    assert!(seconds >= 1);
    assert_eq!(pending_count, 1);
}

#[test]
fn stall_timeout_fails_every_pending_unit_and_stops() {
    let config = OrchestratorConfig::builder().stall_timeout(1.0).build();
    let (orch, clock) = orchestrator_with(config);
    orch.task("t", None, 1, Task::sync(|_| Ok(serde_json::json!(null)))).unwrap();
    orch.is_ready(|_| false);

    let a = orch.submit("t", serde_json::json!({})).unwrap();
    let b = orch.submit("t", serde_json::json!({})).unwrap();
    clock.advance(Duration::from_millis(1100));
    orch.inner.tick();

    assert_eq!(orch.get(&a).unwrap().state, LifecycleState::Failed);
    assert_eq!(orch.get(&b).unwrap().state, LifecycleState::Failed);
    assert!(!orch.inner.running.load(std::sync::atomic::Ordering::SeqCst));
}
