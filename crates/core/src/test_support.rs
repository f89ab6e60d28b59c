// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

//! Shared test fixtures for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::ids::WorkId;
use crate::work::{LifecycleState, WorkUnit};
use std::time::Instant;

/// Build a pending work unit with the given params, created `now`.
pub fn pending_unit(id: &str, task_name: &str, params: serde_json::Value, now: Instant) -> WorkUnit {
    WorkUnit::new(WorkId::new(id), task_name, params, None, now)
}

/// Build a unit already transitioned to `Running`.
pub fn running_unit(id: &str, task_name: &str, now: Instant) -> WorkUnit {
    let mut unit = pending_unit(id, task_name, serde_json::json!({}), now);
    unit.state = LifecycleState::Running;
    unit.started_at = Some(now);
    unit
}

/// Build a unit already transitioned to `Completed` with a result.
pub fn completed_unit(id: &str, task_name: &str, result: serde_json::Value, now: Instant) -> WorkUnit {
    let mut unit = running_unit(id, task_name, now);
    unit.state = LifecycleState::Completed;
    unit.completed_at = Some(now);
    unit.result = Some(result);
    unit
}
