// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

//! The Work Store: the three lifecycle partitions (pending, running,
//! terminal) plus the idempotency-key side index.
//!
//! A single mutex around the whole store is enough — a tick's
//! critical sections are short, and nothing here does I/O.

use cue_core::{LifecycleState, WorkId, WorkUnit};
use std::collections::HashMap;
use std::time::Instant;

/// A read-only copy of a unit, returned from `list`/`get` so callers
/// can't mutate store state through a borrow.
pub type WorkSnapshot = WorkUnit;

#[derive(Default)]
pub struct WorkStore {
    pending: Vec<WorkUnit>,
    running: HashMap<WorkId, WorkUnit>,
    terminal: HashMap<WorkId, WorkUnit>,
    idempotency: HashMap<String, WorkId>,
}

impl WorkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing id if `key` was already submitted.
    pub fn find_idempotent(&self, key: &str) -> Option<WorkId> {
        self.idempotency.get(key).cloned()
    }

    pub fn enqueue(&mut self, unit: WorkUnit) {
        if let Some(key) = unit.idempotency_key.clone() {
            self.idempotency.entry(key).or_insert_with(|| unit.id.clone());
        }
        self.pending.push(unit);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Snapshot of all pending units, in current (pre-ranking) order.
    pub fn pending_snapshot(&self) -> Vec<WorkUnit> {
        self.pending.clone()
    }

    /// Remove a unit from pending by id, e.g. to move it to running or
    /// to fail/skip/cancel it.
    pub fn take_pending(&mut self, id: &WorkId) -> Option<WorkUnit> {
        let idx = self.pending.iter().position(|u| u.id == *id)?;
        Some(self.pending.remove(idx))
    }

    /// Move a unit out of pending and into running, stamping its start
    /// time.
    pub fn start_running(&mut self, mut unit: WorkUnit, now: Instant) -> WorkUnit {
        unit.state = LifecycleState::Running;
        unit.started_at = Some(now);
        self.running.insert(unit.id.clone(), unit.clone());
        unit
    }

    /// Finalize a running unit as Completed or Failed.
    pub fn finish_running(
        &mut self,
        id: &WorkId,
        state: LifecycleState,
        result: Option<serde_json::Value>,
        error: Option<String>,
        now: Instant,
    ) -> Option<WorkUnit> {
        let mut unit = self.running.remove(id)?;
        unit.state = state;
        unit.completed_at = Some(now);
        unit.result = result;
        unit.error = error;
        self.terminal.insert(unit.id.clone(), unit.clone());
        Some(unit)
    }

    /// Finalize a pending unit as Completed without ever running it
    /// (the `is_stale` skip path).
    pub fn skip_to_completed(&mut self, mut unit: WorkUnit, now: Instant) -> WorkUnit {
        unit.state = LifecycleState::Completed;
        unit.completed_at = Some(now);
        self.terminal.insert(unit.id.clone(), unit.clone());
        unit
    }

    /// Finalize a pending unit as Failed without ever running it (the
    /// pending-timeout path).
    pub fn fail_pending(&mut self, mut unit: WorkUnit, error: String, now: Instant) -> WorkUnit {
        unit.state = LifecycleState::Failed;
        unit.completed_at = Some(now);
        unit.error = Some(error);
        self.terminal.insert(unit.id.clone(), unit.clone());
        unit
    }

    /// Cancel a unit if it is still pending. Returns `false` if it has
    /// already started running or is already terminal.
    pub fn cancel_pending(&mut self, id: &WorkId, now: Instant) -> bool {
        match self.take_pending(id) {
            Some(mut unit) => {
                unit.state = LifecycleState::Cancelled;
                unit.completed_at = Some(now);
                self.terminal.insert(unit.id.clone(), unit.clone());
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &WorkId) -> Option<WorkUnit> {
        self.pending
            .iter()
            .find(|u| u.id == *id)
            .cloned()
            .or_else(|| self.running.get(id).cloned())
            .or_else(|| self.terminal.get(id).cloned())
    }

    pub fn running_snapshot(&self) -> Vec<WorkUnit> {
        self.running.values().cloned().collect()
    }

    pub fn terminal_snapshot(&self) -> Vec<WorkUnit> {
        self.terminal.values().cloned().collect()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
