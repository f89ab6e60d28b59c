// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

//! Work unit identifier and lifecycle state machine.

use crate::ids::WorkId;
use std::time::Instant;

/// Lifecycle state of a work unit.
///
/// Transitions are monotonic: `Pending -> {Running, Completed (skipped),
/// Cancelled, Failed (timeout)}`; `Running -> {Completed, Failed}`. There
/// is no way back to an earlier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Submitted, not yet dispatched.
    Pending,
    /// Handler executing.
    Running,
    /// Handler returned, or skipped because the unit was not stale.
    Completed,
    /// Handler raised, or the pending timeout expired.
    Failed,
    /// Withdrawn while pending.
    Cancelled,
}

impl LifecycleState {
    /// True for any state a unit cannot leave once entered.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LifecycleState::Completed | LifecycleState::Failed | LifecycleState::Cancelled
        )
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LifecycleState::Pending => "pending",
            LifecycleState::Running => "running",
            LifecycleState::Completed => "completed",
            LifecycleState::Failed => "failed",
            LifecycleState::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// A single submission moving through the lifecycle exactly once.
#[derive(Debug, Clone)]
pub struct WorkUnit {
    pub id: WorkId,
    /// Name of the registered task that selects the handler and service binding.
    pub task_name: String,
    /// Opaque parameter bag the handler receives.
    pub params: serde_json::Value,
    pub state: LifecycleState,
    pub created_at: Instant,
    /// Set iff the state ever reached `Running`.
    pub started_at: Option<Instant>,
    /// Set iff the state is terminal.
    pub completed_at: Option<Instant>,
    /// Present only on success.
    pub result: Option<serde_json::Value>,
    /// Present only on failure.
    pub error: Option<String>,
    /// Reserved: incremented by retry logic once implemented. The core
    /// currently runs each work unit at most once per submission.
    pub attempt: u32,
    /// Optional dedup key supplied at submission time.
    pub idempotency_key: Option<String>,
}

impl WorkUnit {
    /// Construct a freshly submitted, pending work unit.
    pub fn new(
        id: WorkId,
        task_name: impl Into<String>,
        params: serde_json::Value,
        idempotency_key: Option<String>,
        now: Instant,
    ) -> Self {
        Self {
            id,
            task_name: task_name.into(),
            params,
            state: LifecycleState::Pending,
            created_at: now,
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
            attempt: 1,
            idempotency_key,
        }
    }

    /// Seconds this unit has been waiting, measured from `created_at`.
    pub fn wait_time(&self, now: Instant) -> std::time::Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// Whether the handler ever ran: distinguishes executed work from
    /// a stale-skip, which completes without ever setting `started_at`.
    pub fn was_executed(&self) -> bool {
        self.started_at.is_some()
    }
}

#[cfg(test)]
#[path = "work_tests.rs"]
mod tests;
