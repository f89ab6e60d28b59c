// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

//! Pending-timeout and stall watchdogs (§4.6). Both run synchronously
//! inside the tick's already-held store lock, sharing the same `now`
//! the rate-limit gate uses for pruning.

use crate::orchestrator::Inner;
use crate::store::WorkStore;
use cue_core::{Clock, WorkUnit};
use std::sync::atomic::Ordering;
use std::time::Instant;

impl<C: Clock> Inner<C> {
    /// Per-unit pending timeout and warning. Called for any unit the
    /// walk decided must remain pending this tick. The spec frames this
    /// as following an `is_ready` failure, but nothing distinguishes an
    /// unregistered task's block from a dead predicate's — both are a
    /// unit silently stuck — so the check applies uniformly to whatever
    /// reason kept a unit pending.
    pub(crate) fn check_pending_watchdog(&self, store: &mut WorkStore, unit: WorkUnit, now: Instant) {
        let wait = unit.wait_time(now);
        let id = unit.id.clone();

        if let Some(timeout) = self.config.pending_timeout {
            if wait >= timeout {
                if let Some(taken) = store.take_pending(&id) {
                    let error = format!("Pending timeout after {}s", timeout.as_secs());
                    let failed = store.fail_pending(taken, error.clone(), now);
                    *self.last_completion.lock() = now;
                    self.warned_pending.lock().remove(&id);
                    tracing::error!(work_id = %id, error = %error, "pending timeout");
                    self.callbacks.fire_on_failure(&failed, &error);
                }
                return;
            }
        }

        if let Some(warn_after) = self.config.pending_warn_after {
            if wait >= warn_after {
                let first_warning = self.warned_pending.lock().insert(id.clone());
                if first_warning {
                    tracing::warn!(work_id = %id, seconds = wait.as_secs(), "pending warning");
                    self.callbacks.fire_on_pending_warning(&unit, wait.as_secs());
                }
            }
        }
    }

    /// Global liveness check: no terminal transition for too long means
    /// the queue has stalled, typically because a readiness predicate
    /// will never flip.
    pub(crate) fn check_stall(&self, store: &mut WorkStore, now: Instant) {
        let pending_count = store.pending_len();
        if pending_count == 0 {
            return;
        }
        let idle = now.saturating_duration_since(*self.last_completion.lock());

        if let Some(timeout) = self.config.stall_timeout {
            if idle >= timeout {
                let error = format!("Stall timeout after {}s", timeout.as_secs());
                for unit in store.pending_snapshot() {
                    if let Some(taken) = store.take_pending(&unit.id) {
                        let failed = store.fail_pending(taken, error.clone(), now);
                        self.callbacks.fire_on_failure(&failed, &error);
                    }
                }
                *self.last_completion.lock() = now;
                self.warned_pending.lock().clear();
                tracing::error!(error = %error, "stall timeout, stopping orchestrator");
                self.running.store(false, Ordering::SeqCst);
                self.stop_notify.notify_one();
                return;
            }
        }

        if let Some(warn_after) = self.config.stall_warn_after {
            if idle >= warn_after {
                let mut last_warn = self.last_stall_warn.lock();
                let should_fire = last_warn
                    .map(|fired_at| now.saturating_duration_since(fired_at) >= warn_after)
                    .unwrap_or(true);
                if should_fire {
                    *last_warn = Some(now);
                    drop(last_warn);
                    tracing::warn!(seconds = idle.as_secs(), pending_count, "stall warning");
                    self.callbacks.fire_on_stall_warning(idle.as_secs(), pending_count);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "watchdog_tests.rs"]
mod tests;
