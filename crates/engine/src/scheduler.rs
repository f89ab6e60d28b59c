// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

//! The Scheduler Loop (§4.4): one tick ranks the pending partition by
//! priority, walks it in order, and dispatches eligible work. The tick
//! itself never suspends — predicate and gate checks are synchronous —
//! so it holds the work-store lock for its whole duration.

use crate::orchestrator::Inner;
use crate::priority::PriorityEvaluator;
use cue_core::{Clock, Task, WorkUnit};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// A unit the walk decided to dispatch, handed off to the executor.
pub(crate) struct Dispatch {
    pub unit: WorkUnit,
    pub task: Task,
    pub service: Option<String>,
}

/// Priority-sort a pending snapshot: descending score, ties broken by
/// submission order (a stable sort over the original index does this).
pub(crate) fn rank_pending(units: Vec<WorkUnit>, now: Instant, priority: &PriorityEvaluator) -> Vec<WorkUnit> {
    let depth = units.len();
    let mut scored: Vec<(f64, usize, WorkUnit)> = units
        .into_iter()
        .enumerate()
        .map(|(index, unit)| {
            let wait_time = unit.wait_time(now);
            let score = priority.score(&unit, wait_time, depth);
            (score, index, unit)
        })
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal).then(a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, _, unit)| unit).collect()
}

impl<C: Clock> Inner<C> {
    /// One scheduler tick (§4.4 steps 1-4).
    pub(crate) fn tick(&self) -> Vec<Dispatch> {
        let now = self.clock.now();
        let mut store = self.store.lock();
        let ranked = rank_pending(store.pending_snapshot(), now, &self.priority);
        let tasks = self.tasks.lock();
        let _span = tracing::debug_span!("tick", pending = ranked.len()).entered();

        let mut dispatches = Vec::new();
        for unit in ranked {
            let id = unit.id.clone();

            let Some(task_def) = tasks.get(&unit.task_name).cloned() else {
                tracing::warn!(work_id = %id, task = %unit.task_name, "unregistered task");
                self.check_pending_watchdog(&mut store, unit, now);
                continue;
            };

            if !self.predicates.is_ready(&unit) {
                self.check_pending_watchdog(&mut store, unit, now);
                continue;
            }

            if !self.predicates.is_stale(&unit) {
                if let Some(taken) = store.take_pending(&id) {
                    let skipped = store.skip_to_completed(taken, now);
                    *self.last_completion.lock() = now;
                    self.warned_pending.lock().remove(&id);
                    tracing::debug!(work_id = %id, "skipped: not stale");
                    self.callbacks.fire_on_skip(&skipped);
                }
                continue;
            }

            if let Some(service) = &task_def.uses {
                if !self.gates.try_reserve(service, id.clone(), now) {
                    tracing::debug!(work_id = %id, service = %service, "service at capacity, deferred");
                    continue;
                }
            }

            let Some(taken) = store.take_pending(&id) else {
                continue;
            };
            let running = store.start_running(taken, now);
            self.warned_pending.lock().remove(&id);
            tracing::info!(work_id = %id, task = %unit.task_name, "dispatched");
            dispatches.push(Dispatch {
                unit: running,
                task: task_def.handler.clone(),
                service: task_def.uses.clone(),
            });
        }
        drop(tasks);

        self.check_stall(&mut store, now);
        dispatches
    }
}

/// The scheduler's background task: tick, dispatch, sleep, repeat until
/// stopped. Executor futures run in a `JoinSet` local to this task, so
/// dropping the set (when a stop timeout aborts this task) cancels any
/// still-outstanding handlers cooperatively.
pub(crate) async fn run_loop<C: Clock>(inner: Arc<Inner<C>>) {
    let mut executors: JoinSet<()> = JoinSet::new();
    loop {
        let dispatches = inner.tick();
        for dispatch in dispatches {
            executors.spawn(crate::executor::run_unit(inner.clone(), dispatch));
        }
        while executors.try_join_next().is_some() {}

        tokio::select! {
            _ = inner.stop_notify.notified() => break,
            _ = tokio::time::sleep(inner.config.tick_interval) => {}
        }
    }

    while executors.join_next().await.is_some() {}
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
