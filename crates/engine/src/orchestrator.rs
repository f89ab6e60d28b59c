// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

//! The public entry point: registration, submission, introspection,
//! and lifecycle control (§4.7, §6) wired around the private [`Inner`]
//! shared state the scheduler loop and executors operate on.

use crate::callbacks::Callbacks;
use crate::config::OrchestratorConfig;
use crate::gate::ServiceGates;
use crate::predicate::PredicateEvaluator;
use crate::priority::{PriorityContext, PriorityEvaluator};
use crate::store::WorkStore;
use cue_core::{
    Clock, ConfigError, IdGen, LifecycleState, ServiceDefinition, SubmitError, SystemClock, Task,
    TaskDefinition, UuidIdGen, WorkId, WorkUnit,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Why a pending unit hasn't been dispatched, per §6's `debug_blocked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockedReason {
    /// The unit's task name was never registered.
    UnknownTask,
    /// `is_ready` returned false (or panicked).
    NotReady,
    /// The bound service's gate refused admission this tick.
    ServiceFull,
}

/// One `debug_blocked` entry: a pending unit and why it hasn't run.
#[derive(Debug, Clone)]
pub struct BlockedEntry {
    pub unit: WorkUnit,
    pub reason: BlockedReason,
    pub details: String,
}

pub(crate) struct Inner<C: Clock> {
    pub(crate) store: Mutex<WorkStore>,
    pub(crate) gates: ServiceGates,
    pub(crate) predicates: PredicateEvaluator,
    pub(crate) priority: PriorityEvaluator,
    pub(crate) callbacks: Callbacks,
    pub(crate) tasks: Mutex<HashMap<String, TaskDefinition>>,
    pub(crate) id_gen: Box<dyn IdGen>,
    pub(crate) clock: C,
    pub(crate) config: OrchestratorConfig,
    pub(crate) warned_pending: Mutex<HashSet<WorkId>>,
    pub(crate) last_completion: Mutex<Instant>,
    pub(crate) last_stall_warn: Mutex<Option<Instant>>,
    pub(crate) running: AtomicBool,
    pub(crate) stop_notify: Notify,
    pub(crate) loop_handle: Mutex<Option<JoinHandle<()>>>,
}

/// The work orchestrator: an in-process control tower over submitted
/// work, gated services, and the scheduler loop that dispatches between
/// them. Generic over [`Clock`] so tests can drive time deterministically
/// with `FakeClock`; production code uses the default `SystemClock`.
pub struct Orchestrator<C: Clock = SystemClock> {
    pub(crate) inner: Arc<Inner<C>>,
}

impl<C: Clock> Clone for Orchestrator<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Orchestrator<SystemClock> {
    /// Construct an orchestrator backed by the real system clock.
    pub fn new(config: OrchestratorConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Orchestrator<C> {
    /// Construct an orchestrator backed by a custom clock (e.g.
    /// `FakeClock` in tests). IDs are generated with [`UuidIdGen`].
    pub fn with_clock(config: OrchestratorConfig, clock: C) -> Self {
        Self::build(config, clock, Box::new(UuidIdGen))
    }

    /// Construct an orchestrator with both a custom clock and a custom
    /// ID generator, e.g. `SequentialIdGen` in tests that assert on
    /// submission order.
    pub fn with_clock_and_id_gen(
        config: OrchestratorConfig,
        clock: C,
        id_gen: impl IdGen + 'static,
    ) -> Self {
        Self::build(config, clock, Box::new(id_gen))
    }

    fn build(config: OrchestratorConfig, clock: C, id_gen: Box<dyn IdGen>) -> Self {
        let now = clock.now();
        Self {
            inner: Arc::new(Inner {
                store: Mutex::new(WorkStore::new()),
                gates: ServiceGates::new(),
                predicates: PredicateEvaluator::new(),
                priority: PriorityEvaluator::new(),
                callbacks: Callbacks::new(),
                tasks: Mutex::new(HashMap::new()),
                id_gen,
                clock,
                config,
                warned_pending: Mutex::new(HashSet::new()),
                last_completion: Mutex::new(now),
                last_stall_warn: Mutex::new(None),
                running: AtomicBool::new(false),
                stop_notify: Notify::new(),
                loop_handle: Mutex::new(None),
            }),
        }
    }

    // ---- registration (synchronous, pre-start) --------------------------

    /// Register a named capacity/rate envelope. `rate` is `"N/unit"` with
    /// unit in `sec`/`min`/`hour` (and their aliases); `None` means no
    /// rate limit. `concurrent` is the concurrency cap; `None` means
    /// unlimited.
    pub fn service(
        &self,
        name: impl Into<String>,
        rate: Option<&str>,
        concurrent: Option<usize>,
    ) -> Result<(), ConfigError> {
        let definition = ServiceDefinition::new(name, rate, concurrent)?;
        self.inner.gates.register(definition);
        Ok(())
    }

    /// Register a handler under `name`, optionally bound to a service
    /// that must already be registered. `retry` is reserved; the core
    /// runs each work unit at most once regardless of its value.
    pub fn task(
        &self,
        name: impl Into<String>,
        uses: Option<&str>,
        retry: u32,
        handler: Task,
    ) -> Result<(), ConfigError> {
        let name = name.into();
        if let Some(service) = uses {
            if !self.inner.gates.is_registered(service) {
                return Err(ConfigError::UnknownService(service.to_string()));
            }
        }
        let definition = TaskDefinition::new(name.clone(), uses.map(str::to_string), retry, handler);
        self.inner.tasks.lock().insert(name, definition);
        Ok(())
    }

    /// Register `is_ready`. Defaults to always-true when never called.
    pub fn is_ready(&self, f: impl Fn(&WorkUnit) -> bool + Send + Sync + 'static) {
        self.inner.predicates.set_is_ready(f);
    }

    /// Register `is_stale`. Defaults to always-true when never called.
    pub fn is_stale(&self, f: impl Fn(&WorkUnit) -> bool + Send + Sync + 'static) {
        self.inner.predicates.set_is_stale(f);
    }

    /// Register a priority callback, overriding the default
    /// starvation-preventing FIFO score.
    pub fn priority(&self, f: impl Fn(&PriorityContext<'_>) -> f64 + Send + Sync + 'static) {
        self.inner.priority.set(f);
    }

    pub fn on_start(&self, f: impl Fn(&WorkUnit) + Send + Sync + 'static) {
        self.inner.callbacks.set_on_start(f);
    }

    pub fn on_complete(&self, f: impl Fn(&WorkUnit, &Value, Duration) + Send + Sync + 'static) {
        self.inner.callbacks.set_on_complete(f);
    }

    pub fn on_failure(&self, f: impl Fn(&WorkUnit, &str) + Send + Sync + 'static) {
        self.inner.callbacks.set_on_failure(f);
    }

    pub fn on_skip(&self, f: impl Fn(&WorkUnit) + Send + Sync + 'static) {
        self.inner.callbacks.set_on_skip(f);
    }

    pub fn on_pending_warning(&self, f: impl Fn(&WorkUnit, u64) + Send + Sync + 'static) {
        self.inner.callbacks.set_on_pending_warning(f);
    }

    pub fn on_stall_warning(&self, f: impl Fn(u64, usize) + Send + Sync + 'static) {
        self.inner.callbacks.set_on_stall_warning(f);
    }

    // ---- public operations (§6) -----------------------------------------

    /// Submit a unit of work for task `task_name`. Fails if the task was
    /// never registered.
    pub fn submit(&self, task_name: &str, params: Value) -> Result<WorkId, SubmitError> {
        self.submit_with_key(task_name, params, None)
    }

    /// Like [`submit`](Self::submit), but with an optional idempotency
    /// key: a second submission with a key already on file returns the
    /// existing unit's ID instead of creating a duplicate.
    pub fn submit_with_key(
        &self,
        task_name: &str,
        params: Value,
        idempotency_key: Option<String>,
    ) -> Result<WorkId, SubmitError> {
        if !self.inner.tasks.lock().contains_key(task_name) {
            return Err(SubmitError::UnknownTask(task_name.to_string()));
        }

        let mut store = self.inner.store.lock();
        if let Some(key) = idempotency_key.as_deref() {
            if let Some(existing) = store.find_idempotent(key) {
                return Ok(existing);
            }
        }

        let id = self.inner.id_gen.next();
        let now = self.inner.clock.now();
        let unit = WorkUnit::new(id.clone(), task_name, params, idempotency_key, now);
        tracing::debug!(work_id = %id, task_name, "submitted");
        store.enqueue(unit);
        Ok(id)
    }

    pub fn get(&self, id: &WorkId) -> Option<WorkUnit> {
        self.inner.store.lock().get(id)
    }

    /// Filtered snapshot. Pending units (whether returned because
    /// `state` names `Pending` or because `state` is `None`) come back
    /// in current priority order.
    pub fn list(&self, state: Option<LifecycleState>, task: Option<&str>, limit: usize) -> Vec<WorkUnit> {
        let store = self.inner.store.lock();
        let now = self.inner.clock.now();

        let mut units = match state {
            Some(LifecycleState::Pending) => {
                crate::scheduler::rank_pending(store.pending_snapshot(), now, &self.inner.priority)
            }
            Some(LifecycleState::Running) => store.running_snapshot(),
            Some(terminal) if terminal.is_terminal() => store
                .terminal_snapshot()
                .into_iter()
                .filter(|u| u.state == terminal)
                .collect(),
            Some(_) => Vec::new(),
            None => {
                let mut all =
                    crate::scheduler::rank_pending(store.pending_snapshot(), now, &self.inner.priority);
                all.extend(store.running_snapshot());
                all.extend(store.terminal_snapshot());
                all
            }
        };

        if let Some(task) = task {
            units.retain(|u| u.task_name == task);
        }
        units.truncate(limit);
        units
    }

    /// Withdraw a unit that is still pending. Returns `false` for
    /// running or already-terminal units (idempotent on a second call).
    pub fn cancel(&self, id: &WorkId) -> bool {
        let now = self.inner.clock.now();
        self.inner.store.lock().cancel_pending(id, now)
    }

    /// For every pending unit that is genuinely stuck, why. The primary
    /// "why is nothing moving?" hook; cheap — a single store lock plus
    /// one `is_ready`/`is_stale` call and one `would_admit` peek per
    /// pending unit, no gate reservation. A unit that is ready, stale,
    /// and either unbound or would be admitted right now is about to be
    /// dispatched on the next tick and is not reported as blocked.
    pub fn debug_blocked(&self) -> Vec<BlockedEntry> {
        let store = self.inner.store.lock();
        let now = self.inner.clock.now();
        let pending = crate::scheduler::rank_pending(store.pending_snapshot(), now, &self.inner.priority);
        let tasks = self.inner.tasks.lock();

        pending
            .into_iter()
            .filter_map(|unit| {
                let Some(task_def) = tasks.get(&unit.task_name) else {
                    return Some(BlockedEntry {
                        details: format!("task {:?} is not registered", unit.task_name),
                        reason: BlockedReason::UnknownTask,
                        unit,
                    });
                };

                if !self.inner.predicates.is_ready(&unit) {
                    return Some(BlockedEntry {
                        details: "is_ready returned false".to_string(),
                        reason: BlockedReason::NotReady,
                        unit,
                    });
                }

                if !self.inner.predicates.is_stale(&unit) {
                    // Not blocked: the scheduler skips this unit to
                    // Completed next tick instead of dispatching it.
                    return None;
                }

                match &task_def.uses {
                    Some(service) if !self.inner.gates.would_admit(service, now) => Some(BlockedEntry {
                        details: format!("service {service:?} is at capacity"),
                        reason: BlockedReason::ServiceFull,
                        unit,
                    }),
                    _ => None,
                }
            })
            .collect()
    }

    // ---- lifecycle control (§4.7) ----------------------------------------

    /// Idempotent. Begins the scheduler loop as a background task.
    /// Returns immediately.
    pub fn start(&self) {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let inner = self.inner.clone();
        let handle = tokio::spawn(async move { crate::scheduler::run_loop(inner).await });
        *self.inner.loop_handle.lock() = Some(handle);
    }

    /// Idempotent. Signals the scheduler loop to exit, then awaits
    /// outstanding executor futures up to `timeout` (or indefinitely if
    /// `None`); anything still unfinished past the timeout is cancelled
    /// cooperatively.
    pub async fn stop(&self, timeout: Option<Duration>) {
        if !self.inner.running.swap(false, Ordering::SeqCst) {
            return;
        }
        self.inner.stop_notify.notify_one();

        let handle = self.inner.loop_handle.lock().take();
        if let Some(mut handle) = handle {
            match timeout {
                Some(duration) => {
                    if tokio::time::timeout(duration, &mut handle).await.is_err() {
                        handle.abort();
                    }
                }
                None => {
                    let _ = handle.await;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
