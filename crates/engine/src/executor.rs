// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

//! The Work Executor (§4.5): for each dispatched unit, emit `on_start`,
//! run the handler, capture its outcome, emit `on_complete`/`on_failure`,
//! and release the service gate. Runs as an independent task per unit,
//! concurrently with the scheduler loop and other executors.

use crate::orchestrator::Inner;
use crate::scheduler::Dispatch;
use cue_core::{Clock, LifecycleState};
use std::sync::Arc;

pub(crate) async fn run_unit<C: Clock>(inner: Arc<Inner<C>>, dispatch: Dispatch) {
    let Dispatch { unit, task, service } = dispatch;
    let span = tracing::info_span!("work", work_id = %unit.id, task = %unit.task_name);
    let _guard = span.enter();

    inner.callbacks.fire_on_start(&unit);

    let outcome = task.call(&unit).await;
    let now = inner.clock.now();
    let duration = unit
        .started_at
        .map(|started| now.saturating_duration_since(started))
        .unwrap_or_default();
    let id = unit.id.clone();

    let finished = {
        let mut store = inner.store.lock();
        match &outcome {
            Ok(result) => store.finish_running(&id, LifecycleState::Completed, Some(result.clone()), None, now),
            Err(error) => store.finish_running(&id, LifecycleState::Failed, None, Some(error.clone()), now),
        }
    };

    if let Some(service) = &service {
        inner.gates.release(service, &id);
    }
    *inner.last_completion.lock() = now;

    let Some(finished) = finished else { return };
    match outcome {
        Ok(result) => {
            tracing::info!(elapsed_ms = duration.as_millis() as u64, "completed");
            inner.callbacks.fire_on_complete(&finished, &result, duration);
        }
        Err(error) => {
            tracing::warn!(elapsed_ms = duration.as_millis() as u64, error = %error, "failed");
            inner.callbacks.fire_on_failure(&finished, &error);
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
