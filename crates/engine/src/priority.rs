// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

//! Priority ranking for the pending partition (§4.4 step 2): either a
//! user-registered callback, clamped to `[0, 1]`, or the built-in
//! starvation-preventing FIFO formula.

use cue_core::WorkUnit;
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

/// Context handed to a user priority callback.
pub struct PriorityContext<'a> {
    pub unit: &'a WorkUnit,
    pub wait_time: Duration,
    pub queue_depth: usize,
}

type PriorityFn = dyn Fn(&PriorityContext<'_>) -> f64 + Send + Sync;

/// `min(0.3 + wait_seconds/3600, 0.9)`: keeps newly submitted work below
/// older work while bounding the advantage below 1.0 so an explicit user
/// priority can always dominate.
fn starvation_fifo(wait_time: Duration) -> f64 {
    (0.3 + wait_time.as_secs_f64() / 3600.0).min(0.9)
}

#[derive(Default)]
pub struct PriorityEvaluator {
    callback: Mutex<Option<Arc<PriorityFn>>>,
}

impl PriorityEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, f: impl Fn(&PriorityContext<'_>) -> f64 + Send + Sync + 'static) {
        *self.callback.lock() = Some(Arc::new(f));
    }

    /// Score a pending unit in `[0, 1]`. Falls back to the
    /// starvation-preventing FIFO formula when no callback is
    /// registered, and to `0.5` if the callback panics.
    pub fn score(&self, unit: &WorkUnit, wait_time: Duration, queue_depth: usize) -> f64 {
        let callback = self.callback.lock().clone();
        match callback {
            None => starvation_fifo(wait_time),
            Some(f) => {
                let ctx = PriorityContext {
                    unit,
                    wait_time,
                    queue_depth,
                };
                catch_unwind(AssertUnwindSafe(|| f(&ctx)))
                    .unwrap_or(0.5)
                    .clamp(0.0, 1.0)
            }
        }
    }
}

#[cfg(test)]
#[path = "priority_tests.rs"]
mod tests;
