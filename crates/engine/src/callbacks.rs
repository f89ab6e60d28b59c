// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

//! Lifecycle observation callbacks (§4.5, §6): one slot per extension
//! point, no registry, re-registration overwrites. Every fire point
//! swallows panics unconditionally — observation must never corrupt
//! lifecycle.

use cue_core::WorkUnit;
use parking_lot::Mutex;
use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

type OnStart = dyn Fn(&WorkUnit) + Send + Sync;
type OnComplete = dyn Fn(&WorkUnit, &Value, Duration) + Send + Sync;
type OnFailure = dyn Fn(&WorkUnit, &str) + Send + Sync;
type OnSkip = dyn Fn(&WorkUnit) + Send + Sync;
type OnPendingWarning = dyn Fn(&WorkUnit, u64) + Send + Sync;
type OnStallWarning = dyn Fn(u64, usize) + Send + Sync;

macro_rules! callback_slot {
    ($set_name:ident, $fire_name:ident, $field:ident, ($($arg:ident : $arg_ty:ty),*)) => {
        pub fn $set_name(&self, f: impl Fn($($arg_ty),*) + Send + Sync + 'static) {
            *self.$field.lock() = Some(Arc::new(f));
        }

        pub fn $fire_name(&self, $($arg: $arg_ty),*) {
            let callback = self.$field.lock().clone();
            if let Some(f) = callback {
                let _ = catch_unwind(AssertUnwindSafe(|| f($($arg),*)));
            }
        }
    };
}

#[derive(Default)]
pub struct Callbacks {
    on_start: Mutex<Option<Arc<OnStart>>>,
    on_complete: Mutex<Option<Arc<OnComplete>>>,
    on_failure: Mutex<Option<Arc<OnFailure>>>,
    on_skip: Mutex<Option<Arc<OnSkip>>>,
    on_pending_warning: Mutex<Option<Arc<OnPendingWarning>>>,
    on_stall_warning: Mutex<Option<Arc<OnStallWarning>>>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    callback_slot!(set_on_start, fire_on_start, on_start, (unit: &WorkUnit));
    callback_slot!(
        set_on_complete,
        fire_on_complete,
        on_complete,
        (unit: &WorkUnit, result: &Value, duration: Duration)
    );
    callback_slot!(
        set_on_failure,
        fire_on_failure,
        on_failure,
        (unit: &WorkUnit, error: &str)
    );
    callback_slot!(set_on_skip, fire_on_skip, on_skip, (unit: &WorkUnit));
    callback_slot!(
        set_on_pending_warning,
        fire_on_pending_warning,
        on_pending_warning,
        (unit: &WorkUnit, seconds: u64)
    );
    callback_slot!(
        set_on_stall_warning,
        fire_on_stall_warning,
        on_stall_warning,
        (seconds: u64, pending_count: usize)
    );
}

#[cfg(test)]
#[path = "callbacks_tests.rs"]
mod tests;
