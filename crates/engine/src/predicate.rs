// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

//! Predicate Evaluator: `is_ready` and `is_stale`, the two boolean
//! gates every pending unit is checked against before dispatch.
//!
//! Both are user-supplied closures and therefore untrusted: a panic
//! inside one must not take down the scheduler loop. `is_ready`
//! fails closed (treated as `false`, the unit stays pending);
//! `is_stale` fails open toward execution (treated as `true`, so a
//! broken staleness check never silently drops work).

use cue_core::WorkUnit;
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

type Predicate = dyn Fn(&WorkUnit) -> bool + Send + Sync;

#[derive(Default)]
pub struct PredicateEvaluator {
    is_ready: Mutex<Option<Arc<Predicate>>>,
    is_stale: Mutex<Option<Arc<Predicate>>>,
}

impl PredicateEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_is_ready(&self, f: impl Fn(&WorkUnit) -> bool + Send + Sync + 'static) {
        *self.is_ready.lock() = Some(Arc::new(f));
    }

    pub fn set_is_stale(&self, f: impl Fn(&WorkUnit) -> bool + Send + Sync + 'static) {
        *self.is_stale.lock() = Some(Arc::new(f));
    }

    /// Default `true`: a unit with no readiness check is always ready.
    pub fn is_ready(&self, unit: &WorkUnit) -> bool {
        let f = self.is_ready.lock().clone();
        match f {
            None => true,
            Some(f) => catch_unwind(AssertUnwindSafe(|| f(unit))).unwrap_or(false),
        }
    }

    /// Default `true`: a unit with no staleness check is always
    /// considered current and runs normally.
    pub fn is_stale(&self, unit: &WorkUnit) -> bool {
        let f = self.is_stale.lock().clone();
        match f {
            None => true,
            Some(f) => catch_unwind(AssertUnwindSafe(|| f(unit))).unwrap_or(true),
        }
    }
}

#[cfg(test)]
#[path = "predicate_tests.rs"]
mod tests;
