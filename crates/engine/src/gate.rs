// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

//! The Service Gate: concurrency caps and sliding-window rate limits
//! for named external services.
//!
//! Admission is "yes iff both axes hold." Reservation is atomic with
//! the admission check — a single lock acquisition covers the read
//! and the write, so two dispatches in the same tick can't both slip
//! through a cap of one.

use cue_core::{RateLimit, ServiceDefinition, WorkId};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Instant;

struct Gate {
    definition: ServiceDefinition,
    in_flight: HashSet<WorkId>,
    timestamps: VecDeque<Instant>,
}

impl Gate {
    fn new(definition: ServiceDefinition) -> Self {
        Self {
            definition,
            in_flight: HashSet::new(),
            timestamps: VecDeque::new(),
        }
    }

    fn prune(&mut self, now: Instant) {
        if let Some(RateLimit { window, .. }) = self.definition.rate_limit {
            while let Some(front) = self.timestamps.front() {
                if now.saturating_duration_since(*front) >= window {
                    self.timestamps.pop_front();
                } else {
                    break;
                }
            }
        }
    }

    fn admits(&self, now: Instant) -> bool {
        if let Some(cap) = self.definition.concurrency_cap {
            if self.in_flight.len() >= cap {
                return false;
            }
        }
        if let Some(RateLimit { count, window }) = self.definition.rate_limit {
            let in_window = self
                .timestamps
                .iter()
                .filter(|t| now.saturating_duration_since(**t) < window)
                .count();
            if in_window >= count as usize {
                return false;
            }
        }
        true
    }

    fn reserve(&mut self, id: WorkId, now: Instant) {
        self.in_flight.insert(id);
        self.timestamps.push_back(now);
    }

    fn release(&mut self, id: &WorkId) {
        self.in_flight.remove(id);
    }
}

/// Every registered service's gate, keyed by service name.
#[derive(Default)]
pub struct ServiceGates {
    gates: Mutex<HashMap<String, Gate>>,
}

impl ServiceGates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, definition: ServiceDefinition) {
        self.gates
            .lock()
            .insert(definition.name.clone(), Gate::new(definition));
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.gates.lock().contains_key(name)
    }

    /// Atomically check admission and, if admitted, reserve a slot and
    /// record the dispatch timestamp. Unregistered services always
    /// admit — scheduling validates `uses` against registration at
    /// task-registration time, not here.
    pub fn try_reserve(&self, service: &str, id: WorkId, now: Instant) -> bool {
        let mut gates = self.gates.lock();
        match gates.get_mut(service) {
            None => true,
            Some(gate) => {
                gate.prune(now);
                if gate.admits(now) {
                    gate.reserve(id, now);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Non-mutating peek used by `debug_blocked`; does not reserve.
    pub fn would_admit(&self, service: &str, now: Instant) -> bool {
        let mut gates = self.gates.lock();
        match gates.get_mut(service) {
            None => true,
            Some(gate) => {
                gate.prune(now);
                gate.admits(now)
            }
        }
    }

    pub fn release(&self, service: &str, id: &WorkId) {
        if let Some(gate) = self.gates.lock().get_mut(service) {
            gate.release(id);
        }
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
