// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

use super::*;
use cue_core::test_support::pending_unit;
use std::time::Instant;

fn unit() -> cue_core::WorkUnit {
    pending_unit("w-1", "task", serde_json::json!({}), Instant::now())
}

#[test]
fn defaults_are_ready_and_stale() {
    let eval = PredicateEvaluator::new();
    assert!(eval.is_ready(&unit()));
    assert!(eval.is_stale(&unit()));
}

#[test]
fn registered_predicates_are_consulted() {
    let eval = PredicateEvaluator::new();
    eval.set_is_ready(|_| false);
    eval.set_is_stale(|_| false);
    assert!(!eval.is_ready(&unit()));
    assert!(!eval.is_stale(&unit()));
}

#[test]
fn panicking_is_ready_fails_closed() {
    let eval = PredicateEvaluator::new();
    eval.set_is_ready(|_| panic!("boom"));
    assert!(!eval.is_ready(&unit()));
}

#[test]
fn panicking_is_stale_fails_open() {
    let eval = PredicateEvaluator::new();
    eval.set_is_stale(|_| panic!("boom"));
    assert!(eval.is_stale(&unit()));
}

#[test]
fn re_registration_overwrites() {
    let eval = PredicateEvaluator::new();
    eval.set_is_ready(|_| false);
    eval.set_is_ready(|_| true);
    assert!(eval.is_ready(&unit()));
}
