// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

use super::*;

#[test]
fn work_id_display() {
    let id = WorkId::new("w-1");
    assert_eq!(id.to_string(), "w-1");
}

#[test]
fn work_id_equality() {
    let a = WorkId::new("w-1");
    let b = WorkId::new("w-1");
    let c = WorkId::new("w-2");
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn work_id_from_str() {
    let id: WorkId = "w-7".into();
    assert_eq!(id.as_str(), "w-7");
}

#[test]
fn work_id_serde_roundtrip() {
    let id = WorkId::new("w-42");
    let json = serde_json::to_string(&id).expect("serialize");
    assert_eq!(json, "\"w-42\"");
    let parsed: WorkId = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(parsed, id);
}

#[test]
fn uuid_id_gen_produces_distinct_ids() {
    let gen = UuidIdGen;
    let a = gen.next();
    let b = gen.next();
    assert_ne!(a, b);
}

#[test]
fn sequential_id_gen_increments() {
    let gen = SequentialIdGen::new("t");
    assert_eq!(gen.next().as_str(), "t-1");
    assert_eq!(gen.next().as_str(), "t-2");
    assert_eq!(gen.next().as_str(), "t-3");
}
