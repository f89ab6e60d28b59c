// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

//! Error taxonomy.
//!
//! Configuration errors are synchronous and raised at registration time,
//! before any work is affected. Submission errors are raised from
//! `submit`. Everything else (predicate faults, handler failures,
//! watchdog timeouts, observation-callback faults) never escapes as a
//! `Result` — it is folded into a work unit's terminal state instead
//! (see `cue-engine`'s executor and watchdog modules).

use thiserror::Error;

/// Errors raised by the synchronous, pre-start registration operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown service: {0}")]
    UnknownService(String),
    #[error("unknown task: {0}")]
    UnknownTask(String),
    #[error("invalid rate string {0:?}: {1}")]
    InvalidRate(String, String),
}

/// Errors raised from `submit`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("unknown task: {0}")]
    UnknownTask(String),
}
