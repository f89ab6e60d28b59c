// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

//! Engine-level error type.
//!
//! Configuration and submission errors are the only ones that ever
//! escape as a `Result` to callers — predicate, handler, watchdog, and
//! observation-callback failures are folded into a work unit's
//! terminal state instead (§7).

use cue_core::{ConfigError, SubmitError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
}
