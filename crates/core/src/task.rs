// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

//! Task registration: the name that selects a handler and optional
//! service binding.
//!
//! Rust has no decorator syntax, so registering a handler is a plain
//! constructor call rather than `@cue.task(...)` wrapping a function.
//! Both synchronous and asynchronous handlers are supported through two
//! constructors so callers never have to wrap synchronous work in an
//! async block just to satisfy a single handler type.

use crate::work::WorkUnit;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// What a handler returns: a JSON result on success, a stringified
/// error on failure. Matches the spec's "returns an arbitrary value or
/// raises" — Rust expresses "or raises" as `Err`.
pub type HandlerOutcome = Result<serde_json::Value, String>;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A registered handler, synchronous or asynchronous.
#[derive(Clone)]
pub enum Task {
    Sync(Arc<dyn Fn(&WorkUnit) -> HandlerOutcome + Send + Sync>),
    Async(Arc<dyn Fn(&WorkUnit) -> BoxFuture<'static, HandlerOutcome> + Send + Sync>),
}

impl Task {
    /// Wrap a synchronous handler. Runs inline on the executor task,
    /// blocking it until it returns — exactly as the spec describes.
    pub fn sync(f: impl Fn(&WorkUnit) -> HandlerOutcome + Send + Sync + 'static) -> Self {
        Task::Sync(Arc::new(f))
    }

    /// Wrap an asynchronous handler.
    pub fn async_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(&WorkUnit) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerOutcome> + Send + 'static,
    {
        Task::Async(Arc::new(move |unit| Box::pin(f(unit))))
    }

    /// Invoke the handler, awaiting it if asynchronous.
    pub async fn call(&self, unit: &WorkUnit) -> HandlerOutcome {
        match self {
            Task::Sync(f) => f(unit),
            Task::Async(f) => f(unit).await,
        }
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Task::Sync(_) => "Sync",
            Task::Async(_) => "Async",
        };
        f.debug_tuple("Task").field(&kind).finish()
    }
}

/// A named handler plus optional service binding.
#[derive(Debug, Clone)]
pub struct TaskDefinition {
    pub name: String,
    /// Name of the service this task's dispatches are gated through.
    /// `None` means ungated — always admitted.
    pub uses: Option<String>,
    /// Reserved: the core currently executes at most once per
    /// submission regardless of this value.
    pub retry: u32,
    pub handler: Task,
}

impl TaskDefinition {
    pub fn new(name: impl Into<String>, uses: Option<String>, retry: u32, handler: Task) -> Self {
        Self {
            name: name.into(),
            uses,
            retry,
            handler,
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
