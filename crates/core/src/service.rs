// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

//! Service registration: the name a task binds to, and its concurrency
//! cap / rate-limit envelope. The runtime in-flight set and dispatch
//! timestamp ledger live in `cue-engine`'s gate module — this is just
//! the static configuration.

use crate::error::ConfigError;
use std::time::Duration;

/// A sliding-window rate limit: at most `count` dispatches in any
/// `window`-long interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub count: u32,
    pub window: Duration,
}

/// A named capacity/rate envelope that tasks may bind to.
#[derive(Debug, Clone)]
pub struct ServiceDefinition {
    pub name: String,
    /// Maximum simultaneous in-flight dispatches. `None` means unlimited.
    pub concurrency_cap: Option<usize>,
    /// Maximum dispatches per sliding window. `None` means unlimited.
    pub rate_limit: Option<RateLimit>,
}

impl ServiceDefinition {
    pub fn new(
        name: impl Into<String>,
        rate: Option<&str>,
        concurrent: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let rate_limit = rate.map(parse_rate).transpose()?;
        Ok(Self {
            name: name.into(),
            concurrency_cap: concurrent,
            rate_limit,
        })
    }
}

/// Parse a rate string of the form `"N/unit"`, where `unit` is one of
/// `sec`/`s`/`second`, `min`/`m`/`minute`, or `hour`/`h`/`hr`.
pub fn parse_rate(spec: &str) -> Result<RateLimit, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidRate(spec.to_string(), reason.to_string());

    let (count_str, unit_str) = spec
        .split_once('/')
        .ok_or_else(|| invalid("expected the form \"N/unit\""))?;

    let count: u32 = count_str
        .trim()
        .parse()
        .map_err(|_| invalid("count is not a positive integer"))?;
    if count == 0 {
        return Err(invalid("count must be greater than zero"));
    }

    let window = match unit_str.trim() {
        "sec" | "s" | "second" | "seconds" => Duration::from_secs(1),
        "min" | "m" | "minute" | "minutes" => Duration::from_secs(60),
        "hour" | "h" | "hr" | "hours" => Duration::from_secs(3600),
        other => return Err(invalid(&format!("unknown rate unit {other:?}"))),
    };

    Ok(RateLimit { count, window })
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
