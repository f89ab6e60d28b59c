// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Cue Authors

//! Construction-time configuration: tick pacing and the four watchdog
//! thresholds (§4.6). All four thresholds are optional; a `None`
//! threshold means that watchdog is disabled.

use std::time::Duration;

/// Configuration fixed at orchestrator construction.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// How long the scheduler loop sleeps between ticks.
    pub tick_interval: Duration,
    /// Fail a pending unit once it has waited longer than this.
    pub pending_timeout: Option<Duration>,
    /// Emit `on_pending_warning` once a pending unit has waited this long.
    pub pending_warn_after: Option<Duration>,
    /// Emit `on_stall_warning` once no unit has terminated for this long.
    pub stall_warn_after: Option<Duration>,
    /// Fail every pending unit and stop the orchestrator once no unit has
    /// terminated for this long.
    pub stall_timeout: Option<Duration>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(10),
            pending_timeout: None,
            pending_warn_after: None,
            stall_warn_after: None,
            stall_timeout: None,
        }
    }
}

impl OrchestratorConfig {
    pub fn builder() -> OrchestratorConfigBuilder {
        OrchestratorConfigBuilder::default()
    }
}

/// Builder for [`OrchestratorConfig`]. Thresholds are given in seconds,
/// matching the spec's external interface (`pending_timeout`,
/// `pending_warn_after`, `stall_warn_after`, `stall_timeout` are all
/// "seconds, optional").
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfigBuilder {
    config: OrchestratorConfig,
}

impl OrchestratorConfigBuilder {
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval = interval;
        self
    }

    pub fn pending_timeout(mut self, seconds: f64) -> Self {
        self.config.pending_timeout = Some(Duration::from_secs_f64(seconds));
        self
    }

    pub fn pending_warn_after(mut self, seconds: f64) -> Self {
        self.config.pending_warn_after = Some(Duration::from_secs_f64(seconds));
        self
    }

    pub fn stall_warn_after(mut self, seconds: f64) -> Self {
        self.config.stall_warn_after = Some(Duration::from_secs_f64(seconds));
        self
    }

    pub fn stall_timeout(mut self, seconds: f64) -> Self {
        self.config.stall_timeout = Some(Duration::from_secs_f64(seconds));
        self
    }

    pub fn build(self) -> OrchestratorConfig {
        self.config
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
