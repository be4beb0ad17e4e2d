//! Node health state machine.
//!
//! # States
//! - Healthy: the node reports 200 on its health route (initial)
//! - Unhealthy: the node reports 500 on its health route
//!
//! # State Transitions
//! ```text
//! Healthy → Unhealthy: set_unhealthy()
//! Unhealthy → Healthy: set_healthy()
//! ```
//!
//! No automatic transitions and no terminal state.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::observability::metrics;

/// Health status as reported to the instance group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    /// Lowercase label used in views and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

impl From<bool> for HealthStatus {
    fn from(healthy: bool) -> Self {
        if healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared healthy/unhealthy flag.
///
/// Reads and writes are single atomic operations, so concurrent readers never
/// observe anything but the last completed write.
#[derive(Debug)]
pub struct HealthState {
    healthy: AtomicBool,
}

impl HealthState {
    /// Create a new health state, initially healthy.
    pub fn new() -> Self {
        Self {
            healthy: AtomicBool::new(true),
        }
    }

    /// Mark the node healthy.
    pub fn set_healthy(&self) {
        self.transition(true);
    }

    /// Mark the node unhealthy.
    pub fn set_unhealthy(&self) {
        self.transition(false);
    }

    /// Check whether the node currently reports healthy.
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    /// Current status as an enum.
    pub fn status(&self) -> HealthStatus {
        HealthStatus::from(self.is_healthy())
    }

    fn transition(&self, healthy: bool) {
        let previous = self.healthy.swap(healthy, Ordering::SeqCst);
        if previous == healthy {
            tracing::debug!(status = %HealthStatus::from(healthy), "Health unchanged");
        } else {
            tracing::info!(
                from = %HealthStatus::from(previous),
                to = %HealthStatus::from(healthy),
                "Health state changed"
            );
        }
        metrics::publish_flag(&self.healthy, metrics::set_healthy);
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}
