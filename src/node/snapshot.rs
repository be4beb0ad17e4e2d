//! Point-in-time view of the node flags.

use serde::Serialize;

use crate::health::HealthStatus;

/// Both flags as read at one moment. Renderers take this by value so a
/// response never mixes reads from before and after a concurrent write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeSnapshot {
    pub healthy: bool,
    pub working: bool,
}

impl NodeSnapshot {
    pub fn health_status(&self) -> HealthStatus {
        HealthStatus::from(self.healthy)
    }
}
