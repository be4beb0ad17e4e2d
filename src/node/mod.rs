//! Process-wide node state shared by every request handler.
//!
//! # Design Decisions
//! - Created once at startup and injected through axum `State`
//! - The health flag and the load generator are independent; no lock spans
//!   both, so a snapshot is two separate atomic reads

pub mod snapshot;

use std::sync::Arc;

use crate::config::LoadConfig;
use crate::health::HealthState;
use crate::load::LoadGenerator;

pub use snapshot::NodeSnapshot;

/// Shared handles to the node's health flag and load generator.
#[derive(Debug, Clone)]
pub struct NodeState {
    health: Arc<HealthState>,
    load: Arc<LoadGenerator>,
}

impl NodeState {
    /// Create the state and spawn the load generator worker.
    pub fn new(config: &LoadConfig) -> std::io::Result<Self> {
        Ok(Self::from_parts(
            Arc::new(HealthState::new()),
            Arc::new(LoadGenerator::new(config.poll_interval())?),
        ))
    }

    pub fn from_parts(health: Arc<HealthState>, load: Arc<LoadGenerator>) -> Self {
        Self { health, load }
    }

    pub fn health(&self) -> &HealthState {
        &self.health
    }

    pub fn load(&self) -> &LoadGenerator {
        &self.load
    }

    /// Read both flags once.
    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            healthy: self.health.is_healthy(),
            working: self.load.is_running(),
        }
    }
}
