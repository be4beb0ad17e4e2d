//! Synthetic health subsystem.
//!
//! # Data Flow
//! ```text
//! /makeHealthy, /makeUnhealthy
//!     → state.rs (atomic flag write)
//!
//! /health, /, /status
//!     → state.rs (atomic flag read)
//!     → 200 / 500 on the health route
//! ```
//!
//! # Design Decisions
//! - Two states only, no hysteresis: the flag is driven by operators
//! - Independent from the load generator, no shared lock

pub mod state;

pub use state::{HealthState, HealthStatus};
