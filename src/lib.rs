//! Instance group test node library.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load;
pub mod metadata;
pub mod node;
pub mod observability;

pub use config::NodeConfig;
pub use health::HealthState;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use load::LoadGenerator;
pub use node::{NodeSnapshot, NodeState};
