//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (PORT / LOAD_POLL_INTERVAL_MS overrides)
//!     → validation.rs (semantic checks)
//!     → NodeConfig (validated, immutable)
//!     → consumed once at startup
//! ```
//!
//! # Design Decisions
//! - All fields have defaults, so the node runs with no file at all
//! - Precedence: CLI flags > environment > file > defaults
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, load_config, ConfigError};
pub use schema::{
    ListenerConfig, LoadConfig, LogFormat, MetadataConfig, NodeConfig, ObservabilityConfig,
    TimeoutConfig, DEFAULT_PORT,
};
pub use validation::{validate_config, ValidationError};
