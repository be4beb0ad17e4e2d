//! Instance metadata lookups.
//!
//! # Data Flow
//! ```text
//! handler
//!     → client.rs (three concurrent GETs against the metadata service)
//!     → strip resource path prefix (".../zones/<zone>" → "<zone>")
//!     → instance.rs (InstanceInfo view data, hostname)
//! ```
//!
//! # Design Decisions
//! - Any failure (transport, timeout, non-200) becomes an empty string
//! - Failures are logged and counted, never returned to handlers

pub mod client;
pub mod instance;

pub use client::{MetadataClient, MetadataError, MetadataField};
pub use instance::{local_hostname, InstanceInfo};
