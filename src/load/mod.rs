//! CPU load generation subsystem.
//!
//! # Data Flow
//! ```text
//! /startLoad, /stopLoad
//!     → generator.rs (toggle running flag, wake worker)
//!
//! worker thread (one per generator, spawned at construction):
//!     running  → burn CPU in small batches
//!     !running → park for one polling interval, re-check
//! ```
//!
//! # Design Decisions
//! - One long-lived OS thread instead of a task per request: the burn loop
//!   never yields, so it must not sit on the async runtime
//! - The flag is the only thing crossing the thread boundary
//! - The worker is joined when the generator is dropped

pub mod generator;

pub use generator::LoadGenerator;
