//! Attentrack Common Utilities
//!
//! Shared infrastructure for all Attentrack crates:
//! - Error types and result aliases
//! - Clock and tick-pacing utilities
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
