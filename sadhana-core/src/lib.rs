//! Sadhana Core - shared infrastructure for the sadhana platform
//!
//! Provides the error type and logging bootstrap used by every other crate.

pub mod error;
pub mod logging;

pub use error::*;
pub use logging::*;

// Re-export commonly used external types
pub use tracing;
