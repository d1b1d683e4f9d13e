//! Shared utilities for playtimed
//!
//! This crate provides:
//! - The `PlayerId` identity type
//! - Time utilities (minute accounting, midnight scheduling, duration helpers)
//! - Error types
//! - Default paths for config and data directories

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
