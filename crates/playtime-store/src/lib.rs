//! Persistence layer for playtimed
//!
//! The store is a date-keyed namespace of per-player daily counters and
//! warned-threshold flags. The core treats it as durable enough to survive
//! a restart; durability ordering is limited to "save after each mutating
//! batch". In-memory state stays authoritative when a save fails.

mod json;
mod traits;

pub use json::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
