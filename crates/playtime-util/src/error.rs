//! Error types for playtimed

use thiserror::Error;

/// Core error type for playtimed operations
#[derive(Debug, Error)]
pub enum PlaytimeError {
    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaytimeError {
    pub fn player_not_found(who: impl Into<String>) -> Self {
        Self::PlayerNotFound(who.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, PlaytimeError>;
