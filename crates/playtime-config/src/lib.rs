//! Configuration parsing and persistence for playtimed
//!
//! Supports TOML configuration with:
//! - The recognized option surface (timezone, daily limit, warnings,
//!   messages, intervals, whitelist, ui block)
//! - A validated immutable snapshot (`LimiterConfig`) swapped whole on reload
//! - Synchronous write-back of admin-mutated fields

mod persist;
mod schema;
mod snapshot;

pub use persist::*;
pub use schema::*;
pub use snapshot::*;

use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<LimiterConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<LimiterConfig> {
    let raw: RawConfig = toml::from_str(content)?;
    LimiterConfig::from_raw(raw)
}

/// Load the raw (unvalidated) schema, used by the write-back path
pub(crate) fn load_raw(path: impl AsRef<Path>) -> ConfigResult<RawConfig> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}
