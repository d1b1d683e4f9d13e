//! Default paths for playtimed
//!
//! Paths are user-writable by default (no root required):
//! - Config: `$XDG_CONFIG_HOME/playtimed/config.toml` or `~/.config/playtimed/config.toml`
//! - Data: `$XDG_DATA_HOME/playtimed` or `~/.local/share/playtimed`

use std::path::PathBuf;

/// Application subdirectory name
const APP_DIR: &str = "playtimed";

/// Get the default configuration file path.
///
/// Order of precedence:
/// 1. `$XDG_CONFIG_HOME/playtimed/config.toml` (if XDG_CONFIG_HOME is set)
/// 2. `~/.config/playtimed/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join("config.toml");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join("config.toml");
    }

    PathBuf::from("/tmp").join(APP_DIR).join("config.toml")
}

/// Get the default data directory (holds the usage database).
///
/// Order of precedence:
/// 1. `$XDG_DATA_HOME/playtimed` (if XDG_DATA_HOME is set)
/// 2. `~/.local/share/playtimed` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    PathBuf::from("/tmp").join(APP_DIR).join("data")
}
