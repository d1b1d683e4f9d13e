//! Synchronous write-back of admin-mutated configuration fields
//!
//! The admin surface can change the daily limit and the whitelist at
//! runtime; both must survive a restart, so each mutation rewrites the
//! config file before the command returns. Unrecognized keys are not
//! preserved: the file is parsed into the raw schema and re-serialized.

use crate::schema::RawConfig;
use crate::{ConfigResult, load_raw};
use playtime_util::PlayerId;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Persist a new daily limit into the config file.
pub fn persist_daily_limit(path: impl AsRef<Path>, minutes: i64) -> ConfigResult<()> {
    let path = path.as_ref();
    let mut raw = load_raw(path)?;
    raw.daily_limit_minutes = Some(minutes);
    write_raw(path, &raw)?;

    info!(minutes, "Daily limit persisted");
    Ok(())
}

/// Persist the whitelist into the config file.
pub fn persist_whitelist(path: impl AsRef<Path>, whitelist: &HashSet<PlayerId>) -> ConfigResult<()> {
    let path = path.as_ref();
    let mut raw = load_raw(path)?;

    // Sorted for a stable file, the set itself is unordered
    let mut entries: Vec<String> = whitelist.iter().map(|id| id.to_string()).collect();
    entries.sort_unstable();
    raw.whitelist = Some(entries);
    write_raw(path, &raw)?;

    info!(count = whitelist.len(), "Whitelist persisted");
    Ok(())
}

fn write_raw(path: &Path, raw: &RawConfig) -> ConfigResult<()> {
    let content = toml::to_string_pretty(raw)?;
    std::fs::write(path, content)?;
    Ok(())
}
