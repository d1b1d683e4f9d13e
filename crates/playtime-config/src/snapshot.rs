//! Validated runtime configuration snapshot
//!
//! A `LimiterConfig` is immutable once built; reload constructs a fresh
//! snapshot and swaps the whole value so no component ever observes a
//! half-updated configuration.

use crate::schema::{RawConfig, RawUiConfig};
use crate::ConfigError;
use chrono_tz::Tz;
use playtime_util::PlayerId;
use std::collections::HashSet;
use std::time::Duration;
use tracing::warn;

/// Runtime configuration snapshot consumed by the core
#[derive(Debug, Clone)]
pub struct LimiterConfig {
    /// Timezone the calendar day and midnight rollover are anchored to
    pub timezone: Tz,

    /// Daily cap in minutes. Accepted as-is, including out-of-range values;
    /// bounds policy belongs to whoever writes the file.
    pub daily_limit_minutes: i64,

    /// Warning thresholds in minutes remaining, ascending, deduplicated
    pub warnings: Vec<i64>,

    /// Kick message for the evicted player
    pub kick_message: String,

    /// Broadcast template with `{player}`
    pub broadcast: String,

    /// Flush/autosave interval
    pub save_interval: Duration,

    /// Players exempt from the limit
    pub whitelist: HashSet<PlayerId>,

    /// Presentation options
    pub ui: UiConfig,
}

/// Validated presentation options
#[derive(Debug, Clone)]
pub struct UiConfig {
    pub bossbar: bool,
    pub actionbar_on_warn: bool,
    pub green_above_minutes: i64,
    pub yellow_above_minutes: i64,
    pub title: String,
    pub actionbar: String,
    pub update_interval: Duration,
}

impl LimiterConfig {
    /// Convert from raw config, applying defaults
    pub fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let zone_name = raw.timezone.unwrap_or_else(|| "Europe/Berlin".to_string());
        let timezone: Tz = zone_name
            .parse()
            .map_err(|_| ConfigError::UnknownTimezone(zone_name))?;

        let mut warnings = raw.warnings.unwrap_or_default();
        warnings.sort_unstable();
        warnings.dedup();

        let mut whitelist = HashSet::new();
        for entry in raw.whitelist.unwrap_or_default() {
            match PlayerId::parse(&entry) {
                Some(id) => {
                    whitelist.insert(id);
                }
                None => warn!(entry, "Skipping malformed whitelist entry"),
            }
        }

        Ok(Self {
            timezone,
            daily_limit_minutes: raw.daily_limit_minutes.unwrap_or(120),
            warnings,
            kick_message: raw
                .kick_message
                .unwrap_or_else(|| "Daily limit reached.".to_string()),
            broadcast: raw
                .broadcast
                .unwrap_or_else(|| "{player} reached the daily limit.".to_string()),
            save_interval: Duration::from_secs(raw.save_interval_seconds.unwrap_or(60).max(1)),
            whitelist,
            ui: UiConfig::from_raw(raw.ui),
        })
    }

    /// Whether a player is exempt through the whitelist
    pub fn is_whitelisted(&self, player: &PlayerId) -> bool {
        self.whitelist.contains(player)
    }
}

impl UiConfig {
    fn from_raw(raw: RawUiConfig) -> Self {
        Self {
            bossbar: raw.bossbar.unwrap_or(true),
            actionbar_on_warn: raw.actionbar_on_warn.unwrap_or(true),
            green_above_minutes: raw.colors.green_above_minutes.unwrap_or(30),
            yellow_above_minutes: raw.colors.yellow_above_minutes.unwrap_or(5),
            title: raw
                .title
                .unwrap_or_else(|| "Playtime: {remaining} min".to_string()),
            actionbar: raw
                .actionbar
                .unwrap_or_else(|| "{remaining} min left".to_string()),
            update_interval: Duration::from_secs(raw.update_interval_seconds.unwrap_or(5).max(1)),
        }
    }
}
