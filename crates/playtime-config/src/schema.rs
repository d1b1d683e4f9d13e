//! Raw configuration schema (as parsed from TOML)
//!
//! Key names follow the recognized option surface (`dailyLimitMinutes`,
//! `ui.colors.greenAboveMinutes`, ...) so existing deployments keep their
//! vocabulary.

use serde::{Deserialize, Serialize};

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    /// IANA timezone name the calendar day is anchored to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// Daily cap in minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_limit_minutes: Option<i64>,

    /// Minutes-remaining values at which a one-time warning is due
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<i64>>,

    /// Kick message shown to the evicted player
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kick_message: Option<String>,

    /// Broadcast template with `{player}` substituted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broadcast: Option<String>,

    /// Autosave/flush interval in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_interval_seconds: Option<u64>,

    /// Player identity strings exempt from the limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whitelist: Option<Vec<String>>,

    /// Presentation options
    #[serde(default)]
    pub ui: RawUiConfig,
}

/// Presentation block
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUiConfig {
    /// Whether the progress bar is shown at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bossbar: Option<bool>,

    /// Whether warnings also push an actionbar line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actionbar_on_warn: Option<bool>,

    /// Color thresholds in minutes remaining
    #[serde(default)]
    pub colors: RawUiColors,

    /// Bar title template with `{remaining}` substituted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Actionbar template with `{remaining}` substituted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actionbar: Option<String>,

    /// Presentation update interval in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_interval_seconds: Option<u64>,
}

/// Color threshold block
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUiColors {
    /// Bar is green while remaining is strictly above this
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green_above_minutes: Option<i64>,

    /// Bar is yellow while remaining is strictly above this (red below)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yellow_above_minutes: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognized_option_names() {
        let toml_str = r#"
            timezone = "Europe/Berlin"
            dailyLimitMinutes = 120
            warnings = [30, 10]
            kickMessage = "Daily limit reached."
            broadcast = "{player} reached the daily limit."
            saveIntervalSeconds = 60
            whitelist = []

            [ui]
            bossbar = true
            actionbarOnWarn = true
            title = "Playtime: {remaining} min"
            actionbar = "{remaining} min left"
            updateIntervalSeconds = 5

            [ui.colors]
            greenAboveMinutes = 30
            yellowAboveMinutes = 5
        "#;

        let raw: RawConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(raw.daily_limit_minutes, Some(120));
        assert_eq!(raw.warnings, Some(vec![30, 10]));
        assert_eq!(raw.ui.colors.green_above_minutes, Some(30));
        assert_eq!(raw.ui.update_interval_seconds, Some(5));
    }

    #[test]
    fn parse_empty_config() {
        let raw: RawConfig = toml::from_str("").unwrap();
        assert!(raw.timezone.is_none());
        assert!(raw.ui.bossbar.is_none());
    }
}
