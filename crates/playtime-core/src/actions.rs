//! Actions emitted by the core for the host process to carry out

use playtime_util::PlayerId;
use serde::Serialize;

/// Progress bar color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarColor {
    Green,
    Yellow,
    Red,
    /// Distinct color for players without a limit
    Blue,
}

/// Actions the core asks the host to perform. The core never reaches into
/// the host directly; it hands these back from its entry points.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CoreAction {
    /// One-time warning that the cap is approaching
    Warn {
        player: PlayerId,
        threshold: i64,
        remaining: i64,
        chat: String,
        /// Present when actionbar-on-warn is enabled
        actionbar: Option<String>,
    },

    /// Message to every currently active player
    Broadcast { message: String },

    /// Disconnect a player whose cap is reached
    Kick { player: PlayerId, message: String },

    /// Push a progress bar update for one player
    Display {
        player: PlayerId,
        title: String,
        progress: f64,
        color: BarColor,
    },

    /// Remove the progress bar for one player
    HideDisplay { player: PlayerId },
}
