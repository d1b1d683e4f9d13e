//! JSON-lines wire protocol
//!
//! The daemon speaks newline-delimited JSON on stdin/stdout: the game-server
//! side sends one [`Inbound`] object per line and receives [`Outbound`]
//! objects back. Connect/disconnect carry the real player UUID; admin
//! commands take an identity string (UUID or registered display name) and
//! resolve it daemon-side.

use playtime_core::CoreAction;
use playtime_util::PlayerId;
use serde::{Deserialize, Serialize};

/// Messages accepted on stdin, one JSON object per line
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    /// A player joined the server
    Connect {
        player: PlayerId,
        #[serde(default)]
        name: Option<String>,
    },

    /// A player left (including after a kick we requested)
    Disconnect { player: PlayerId },

    /// The player holds the bypass permission
    GrantBypass { player: PlayerId },
    RevokeBypass { player: PlayerId },

    /// Admin: today's usage for a player
    GetUsage { player: String },

    /// Admin: override today's usage
    SetMinutes { player: String, minutes: i64 },

    /// Admin: change the daily limit, persisted to the config file
    SetDailyLimit { minutes: i64 },

    /// Admin: exemption list management, persisted to the config file
    WhitelistAdd { player: String },
    WhitelistRemove { player: String },
    WhitelistList,

    /// Reload the config file and swap the snapshot
    Reload,

    /// Flush, save, and exit
    Shutdown,
}

/// Messages emitted on stdout, one JSON object per line
#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    /// A core action for the server to carry out
    Action {
        #[serde(flatten)]
        action: CoreAction,
    },

    /// Reply to `get_usage`
    Usage {
        player: PlayerId,
        minutes_today: u32,
        /// Absent for exempt players
        limit: Option<i64>,
    },

    /// Reply to `whitelist_list`
    Whitelist { players: Vec<PlayerId> },

    /// Generic success reply
    Ack { message: String },

    /// Command-level failure (unknown player, bad config, parse error)
    Error { message: String },
}

impl Outbound {
    pub fn action(action: CoreAction) -> Self {
        Outbound::Action { action }
    }

    pub fn ack(message: impl Into<String>) -> Self {
        Outbound::Ack {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Outbound::Error {
            message: message.into(),
        }
    }
}
