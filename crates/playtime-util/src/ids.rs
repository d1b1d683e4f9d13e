//! Strongly-typed identifiers for playtimed

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Stable identity of a player, globally unique and never reused.
///
/// The inner value is the UUID assigned by the identity provider of the
/// host game server; playtimed never mints these itself outside of tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(Uuid);

impl PlayerId {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse an identity string. Malformed input yields `None`, never an
    /// error, so admin lookups can report "not found" instead of failing.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Fresh random identity, for tests and fixtures.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PlayerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_id_uniqueness() {
        let a = PlayerId::random();
        let b = PlayerId::random();
        assert_ne!(a, b);
    }

    #[test]
    fn parse_roundtrip() {
        let id = PlayerId::random();
        let parsed = PlayerId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_malformed_is_none() {
        assert!(PlayerId::parse("not-a-uuid").is_none());
        assert!(PlayerId::parse("").is_none());
        assert!(PlayerId::parse("123e4567-e89b-12d3-a456").is_none());
    }

    #[test]
    fn ids_serialize_deserialize() {
        let id = PlayerId::random();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: PlayerId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
