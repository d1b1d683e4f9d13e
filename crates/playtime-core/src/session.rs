//! Session registry
//!
//! Tracks, per connected player, the instant the current session segment
//! began. A segment starts on connect and is re-baselined by every flush so
//! elapsed time is never double-counted. Entries exist only while the
//! player is connected and are never persisted.

use chrono::{DateTime, Utc};
use playtime_util::{elapsed_minutes, PlayerId};
use std::collections::HashMap;

/// Registry of active session segments
#[derive(Debug, Default)]
pub struct SessionRegistry {
    starts: HashMap<PlayerId, DateTime<Utc>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `now` as the session segment start, overwriting any stale
    /// prior entry (also used to re-baseline after an admin override).
    pub fn begin(&mut self, player: PlayerId, now: DateTime<Utc>) {
        self.starts.insert(player, now);
    }

    /// Remove the entry and return whole minutes elapsed since the segment
    /// start. Absent entry returns 0 and is a no-op, not an error.
    pub fn end(&mut self, player: &PlayerId, now: DateTime<Utc>) -> u32 {
        match self.starts.remove(player) {
            Some(start) => elapsed_minutes(start, now),
            None => 0,
        }
    }

    /// Whole minutes elapsed since the segment start, without removing the
    /// entry. Absent entry reads 0.
    pub fn elapsed_since_flush(&self, player: &PlayerId, now: DateTime<Utc>) -> u32 {
        self.starts
            .get(player)
            .map(|start| elapsed_minutes(*start, now))
            .unwrap_or(0)
    }

    /// Reset the segment start after a flush. No-op if not connected.
    pub fn rebaseline(&mut self, player: &PlayerId, now: DateTime<Utc>) {
        if let Some(start) = self.starts.get_mut(player) {
            *start = now;
        }
    }

    pub fn is_active(&self, player: &PlayerId) -> bool {
        self.starts.contains_key(player)
    }

    /// Snapshot of currently active players
    pub fn active(&self) -> Vec<PlayerId> {
        self.starts.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 23, 12 + minute / 60, minute % 60, second)
            .unwrap()
    }

    #[test]
    fn end_returns_floored_minutes() {
        let mut reg = SessionRegistry::new();
        let id = PlayerId::random();

        reg.begin(id, at(0, 0));
        assert_eq!(reg.end(&id, at(7, 59)), 7);
    }

    #[test]
    fn end_twice_is_idempotent() {
        let mut reg = SessionRegistry::new();
        let id = PlayerId::random();

        reg.begin(id, at(0, 0));
        assert_eq!(reg.end(&id, at(5, 0)), 5);
        // No intervening begin: second end yields zero elapsed
        assert_eq!(reg.end(&id, at(10, 0)), 0);
        assert!(!reg.is_active(&id));
    }

    #[test]
    fn elapsed_does_not_remove() {
        let mut reg = SessionRegistry::new();
        let id = PlayerId::random();

        reg.begin(id, at(0, 0));
        assert_eq!(reg.elapsed_since_flush(&id, at(3, 30)), 3);
        assert!(reg.is_active(&id));
        assert_eq!(reg.elapsed_since_flush(&id, at(3, 30)), 3);
    }

    #[test]
    fn rebaseline_prevents_double_counting() {
        let mut reg = SessionRegistry::new();
        let id = PlayerId::random();

        reg.begin(id, at(0, 0));
        assert_eq!(reg.elapsed_since_flush(&id, at(4, 0)), 4);

        reg.rebaseline(&id, at(4, 0));
        assert_eq!(reg.elapsed_since_flush(&id, at(4, 0)), 0);
        assert_eq!(reg.elapsed_since_flush(&id, at(6, 0)), 2);
    }

    #[test]
    fn begin_overwrites_stale_entry() {
        let mut reg = SessionRegistry::new();
        let id = PlayerId::random();

        reg.begin(id, at(0, 0));
        reg.begin(id, at(10, 0));
        assert_eq!(reg.elapsed_since_flush(&id, at(12, 0)), 2);
    }

    #[test]
    fn unknown_player_reads_zero() {
        let mut reg = SessionRegistry::new();
        let id = PlayerId::random();

        assert_eq!(reg.elapsed_since_flush(&id, at(0, 0)), 0);
        assert_eq!(reg.end(&id, at(0, 0)), 0);
        assert!(reg.is_empty());
    }
}
