//! JSON-file-backed store implementation
//!
//! On-disk layout, one object per calendar date:
//!
//! ```json
//! {
//!   "2026-08-23": {
//!     "players": { "<uuid>": 95 },
//!     "warned":  { "<uuid>": [30, 10] }
//!   }
//! }
//! ```
//!
//! The whole document is held in memory and rewritten on `save`; the daily
//! working set is a handful of players, not a database workload.

use chrono::NaiveDate;
use playtime_util::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::{StoreResult, UsageStore};

/// Records for one calendar date
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DayRecord {
    #[serde(default)]
    players: HashMap<PlayerId, u32>,

    #[serde(default)]
    warned: HashMap<PlayerId, Vec<i64>>,
}

/// JSON-file-backed store
pub struct JsonFileStore {
    path: Option<PathBuf>,
    days: Mutex<BTreeMap<String, DayRecord>>,
}

impl JsonFileStore {
    /// Open a store at the given path, loading existing records if present.
    /// An unreadable or corrupt file is logged and replaced with an empty
    /// store rather than refusing to start.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let days = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(days) => days,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Corrupt usage file, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read usage file, starting empty");
                BTreeMap::new()
            }
        };

        Self {
            path: Some(path),
            days: Mutex::new(days),
        }
    }

    /// Create a store with no backing file (for testing); `save` is a no-op.
    pub fn ephemeral() -> Self {
        Self {
            path: None,
            days: Mutex::new(BTreeMap::new()),
        }
    }

    fn day_key(day: NaiveDate) -> String {
        day.format("%Y-%m-%d").to_string()
    }
}

impl UsageStore for JsonFileStore {
    fn minutes(&self, day: NaiveDate, player: &PlayerId) -> u32 {
        let days = self.days.lock().unwrap();
        days.get(&Self::day_key(day))
            .and_then(|rec| rec.players.get(player))
            .copied()
            .unwrap_or(0)
    }

    fn add_minutes(&self, day: NaiveDate, player: &PlayerId, delta: i64) {
        let mut days = self.days.lock().unwrap();
        let rec = days.entry(Self::day_key(day)).or_default();
        let entry = rec.players.entry(*player).or_insert(0);
        *entry = (*entry as i64 + delta).clamp(0, u32::MAX as i64) as u32;

        debug!(player = %player, day = %day, delta, total = *entry, "Usage added");
    }

    fn set_minutes(&self, day: NaiveDate, player: &PlayerId, minutes: i64) {
        let mut days = self.days.lock().unwrap();
        let rec = days.entry(Self::day_key(day)).or_default();
        rec.players
            .insert(*player, minutes.clamp(0, u32::MAX as i64) as u32);
    }

    fn is_warned(&self, day: NaiveDate, player: &PlayerId, threshold: i64) -> bool {
        let days = self.days.lock().unwrap();
        days.get(&Self::day_key(day))
            .and_then(|rec| rec.warned.get(player))
            .is_some_and(|list| list.contains(&threshold))
    }

    fn mark_warned(&self, day: NaiveDate, player: &PlayerId, threshold: i64) {
        let mut days = self.days.lock().unwrap();
        let rec = days.entry(Self::day_key(day)).or_default();
        let list = rec.warned.entry(*player).or_default();
        if !list.contains(&threshold) {
            list.push(threshold);
        }
    }

    fn reset_day(&self, day: NaiveDate) {
        let mut days = self.days.lock().unwrap();
        days.remove(&Self::day_key(day));
        debug!(day = %day, "Day records reset");
    }

    fn save(&self) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = {
            let days = self.days.lock().unwrap();
            serde_json::to_string_pretty(&*days)?
        };
        std::fs::write(path, json)?;

        debug!(path = %path.display(), "Usage store saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn minutes_accumulate() {
        let store = JsonFileStore::ephemeral();
        let id = PlayerId::random();
        let today = day(2026, 8, 23);

        assert_eq!(store.minutes(today, &id), 0);

        store.add_minutes(today, &id, 5);
        store.add_minutes(today, &id, 3);
        assert_eq!(store.minutes(today, &id), 8);
    }

    #[test]
    fn add_clamps_below_zero() {
        let store = JsonFileStore::ephemeral();
        let id = PlayerId::random();
        let today = day(2026, 8, 23);

        store.add_minutes(today, &id, 10);
        store.add_minutes(today, &id, -25);
        assert_eq!(store.minutes(today, &id), 0);
    }

    #[test]
    fn set_clamps_at_zero() {
        let store = JsonFileStore::ephemeral();
        let id = PlayerId::random();
        let today = day(2026, 8, 23);

        store.set_minutes(today, &id, -30);
        assert_eq!(store.minutes(today, &id), 0);

        store.set_minutes(today, &id, 45);
        assert_eq!(store.minutes(today, &id), 45);
    }

    #[test]
    fn warned_flags_per_day_and_threshold() {
        let store = JsonFileStore::ephemeral();
        let id = PlayerId::random();
        let today = day(2026, 8, 23);
        let tomorrow = day(2026, 8, 24);

        assert!(!store.is_warned(today, &id, 30));
        store.mark_warned(today, &id, 30);
        store.mark_warned(today, &id, 30);
        assert!(store.is_warned(today, &id, 30));
        assert!(!store.is_warned(today, &id, 10));
        assert!(!store.is_warned(tomorrow, &id, 30));
    }

    #[test]
    fn reset_day_scoped_to_one_date() {
        let store = JsonFileStore::ephemeral();
        let id = PlayerId::random();
        let yesterday = day(2026, 8, 22);
        let today = day(2026, 8, 23);

        store.add_minutes(yesterday, &id, 120);
        store.add_minutes(today, &id, 30);
        store.mark_warned(today, &id, 10);

        store.reset_day(today);

        assert_eq!(store.minutes(today, &id), 0);
        assert!(!store.is_warned(today, &id, 10));
        assert_eq!(store.minutes(yesterday, &id), 120);
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players.json");
        let id = PlayerId::random();
        let today = day(2026, 8, 23);

        {
            let store = JsonFileStore::open(&path);
            store.add_minutes(today, &id, 42);
            store.mark_warned(today, &id, 30);
            store.save().unwrap();
        }

        let store = JsonFileStore::open(&path);
        assert_eq!(store.minutes(today, &id), 42);
        assert!(store.is_warned(today, &id, 30));
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::open(&path);
        assert_eq!(store.minutes(day(2026, 8, 23), &PlayerId::random()), 0);
    }

    #[test]
    fn ephemeral_save_is_noop() {
        let store = JsonFileStore::ephemeral();
        store.save().unwrap();
    }
}
