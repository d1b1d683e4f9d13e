//! Store trait definitions

use chrono::NaiveDate;
use playtime_util::PlayerId;

use crate::StoreResult;

/// Daily usage store consumed by the core.
///
/// The caller supplies the calendar day explicitly (computed from the
/// configured timezone); the store itself is timezone-free. Counter
/// mutations act on memory and cannot fail; only `save` touches disk.
pub trait UsageStore: Send + Sync {
    /// Minutes used by a player on the given day
    fn minutes(&self, day: NaiveDate, player: &PlayerId) -> u32;

    /// Add minutes to a player's counter, clamped so the stored value
    /// never drops below zero
    fn add_minutes(&self, day: NaiveDate, player: &PlayerId, delta: i64);

    /// Administrative override of a player's counter, clamped at zero
    fn set_minutes(&self, day: NaiveDate, player: &PlayerId, minutes: i64);

    /// Whether a warning threshold was already issued for a player that day
    fn is_warned(&self, day: NaiveDate, player: &PlayerId, threshold: i64) -> bool;

    /// Record a warning threshold as issued for a player that day
    fn mark_warned(&self, day: NaiveDate, player: &PlayerId, threshold: i64);

    /// Irreversibly discard all records for the given day only
    fn reset_day(&self, day: NaiveDate);

    /// Persist the current state
    fn save(&self) -> StoreResult<()>;
}
