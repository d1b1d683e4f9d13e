//! Time utilities for playtimed
//!
//! Accounting runs on UTC instants; the calendar day and the midnight
//! rollover boundary are derived in the configured IANA timezone.

use chrono::{DateTime, Datelike, Days, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::time::Duration;
use tracing::warn;

/// Minimum delay before a scheduled rollover may fire. Guards against
/// zero/negative waits producing fire-and-reschedule storms.
pub const ROLLOVER_MIN_DELAY: Duration = Duration::from_secs(1);

/// Upper bound on the rollover delay. A day is at most 25 hours across a
/// DST fall-back, so anything past 26 hours indicates a clock or timezone
/// computation anomaly.
pub const ROLLOVER_MAX_DELAY: Duration = Duration::from_secs(26 * 60 * 60);

/// Whole minutes elapsed between two instants, floored, clamped at zero if
/// the clock went backwards.
pub fn elapsed_minutes(start: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let secs = (now - start).num_seconds();
    if secs <= 0 {
        return 0;
    }
    (secs / 60) as u32
}

/// The calendar date at `now` as observed in `tz`.
pub fn local_day(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Wall-clock duration from `now` until the next local midnight in `tz`,
/// clamped to [`ROLLOVER_MIN_DELAY`] and capped at [`ROLLOVER_MAX_DELAY`].
pub fn until_next_midnight(now: DateTime<Utc>, tz: Tz) -> Duration {
    let local_now = now.with_timezone(&tz);
    let next_day = local_now
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap_or_else(|| local_now.date_naive());

    let midnight = match tz.from_local_datetime(&next_day.and_time(NaiveTime::MIN)) {
        LocalResult::Single(dt) => dt,
        // Fall-back transition: two local midnights, take the first
        LocalResult::Ambiguous(earliest, _) => earliest,
        // Spring-forward transition skipped midnight itself (Chile moves
        // its clocks at 00:00); the day starts at the first valid
        // wall-clock instant after the gap
        LocalResult::None => first_valid_time_of_day(next_day, tz),
    };

    let millis = (midnight.with_timezone(&Utc) - now).num_milliseconds();
    if millis <= 0 {
        warn!(
            zone = %tz,
            year = local_now.year(),
            "Non-positive wait until next midnight, clamping"
        );
    }

    clamp_rollover_delay(Duration::from_millis(millis.max(0) as u64))
}

/// Apply the rollover delay bounds.
pub fn clamp_rollover_delay(delay: Duration) -> Duration {
    delay.clamp(ROLLOVER_MIN_DELAY, ROLLOVER_MAX_DELAY)
}

/// First valid wall-clock instant of `day` in `tz`, for days whose
/// midnight falls inside a DST gap. Probes forward in 15-minute steps
/// (gaps are 30 or 60 minutes in practice) and falls back to a UTC read
/// if the whole day somehow resolves to nothing.
fn first_valid_time_of_day(day: NaiveDate, tz: Tz) -> DateTime<Tz> {
    let mut probe = day.and_time(NaiveTime::MIN);
    for _ in 0..(24 * 4) {
        probe += chrono::Duration::minutes(15);
        match tz.from_local_datetime(&probe) {
            LocalResult::Single(dt) => return dt,
            LocalResult::Ambiguous(earliest, _) => return earliest,
            LocalResult::None => {}
        }
    }

    warn!(zone = %tz, day = %day, "No valid local time found for day");
    tz.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}

/// Helper to format durations in human-readable form
pub fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Berlin;
    use chrono_tz::Tz;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn elapsed_minutes_floors() {
        let start = utc(2025, 6, 1, 12, 0, 0);
        assert_eq!(elapsed_minutes(start, utc(2025, 6, 1, 12, 0, 59)), 0);
        assert_eq!(elapsed_minutes(start, utc(2025, 6, 1, 12, 1, 0)), 1);
        assert_eq!(elapsed_minutes(start, utc(2025, 6, 1, 13, 31, 30)), 91);
    }

    #[test]
    fn elapsed_minutes_clamps_backwards_clock() {
        let start = utc(2025, 6, 1, 12, 0, 0);
        let earlier = utc(2025, 6, 1, 11, 0, 0);
        assert_eq!(elapsed_minutes(start, earlier), 0);
    }

    #[test]
    fn local_day_respects_zone() {
        // 23:30 UTC on June 1st is already June 2nd in Berlin (UTC+2)
        let now = utc(2025, 6, 1, 23, 30, 0);
        assert_eq!(
            local_day(now, Berlin),
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
        );
        assert_eq!(
            local_day(now, Tz::UTC),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        );
    }

    #[test]
    fn until_next_midnight_simple() {
        // 22:00 Berlin (20:00 UTC in summer) -> 2 hours to midnight
        let now = utc(2025, 6, 1, 20, 0, 0);
        assert_eq!(
            until_next_midnight(now, Berlin),
            Duration::from_secs(2 * 3600)
        );
    }

    #[test]
    fn until_next_midnight_at_midnight_is_full_day() {
        // Exactly midnight Berlin: the next boundary is a day away
        let now = utc(2025, 5, 31, 22, 0, 0); // 2025-06-01 00:00 Berlin
        assert_eq!(
            until_next_midnight(now, Berlin),
            Duration::from_secs(24 * 3600)
        );
    }

    #[test]
    fn until_next_midnight_across_spring_forward() {
        // 2025-03-30 Berlin loses one hour (02:00 -> 03:00); the day the
        // transition happens is only 23 wall-clock hours long
        let now = utc(2025, 3, 29, 23, 0, 0); // 2025-03-30 00:00 Berlin
        assert_eq!(
            until_next_midnight(now, Berlin),
            Duration::from_secs(23 * 3600)
        );
    }

    #[test]
    fn until_next_midnight_when_the_gap_swallows_midnight() {
        use chrono_tz::America::Santiago;
        // Chile springs forward at 00:00, so 2025-09-07 has no local
        // midnight at all; the day starts at 01:00 -03 (04:00 UTC)
        let now = utc(2025, 9, 6, 16, 0, 0); // 12:00 -04 in Santiago
        assert_eq!(
            until_next_midnight(now, Santiago),
            Duration::from_secs(12 * 3600)
        );
    }

    #[test]
    fn until_next_midnight_across_fall_back() {
        // 2025-10-26 Berlin gains one hour; 25 wall-clock hours to midnight
        let now = utc(2025, 10, 25, 22, 0, 0); // 2025-10-26 00:00 Berlin
        assert_eq!(
            until_next_midnight(now, Berlin),
            Duration::from_secs(25 * 3600)
        );
    }

    #[test]
    fn rollover_delay_bounds() {
        assert_eq!(clamp_rollover_delay(Duration::ZERO), ROLLOVER_MIN_DELAY);
        assert_eq!(
            clamp_rollover_delay(Duration::from_secs(500)),
            Duration::from_secs(500)
        );
        assert_eq!(
            clamp_rollover_delay(Duration::from_secs(48 * 3600)),
            ROLLOVER_MAX_DELAY
        );
    }

    #[test]
    fn format_duration_variants() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h 1m 1s");
    }
}
