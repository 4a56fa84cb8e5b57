//! Service-day time handling.
//!
//! Timetable times are integer seconds since the service day's midnight and
//! may exceed 86 400 for after-midnight departures that still belong to the
//! previous day's schedule (GTFS semantics, e.g. "25:10:00"). This module
//! converts between those offsets and absolute timestamps.

use chrono::{NaiveDateTime, TimeDelta, Timelike};

/// Seconds in a day.
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Seconds since midnight for a wall-clock timestamp.
///
/// The timestamp is treated as local service time; the result is always
/// below [`SECONDS_PER_DAY`].
pub fn seconds_since_midnight(dt: NaiveDateTime) -> u32 {
    dt.time().num_seconds_from_midnight()
}

/// Convert a service-day offset into an absolute timestamp.
///
/// The service day is the calendar day of `service_day`; offsets of 86 400
/// and above roll into the following day.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use transit_server::domain::service_datetime;
///
/// let day = NaiveDate::from_ymd_opt(2026, 1, 2)
///     .unwrap()
///     .and_hms_opt(8, 30, 0)
///     .unwrap();
///
/// // 25:10:00 is 01:10:00 on the next calendar day.
/// let t = service_datetime(day, 25 * 3600 + 10 * 60);
/// assert_eq!(t.to_string(), "2026-01-03 01:10:00");
/// ```
pub fn service_datetime(service_day: NaiveDateTime, seconds: u32) -> NaiveDateTime {
    let midnight = service_day.date().and_hms_opt(0, 0, 0).unwrap_or(service_day);
    midnight + TimeDelta::seconds(i64::from(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn seconds_since_midnight_basic() {
        assert_eq!(seconds_since_midnight(day(0, 0, 0)), 0);
        assert_eq!(seconds_since_midnight(day(8, 30, 15)), 8 * 3600 + 30 * 60 + 15);
        assert_eq!(seconds_since_midnight(day(23, 59, 59)), SECONDS_PER_DAY - 1);
    }

    #[test]
    fn service_datetime_same_day() {
        let t = service_datetime(day(8, 30, 0), 9 * 3600);
        assert_eq!(t, day(9, 0, 0));
    }

    #[test]
    fn service_datetime_ignores_base_time_of_day() {
        // Anchoring is to the day's midnight, not to the base timestamp.
        let t = service_datetime(day(23, 45, 0), 60);
        assert_eq!(t, day(0, 1, 0));
    }

    #[test]
    fn service_datetime_rolls_past_midnight() {
        // 25:10:00 service time is 01:10:00 on the next calendar day.
        let t = service_datetime(day(8, 0, 0), 25 * 3600 + 10 * 60);

        let next_day = NaiveDate::from_ymd_opt(2026, 1, 3)
            .unwrap()
            .and_hms_opt(1, 10, 0)
            .unwrap();
        assert_eq!(t, next_day);
    }

    #[test]
    fn service_datetime_90600_seconds() {
        // 90 600 s = 25:10:00 = 01:10:00 next day.
        let t = service_datetime(day(12, 0, 0), 90_600);
        assert_eq!(t.to_string(), "2026-01-03 01:10:00");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    prop_compose! {
        fn valid_datetime()(
            year in 2000i32..2100,
            month in 1u32..=12,
            day in 1u32..=28,
            hour in 0u32..24,
            minute in 0u32..60,
            second in 0u32..60,
        ) -> NaiveDateTime {
            NaiveDate::from_ymd_opt(year, month, day)
                .unwrap()
                .and_hms_opt(hour, minute, second)
                .unwrap()
        }
    }

    proptest! {
        /// Round trip: the offset of a timestamp anchors back to itself.
        #[test]
        fn roundtrip(dt in valid_datetime()) {
            let s = seconds_since_midnight(dt);
            prop_assert_eq!(service_datetime(dt, s), dt);
        }

        /// Anchored timestamps are monotone in the offset.
        #[test]
        fn monotone_in_offset(dt in valid_datetime(), a in 0u32..200_000, b in 0u32..200_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(service_datetime(dt, lo) <= service_datetime(dt, hi));
        }

        /// Offsets of a day or more land on a later calendar day.
        #[test]
        fn large_offsets_roll_over(dt in valid_datetime(), extra in 0u32..86_400) {
            let t = service_datetime(dt, SECONDS_PER_DAY + extra);
            prop_assert!(t.date() > dt.date());
        }
    }
}
