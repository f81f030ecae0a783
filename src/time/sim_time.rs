//! `chrono`-backed time helpers.

use chrono::{DateTime, Datelike, TimeDelta, TimeZone, Timelike, Utc};

/// An absolute simulation timestamp.
pub type SimTime = DateTime<Utc>;

/// Builds a timestamp from year, month, day and hour (UT).
///
/// Returns `None` for calendar values that do not exist.
pub fn from_ymdh(year: i32, month: u32, day: u32, hour: u32) -> Option<SimTime> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).single()
}

/// Builds a timestamp `seconds` after the Unix epoch.
pub fn from_epoch_seconds(seconds: f64) -> SimTime {
    add_seconds(DateTime::<Utc>::UNIX_EPOCH, seconds)
}

/// Offsets `t` by a (possibly fractional, possibly negative) number of seconds.
///
/// Offsets beyond the representable range saturate to the earliest or latest
/// representable instant. Run configuration uses this to express windows that
/// never open (e.g. a spot starting `1e31` seconds after the run start).
pub fn add_seconds(t: SimTime, seconds: f64) -> SimTime {
    let millis = (seconds * 1000.0).round() as i64;
    TimeDelta::try_milliseconds(millis)
        .and_then(|delta| t.checked_add_signed(delta))
        .unwrap_or(if seconds > 0.0 {
            DateTime::<Utc>::MAX_UTC
        } else {
            DateTime::<Utc>::MIN_UTC
        })
}

/// Signed number of seconds from `from` to `to`.
pub fn seconds_between(from: SimTime, to: SimTime) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

/// Splits a timestamp into `[year, month, day, hour, minute, second]`.
pub fn time_fields(t: SimTime) -> [i32; 6] {
    [
        t.year(),
        t.month() as i32,
        t.day() as i32,
        t.hour() as i32,
        t.minute() as i32,
        t.second() as i32,
    ]
}

/// Formats a timestamp the way run logs print it.
pub fn format_time(t: SimTime) -> String {
    t.format("%Y/%m/%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_measure_seconds() {
        let t0 = from_ymdh(2001, 3, 31, 0).unwrap();
        let t1 = add_seconds(t0, 900.0);
        assert_eq!(seconds_between(t0, t1), 900.0);
        assert_eq!(seconds_between(t1, t0), -900.0);
    }

    #[test]
    fn test_add_seconds_saturates() {
        let t0 = from_ymdh(2001, 3, 31, 0).unwrap();
        assert_eq!(add_seconds(t0, 1e31), DateTime::<Utc>::MAX_UTC);
        assert_eq!(add_seconds(t0, -1e31), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_time_fields() {
        let t = add_seconds(from_ymdh(1999, 12, 31, 23).unwrap(), 61.0);
        assert_eq!(time_fields(t), [1999, 12, 31, 23, 1, 1]);
        assert_eq!(format_time(t), "1999/12/31 23:01:01");
    }

    #[test]
    fn test_invalid_calendar_date() {
        assert!(from_ymdh(2001, 2, 30, 0).is_none());
    }

    #[test]
    fn test_epoch_seconds() {
        assert_eq!(seconds_between(DateTime::<Utc>::UNIX_EPOCH, from_epoch_seconds(3600.0)), 3600.0);
    }
}
