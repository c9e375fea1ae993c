//! Service-day time handling.
//!
//! All times in a path are integer seconds since midnight of the service
//! day. Trips running past midnight simply carry values above 24 hours,
//! so plain integer arithmetic stays valid across the day boundary. This
//! module parses and formats those values for tests and debug output.

use chrono::{Duration, NaiveTime, Timelike};

/// Sentinel for a time that has not been computed yet.
pub const TIME_NOT_SET: i32 = -999_999_999;

const SECONDS_PER_DAY: i32 = 24 * 60 * 60;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse `HH:MM` or `HH:MM:SS` into seconds since midnight.
///
/// Hours may exceed 23 for trips that run past midnight of the service day.
///
/// # Examples
///
/// ```
/// use raptor_path::domain::parse_time;
///
/// assert_eq!(parse_time("10:04"), Ok(36_240));
/// assert_eq!(parse_time("10:03:15"), Ok(36_195));
/// assert_eq!(parse_time("25:00"), Ok(90_000));
///
/// assert!(parse_time("1004").is_err());
/// assert!(parse_time("10:60").is_err());
/// ```
pub fn parse_time(s: &str) -> Result<i32, TimeError> {
    let bytes = s.as_bytes();
    if bytes.len() != 5 && bytes.len() != 8 {
        return Err(TimeError::new("expected HH:MM or HH:MM:SS format"));
    }
    if bytes[2] != b':' || (bytes.len() == 8 && bytes[5] != b':') {
        return Err(TimeError::new("expected colon separators"));
    }

    let hour =
        parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
    let minute =
        parse_two_digits(&bytes[3..5]).ok_or_else(|| TimeError::new("invalid minute digits"))?;
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }

    let second = if bytes.len() == 8 {
        let second = parse_two_digits(&bytes[6..8])
            .ok_or_else(|| TimeError::new("invalid second digits"))?;
        if second > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }
        second
    } else {
        0
    };

    Ok(hour * 3600 + minute * 60 + second)
}

/// Format seconds since midnight as `HH:MM`, or `HH:MM:SS` when the
/// seconds are non-zero. Times outside the service day get a day offset.
///
/// # Examples
///
/// ```
/// use raptor_path::domain::{TIME_NOT_SET, format_time};
///
/// assert_eq!(format_time(36_240), "10:04");
/// assert_eq!(format_time(36_195), "10:03:15");
/// assert_eq!(format_time(90_000), "01:00+1d");
/// assert_eq!(format_time(-60), "23:59-1d");
/// assert_eq!(format_time(TIME_NOT_SET), "-");
/// ```
pub fn format_time(time: i32) -> String {
    if time == TIME_NOT_SET {
        return "-".to_string();
    }
    let days = time.div_euclid(SECONDS_PER_DAY);
    let secs = time.rem_euclid(SECONDS_PER_DAY) as u32;

    // rem_euclid keeps secs within one day
    let Some(clock) = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0) else {
        return format!("{time}s");
    };
    let mut text = if clock.second() == 0 {
        clock.format("%H:%M").to_string()
    } else {
        clock.format("%H:%M:%S").to_string()
    };
    match days {
        0 => {}
        d if d > 0 => text.push_str(&format!("+{d}d")),
        d => text.push_str(&format!("{d}d")),
    }
    text
}

/// Format a duration in seconds as a compact `1h2m3s` string.
///
/// # Examples
///
/// ```
/// use raptor_path::domain::format_duration;
///
/// assert_eq!(format_duration(7185), "1h59m45s");
/// assert_eq!(format_duration(180), "3m");
/// assert_eq!(format_duration(45), "45s");
/// assert_eq!(format_duration(0), "0s");
/// assert_eq!(format_duration(-90), "-1m30s");
/// ```
pub fn format_duration(seconds: i32) -> String {
    if seconds == 0 {
        return "0s".to_string();
    }
    let duration = Duration::seconds(i64::from(seconds).abs());
    let hours = duration.num_hours();
    let minutes = duration.num_minutes() % 60;
    let secs = duration.num_seconds() % 60;

    let mut text = String::new();
    if seconds < 0 {
        text.push('-');
    }
    if hours > 0 {
        text.push_str(&format!("{hours}h"));
    }
    if minutes > 0 {
        text.push_str(&format!("{minutes}m"));
    }
    if secs > 0 {
        text.push_str(&format!("{secs}s"));
    }
    text
}

/// Parse two ASCII digit bytes into an i32.
fn parse_two_digits(bytes: &[u8]) -> Option<i32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some((d1 * 10 + d2) as i32)
}
