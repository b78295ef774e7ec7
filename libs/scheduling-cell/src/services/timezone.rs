use std::sync::OnceLock;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use regex::Regex;

use shared_models::SchedulingError;

/// ISO-8601 weekday number for a date: 1 = Monday .. 7 = Sunday.
///
/// This is the canonical weekday representation inside the cell. Every feed
/// that numbers days differently is converted exactly once at the boundary.
pub fn iso_weekday(date: NaiveDate) -> u32 {
    date.weekday().number_from_monday()
}

/// Convert a Sunday-first 0-indexed day (0 = Sunday .. 6 = Saturday) to the
/// ISO 1..=7 convention. Returns `None` for out-of-range input.
pub fn iso_from_sunday_indexed(day: u32) -> Option<u32> {
    match day {
        0 => Some(7),
        1..=6 => Some(day),
        _ => None,
    }
}

/// Parse a time of day as schedule rows carry it, with or without seconds.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, SchedulingError> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| SchedulingError::InvalidTimeOfDay(raw.to_string()))
}

/// Combine a calendar date with a naive time of day into an absolute instant
/// in the clinic timezone.
pub fn local_to_absolute(
    offset: FixedOffset,
    date: NaiveDate,
    time: NaiveTime,
) -> DateTime<FixedOffset> {
    // A fixed offset has no gaps or folds, so every local time maps to
    // exactly one instant.
    offset.from_local_datetime(&date.and_time(time)).unwrap()
}

/// Clinic-local time of day of an absolute instant. Exact inverse of
/// `local_to_absolute` for the same offset.
pub fn absolute_to_local_time(offset: FixedOffset, timestamp: DateTime<FixedOffset>) -> NaiveTime {
    timestamp.with_timezone(&offset).time()
}

/// Whether a timestamp string carries an explicit UTC offset (`Z`, `+08:00`,
/// `-0500`, ...) as opposed to a naive local date-time.
pub fn has_explicit_offset(raw: &str) -> bool {
    static OFFSET_RE: OnceLock<Regex> = OnceLock::new();
    let re = OFFSET_RE.get_or_init(|| {
        Regex::new(r"(?:[Zz]|[+-]\d{2}:?\d{2})$").unwrap()
    });
    re.is_match(raw.trim())
}

/// Parse a timestamp string into a clinic-local instant.
///
/// Strings without an explicit offset are interpreted as clinic-local time;
/// strings with one are converted to clinic-local. The offset is applied in
/// exactly one of the two branches, never both.
pub fn parse_timestamp(
    offset: FixedOffset,
    raw: &str,
) -> Result<DateTime<FixedOffset>, SchedulingError> {
    let trimmed = raw.trim();

    if has_explicit_offset(trimmed) {
        return DateTime::parse_from_rfc3339(trimmed)
            .map(|instant| instant.with_timezone(&offset))
            .map_err(|_| SchedulingError::InvalidTimestamp(raw.to_string()));
    }

    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| SchedulingError::InvalidTimestamp(raw.to_string()))?;

    Ok(local_to_absolute(offset, naive.date(), naive.time()))
}
