//! Cell parsers shared by every loader.
//!
//! Exports arrive from spreadsheets and sensor gateways with mixed
//! conventions: day-first dates, spreadsheet date serials, comma decimals,
//! and time columns stored as day fractions.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Date-time layouts tried in order after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
];

/// Date-only layouts, read as midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Smallest bare number read as a date serial (1927-05-18). Smaller
/// numbers, such as a lone year, are rejected as timestamps.
const MIN_TIMESTAMP_SERIAL: f64 = 10_000.0;

/// Day zero of spreadsheet date serials.
fn spreadsheet_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap_or_default()
        .and_time(NaiveTime::MIN)
}

/// Parses a timestamp cell.
///
/// Accepts RFC 3339 (the offset is dropped, keeping local wall time), ISO
/// and day-first layouts with or without seconds, bare dates, and
/// spreadsheet date serials from 1927 on. Ambiguous dates such as
/// `03/04/2024` are read day-first.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }

    parse_number(s)
        .filter(|serial| *serial >= MIN_TIMESTAMP_SERIAL)
        .and_then(from_spreadsheet_serial)
}

/// Converts a spreadsheet date serial (days since 1899-12-30, fraction =
/// time of day) to a timestamp, rounded to the second.
///
/// Returns `None` for non-finite or non-positive serials.
#[must_use]
pub fn from_spreadsheet_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial <= 0.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let seconds = (serial * SECONDS_PER_DAY).round() as i64;
    spreadsheet_epoch().checked_add_signed(Duration::try_seconds(seconds)?)
}

/// Parses a time-of-day cell: `HH:MM[:SS[.f]]`, or a day fraction in
/// `[0, 1)` as spreadsheets store time-only cells.
#[must_use]
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for format in ["%H:%M:%S%.f", "%H:%M"] {
        if let Ok(time) = NaiveTime::parse_from_str(s, format) {
            return Some(time);
        }
    }

    let fraction = parse_number(s)?;
    if !(0.0..1.0).contains(&fraction) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let seconds = (fraction * SECONDS_PER_DAY).round() as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds.min(86_399), 0)
}

/// Parses a numeric cell.
///
/// A lone comma is read as the decimal separator (`"21,5"`). With both
/// separators present, the last one is the decimal separator
/// (`"1.234,5"`, `"1,234.5"`). Blank cells and the `nan` placeholder are
/// `None`, as are non-finite results.
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return None;
    }

    let normalized = match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(_), None) => s.replace(',', "."),
        _ => s.to_string(),
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a yes/no cell in Portuguese or English.
#[must_use]
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_uppercase().as_str() {
        "SIM" | "S" | "YES" | "Y" | "TRUE" | "1" => Some(true),
        "NAO" | "NÃO" | "N" | "NO" | "FALSE" | "0" => Some(false),
        _ => None,
    }
}

/// Returns a trimmed, non-empty cell value.
#[must_use]
pub fn non_empty(raw: &str) -> Option<&str> {
    let s = raw.trim();
    (!s.is_empty()).then_some(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn parses_iso_layouts() {
        assert_eq!(
            parse_timestamp("2024-03-15 14:30:00"),
            Some(ts(2024, 3, 15, 14, 30, 0))
        );
        assert_eq!(
            parse_timestamp("2024-03-15T14:30:00.250"),
            Some(ts(2024, 3, 15, 14, 30, 0) + Duration::milliseconds(250))
        );
        assert_eq!(
            parse_timestamp("2024-03-15 14:30"),
            Some(ts(2024, 3, 15, 14, 30, 0))
        );
    }

    #[test]
    fn parses_rfc3339_keeping_wall_time() {
        assert_eq!(
            parse_timestamp("2024-03-15T14:30:00-03:00"),
            Some(ts(2024, 3, 15, 14, 30, 0))
        );
    }

    #[test]
    fn reads_slashed_dates_day_first() {
        assert_eq!(
            parse_timestamp("03/04/2024 08:15"),
            Some(ts(2024, 4, 3, 8, 15, 0))
        );
        assert_eq!(parse_timestamp("25/12/2023"), Some(ts(2023, 12, 25, 0, 0, 0)));
    }

    #[test]
    fn converts_spreadsheet_serials() {
        assert_eq!(from_spreadsheet_serial(1.0), Some(ts(1899, 12, 31, 0, 0, 0)));
        assert_eq!(from_spreadsheet_serial(45_292.0), Some(ts(2024, 1, 1, 0, 0, 0)));
        assert_eq!(
            from_spreadsheet_serial(45_292.5),
            Some(ts(2024, 1, 1, 12, 0, 0))
        );
        assert_eq!(parse_timestamp("45292"), Some(ts(2024, 1, 1, 0, 0, 0)));
        assert_eq!(from_spreadsheet_serial(-3.0), None);
        assert_eq!(from_spreadsheet_serial(f64::NAN), None);
    }

    #[test]
    fn rejects_garbage_timestamps() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("ontem"), None);
        assert_eq!(parse_timestamp("2024-13-45"), None);
    }

    #[test]
    fn bare_years_are_not_serials() {
        assert_eq!(parse_timestamp("2024"), None);
        assert_eq!(parse_timestamp("1999,5"), None);
        assert_eq!(parse_timestamp("45366,25"), Some(ts(2024, 3, 15, 6, 0, 0)));
    }

    #[test]
    fn parses_times_of_day() {
        assert_eq!(
            parse_time_of_day("14:05:09"),
            NaiveTime::from_hms_opt(14, 5, 9)
        );
        assert_eq!(parse_time_of_day("07:30"), NaiveTime::from_hms_opt(7, 30, 0));
        assert_eq!(parse_time_of_day("0.5"), NaiveTime::from_hms_opt(12, 0, 0));
        assert_eq!(parse_time_of_day("0,75"), NaiveTime::from_hms_opt(18, 0, 0));
        assert_eq!(parse_time_of_day("1.5"), None);
        assert_eq!(parse_time_of_day(""), None);
    }

    #[test]
    fn parses_decimal_conventions() {
        assert_eq!(parse_number("21,5"), Some(21.5));
        assert_eq!(parse_number("21.5"), Some(21.5));
        assert_eq!(parse_number("1.234,5"), Some(1234.5));
        assert_eq!(parse_number("1,234.5"), Some(1234.5));
        assert_eq!(parse_number(" -7 "), Some(-7.0));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn parses_flags() {
        assert_eq!(parse_flag("Sim"), Some(true));
        assert_eq!(parse_flag("NÃO"), Some(false));
        assert_eq!(parse_flag("nao"), Some(false));
        assert_eq!(parse_flag("talvez"), None);
    }
}
