//! Record normalization: calendar decomposition and coordinate cleanup.

use chrono::{Datelike, NaiveDateTime, Timelike};
use city_monitor_source_models::{DayPeriod, SensorReading, TimeFields, WeekdayCode};

/// Splits a timestamp into the calendar fields used for filtering.
#[must_use]
pub fn decompose_timestamp(ts: &NaiveDateTime) -> TimeFields {
    TimeFields {
        period: DayPeriod::from_hour(ts.hour()),
        hour: ts.hour(),
        minute: ts.minute(),
        day: ts.day(),
        month: ts.month(),
        year: ts.year(),
        weekday: WeekdayCode::from(ts.weekday()),
    }
}

/// Whether a record's municipality rules it out of a municipality filter.
///
/// Only a known municipality that differs from the wanted one excludes a
/// record; a blank municipality cell is kept. Both names must already be
/// normalized.
#[must_use]
pub fn outside_municipality(wanted: Option<&str>, actual: Option<&str>) -> bool {
    matches!((wanted, actual), (Some(wanted), Some(actual)) if wanted != actual)
}

/// Drops readings whose latitude or longitude is exactly zero, the
/// gateways' placeholder for "no fix". Returns the kept readings and the
/// number dropped.
///
/// Running it again on its own output drops nothing.
#[must_use]
pub fn drop_zero_coordinates(readings: Vec<SensorReading>) -> (Vec<SensorReading>, usize) {
    let before = readings.len();
    let kept: Vec<SensorReading> = readings
        .into_iter()
        .filter(|r| r.latitude != 0.0 && r.longitude != 0.0)
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}
