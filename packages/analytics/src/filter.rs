//! Row selection.
//!
//! Categorical filters (neighborhood, period, weekday) apply to readings
//! and incidents alike. The calendar range applies to readings only.

use city_monitor_analytics_models::FilterSpec;
use city_monitor_source_models::{IncidentRow, ReadingRow};

/// Readings passing the categorical filters and the calendar range.
#[must_use]
pub fn filter_readings<'a>(readings: &'a [ReadingRow], filter: &FilterSpec) -> Vec<&'a ReadingRow> {
    readings
        .iter()
        .filter(|r| filter.matches_categories(&r.neighborhood, &r.time))
        .filter(|r| filter.matches_range(&r.time))
        .collect()
}

/// Incidents passing the categorical filters.
#[must_use]
pub fn filter_incidents<'a>(
    incidents: &'a [IncidentRow],
    filter: &FilterSpec,
) -> Vec<&'a IncidentRow> {
    incidents
        .iter()
        .filter(|i| filter.matches_categories(&i.neighborhood, &i.time))
        .collect()
}
