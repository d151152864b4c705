//! Filter choices offered by the prepared readings.

use std::collections::BTreeSet;

use city_monitor_analytics_models::{FilterOptions, TimeBounds, TimeRange};
use city_monitor_source_models::{ReadingRow, TimeFields};

fn field_bounds<T: Ord + Copy>(
    readings: &[ReadingRow],
    field: impl Fn(&TimeFields) -> T,
) -> Option<(T, T)> {
    let min = readings.iter().map(|r| field(&r.time)).min()?;
    let max = readings.iter().map(|r| field(&r.time)).max()?;
    Some((min, max))
}

/// Default range: each field's own minimum and maximum.
fn default_range(readings: &[ReadingRow]) -> Option<TimeRange> {
    let (day_min, day_max) = field_bounds(readings, |t| t.day)?;
    let (month_min, month_max) = field_bounds(readings, |t| t.month)?;
    let (year_min, year_max) = field_bounds(readings, |t| t.year)?;
    let (hour_min, hour_max) = field_bounds(readings, |t| t.hour)?;
    let (minute_min, minute_max) = field_bounds(readings, |t| t.minute)?;

    Some(TimeRange {
        from: TimeBounds {
            day: day_min,
            month: month_min,
            year: year_min,
            hour: hour_min,
            minute: minute_min,
        },
        to: TimeBounds {
            day: day_max,
            month: month_max,
            year: year_max,
            hour: hour_max,
            minute: minute_max,
        },
    })
}

/// Distinct neighborhoods, periods, and weekdays, plus the default range.
#[must_use]
pub fn filter_options(readings: &[ReadingRow]) -> FilterOptions {
    let neighborhoods: BTreeSet<&str> = readings.iter().map(|r| r.neighborhood.as_str()).collect();
    let periods: BTreeSet<_> = readings.iter().map(|r| r.time.period).collect();
    let weekdays: BTreeSet<_> = readings.iter().map(|r| r.time.weekday).collect();

    FilterOptions {
        neighborhoods: neighborhoods.into_iter().map(str::to_string).collect(),
        periods: periods.into_iter().collect(),
        weekdays: weekdays.into_iter().collect(),
        range: default_range(readings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use city_monitor_analytics_models::{FilterSpec, RangeSemantics};
    use city_monitor_source_models::{DayPeriod, WeekdayCode};

    use crate::filter::{filter_readings, tests::{at, reading}};

    #[test]
    fn no_readings_no_range() {
        let options = filter_options(&[]);
        assert!(options.neighborhoods.is_empty());
        assert_eq!(options.range, None);
    }

    #[test]
    fn distinct_sorted_values() {
        let readings = [
            reading("Centro", at(5, 20), None),
            reading("Aldeota", at(4, 9), None),
            reading("Centro", at(4, 9), None),
        ];
        let options = filter_options(&readings);
        assert_eq!(options.neighborhoods, ["Aldeota", "Centro"]);
        assert_eq!(options.periods, [DayPeriod::Morning, DayPeriod::Night]);
        assert_eq!(options.weekdays, [WeekdayCode::Seg, WeekdayCode::Ter]);

        let range = options.range.unwrap();
        assert_eq!((range.from.day, range.to.day), (4, 5));
        assert_eq!((range.from.hour, range.to.hour), (9, 20));
    }

    #[test]
    fn default_range_keeps_every_reading() {
        let readings = [
            reading("A", at(4, 23), None),
            reading("A", at(9, 1), None),
            reading("B", at(6, 12), None),
        ];
        let range = filter_options(&readings).range;
        for semantics in [RangeSemantics::PerField, RangeSemantics::Chronological] {
            let filter = FilterSpec {
                range,
                semantics,
                ..FilterSpec::default()
            };
            assert_eq!(filter_readings(&readings, &filter).len(), readings.len());
        }
    }
}
