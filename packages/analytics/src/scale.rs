//! Min-max scaling and grouped means for the radar comparison.

use std::collections::BTreeMap;

use city_monitor_analytics_models::{
    GroupKey, GroupProfile, IndicatorColumn, IndicatorRow, IndicatorTable, RadarOutput,
};
use city_monitor_source_models::{DayPeriod, WeekdayCode};

/// Scales `value` into `[0, 1]` given the column bounds. A zero-width
/// range maps every value to `0.0`.
#[must_use]
pub fn min_max(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range > 0.0 {
        ((value - min) / range).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Min-max scales a column, keeping missing values missing.
#[must_use]
pub fn scale_column(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let Some((min, max)) = bounds(values.iter().flatten().copied()) else {
        return values.to_vec();
    };
    values
        .iter()
        .map(|v| v.map(|v| min_max(v, min, max)))
        .collect()
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((min, max)) => Some((f64::min(min, v), f64::max(max, v))),
    })
}

/// Sort rank and label of a row's group.
fn group_of(row: &IndicatorRow, key: GroupKey) -> (usize, String) {
    match key {
        GroupKey::Neighborhood => (0, row.neighborhood.clone()),
        GroupKey::Period => (
            DayPeriod::ALL
                .iter()
                .position(|p| *p == row.time.period)
                .unwrap_or_default(),
            row.time.period.to_string(),
        ),
        GroupKey::Weekday => (
            WeekdayCode::ALL
                .iter()
                .position(|w| *w == row.time.weekday)
                .unwrap_or_default(),
            row.time.weekday.to_string(),
        ),
    }
}

#[derive(Default)]
struct GroupAccumulator {
    rows: usize,
    raw: Vec<(f64, usize)>,
    scaled: Vec<(f64, usize)>,
}

impl GroupAccumulator {
    fn with_columns(columns: usize) -> Self {
        Self {
            rows: 0,
            raw: vec![(0.0, 0); columns],
            scaled: vec![(0.0, 0); columns],
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean((sum, count): (f64, usize)) -> Option<f64> {
    (count > 0).then(|| sum / count as f64)
}

/// Scales the selected columns over every row of the table, then averages
/// scaled and raw values per group.
///
/// Bounds come from the whole table, not from each group. Both outputs
/// are produced by the same pass so they describe the same rows. Groups
/// are ordered by name for neighborhoods and in calendar order for
/// periods and weekdays.
#[must_use]
pub fn scale_for_radar(
    table: &IndicatorTable,
    columns: &[IndicatorColumn],
    group_key: GroupKey,
) -> RadarOutput {
    let column_bounds: Vec<Option<(f64, f64)>> = columns
        .iter()
        .map(|column| bounds(table.values(*column)))
        .collect();

    let mut groups: BTreeMap<(usize, String), GroupAccumulator> = BTreeMap::new();
    for row in &table.rows {
        let group = groups
            .entry(group_of(row, group_key))
            .or_insert_with(|| GroupAccumulator::with_columns(columns.len()));
        group.rows += 1;

        for (i, column) in columns.iter().enumerate() {
            let Some(value) = row.value(*column) else {
                continue;
            };
            group.raw[i].0 += value;
            group.raw[i].1 += 1;
            if let Some((min, max)) = column_bounds[i] {
                group.scaled[i].0 += min_max(value, min, max);
                group.scaled[i].1 += 1;
            }
        }
    }

    let mut scaled = Vec::with_capacity(groups.len());
    let mut raw = Vec::with_capacity(groups.len());
    for ((_, label), group) in groups {
        let profile = |sums: &[(f64, usize)]| GroupProfile {
            group: label.clone(),
            rows: group.rows,
            values: columns
                .iter()
                .zip(sums)
                .map(|(column, sum)| (*column, mean(*sum)))
                .collect(),
        };
        scaled.push(profile(&group.scaled));
        raw.push(profile(&group.raw));
    }

    RadarOutput {
        group_key,
        columns: columns.to_vec(),
        scaled,
        raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use city_monitor_source_models::{Channel, EnvironmentalChannels};

    use crate::filter::tests::{at, fields};

    const TEMPERATURE: IndicatorColumn = IndicatorColumn::Channel(Channel::Temperature);
    const HUMIDITY: IndicatorColumn = IndicatorColumn::Channel(Channel::Humidity);

    fn row(neighborhood: &str, hour: u32, temperature: Option<f64>, humidity: f64) -> IndicatorRow {
        let timestamp = at(4, hour);
        IndicatorRow {
            id: String::new(),
            neighborhood: neighborhood.to_string(),
            timestamp,
            time: fields(&timestamp),
            channels: EnvironmentalChannels {
                temperature,
                humidity: Some(humidity),
                ..EnvironmentalChannels::default()
            },
            crime_count: None,
            responses: None,
            survey: BTreeMap::new(),
            census: BTreeMap::new(),
        }
    }

    #[test]
    fn endpoints_map_to_zero_and_one() {
        let scaled = scale_column(&[Some(3.0), Some(7.0), None, Some(5.0)]);
        assert_eq!(scaled, vec![Some(0.0), Some(1.0), None, Some(0.5)]);
    }

    #[test]
    fn scaling_is_monotonic() {
        let values: Vec<Option<f64>> = [4.0, -2.0, 9.5, 0.0, 9.5, 3.25]
            .into_iter()
            .map(Some)
            .collect();
        let scaled = scale_column(&values);
        for (a, sa) in values.iter().zip(&scaled) {
            for (b, sb) in values.iter().zip(&scaled) {
                if a <= b {
                    assert!(sa <= sb);
                }
            }
        }
    }

    #[test]
    fn zero_variance_scales_to_zero() {
        let scaled = scale_column(&[Some(4.0), Some(4.0), None]);
        assert_eq!(scaled, vec![Some(0.0), Some(0.0), None]);
    }

    #[test]
    fn bounds_span_all_groups() {
        let table = IndicatorTable {
            rows: vec![
                row("A", 9, Some(10.0), 50.0),
                row("A", 10, Some(30.0), 50.0),
                row("B", 11, Some(20.0), 50.0),
            ],
        };
        let radar = scale_for_radar(&table, &[TEMPERATURE, HUMIDITY], GroupKey::Neighborhood);

        let a = radar.scaled_group("A").unwrap();
        assert_eq!(a.value(TEMPERATURE), Some(0.5));
        assert_eq!(a.rows, 2);
        // B alone would scale to 0; against the table range it is 0.5.
        assert_eq!(radar.scaled_group("B").unwrap().value(TEMPERATURE), Some(0.5));
        assert_eq!(radar.raw_group("A").unwrap().value(TEMPERATURE), Some(20.0));
        assert_eq!(a.value(HUMIDITY), Some(0.0));
    }

    #[test]
    fn groups_without_values_stay_missing() {
        let table = IndicatorTable {
            rows: vec![row("A", 9, Some(10.0), 1.0), row("B", 9, None, 2.0)],
        };
        let radar = scale_for_radar(&table, &[TEMPERATURE], GroupKey::Neighborhood);
        assert_eq!(radar.raw_group("B").unwrap().value(TEMPERATURE), None);
        assert_eq!(radar.scaled_group("B").unwrap().value(TEMPERATURE), None);
    }

    #[test]
    fn period_groups_in_day_order() {
        let table = IndicatorTable {
            rows: vec![
                row("A", 20, Some(1.0), 1.0),
                row("A", 13, Some(2.0), 1.0),
                row("A", 8, Some(3.0), 1.0),
            ],
        };
        let radar = scale_for_radar(&table, &[TEMPERATURE], GroupKey::Period);
        let labels: Vec<&str> = radar.raw.iter().map(|p| p.group.as_str()).collect();
        assert_eq!(labels, ["Morning", "Afternoon", "Night"]);
    }
}
