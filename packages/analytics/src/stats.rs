//! Channel summary statistics over the indicator table.

use city_monitor_analytics_models::{ChannelStats, FilterSpec, Gauge, IndicatorColumn, IndicatorTable};
use city_monitor_source_models::Channel;

/// Min, max, and mean of the present values; `None` when there are none.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(values: impl IntoIterator<Item = f64>) -> Option<ChannelStats> {
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for value in values {
        count += 1;
        sum += value;
        min = min.min(value);
        max = max.max(value);
    }

    (count > 0).then(|| ChannelStats::from_bounds(min, max, sum / count as f64))
}

/// Statistics of one channel.
///
/// Without a neighborhood selection, or with no value present, the fixed
/// placeholders are returned instead of statistics over everything.
#[must_use]
pub fn channel_stats(table: &IndicatorTable, channel: Channel, filter: &FilterSpec) -> ChannelStats {
    if !filter.has_neighborhoods() {
        return ChannelStats::PLACEHOLDER;
    }
    summarize(table.values(IndicatorColumn::Channel(channel))).unwrap_or(ChannelStats::PLACEHOLDER)
}

/// One gauge per environmental channel, in display order.
#[must_use]
pub fn gauges(table: &IndicatorTable, filter: &FilterSpec) -> Vec<Gauge> {
    Channel::ALL
        .into_iter()
        .map(|channel| {
            Gauge::new(
                channel,
                IndicatorColumn::Channel(channel).label(),
                channel_stats(table, channel, filter),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use city_monitor_analytics_models::{GaugeStatus, IndicatorRow};
    use city_monitor_source_models::EnvironmentalChannels;

    use crate::filter::tests::{at, fields};

    fn row(neighborhood: &str, temperature: Option<f64>) -> IndicatorRow {
        let timestamp = at(4, 10);
        IndicatorRow {
            id: String::new(),
            neighborhood: neighborhood.to_string(),
            timestamp,
            time: fields(&timestamp),
            channels: EnvironmentalChannels {
                temperature,
                ..EnvironmentalChannels::default()
            },
            crime_count: None,
            responses: None,
            survey: std::collections::BTreeMap::new(),
            census: std::collections::BTreeMap::new(),
        }
    }

    fn selecting(names: &[&str]) -> FilterSpec {
        FilterSpec {
            neighborhoods: names.iter().map(|n| (*n).to_string()).collect::<BTreeSet<_>>(),
            ..FilterSpec::default()
        }
    }

    #[test]
    fn no_selection_gives_placeholders() {
        let table = IndicatorTable {
            rows: vec![row("A", Some(10.0)), row("A", Some(30.0))],
        };
        let stats = channel_stats(&table, Channel::Temperature, &FilterSpec::default());
        assert_eq!(stats, ChannelStats::PLACEHOLDER);
    }

    #[test]
    fn empty_table_gives_placeholders() {
        let stats = channel_stats(
            &IndicatorTable::default(),
            Channel::Temperature,
            &selecting(&["A"]),
        );
        assert_eq!(stats, ChannelStats::PLACEHOLDER);
        assert!(!stats.mean.is_nan());
    }

    #[test]
    fn missing_values_are_excluded() {
        let table = IndicatorTable {
            rows: vec![row("A", Some(10.0)), row("A", None), row("A", Some(20.0))],
        };
        let stats = channel_stats(&table, Channel::Temperature, &selecting(&["A"]));
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 20.0);
        assert_eq!(stats.mean, 15.0);
    }

    #[test]
    fn gauges_cover_every_channel() {
        let table = IndicatorTable {
            rows: vec![row("A", Some(10.0)), row("A", Some(12.0)), row("A", Some(30.0))],
        };
        let gauges = gauges(&table, &selecting(&["A"]));
        assert_eq!(gauges.len(), 6);
        assert_eq!(gauges[0].label, "Temperatura (°C)");
        // mean 17.33, cutoffs 15 and 25
        assert_eq!(gauges[0].status, GaugeStatus::Attention);
        // humidity has no values
        assert_eq!(gauges[1].stats, ChannelStats::PLACEHOLDER);
    }
}
