#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard computations over prepared datasets.
//!
//! Every function here is stateless: a filter selection goes in, a fresh
//! [`IndicatorTable`] and its derived gauges, radar series, and
//! choropleth layers come out. Nothing is cached between selections.

pub mod aggregate;
pub mod choropleth;
pub mod filter;
pub mod options;
pub mod scale;
pub mod stats;

use city_monitor_analytics_models::{
    DashboardSnapshot, FilterSpec, GroupKey, IndicatorColumn, IndicatorTable,
};
use city_monitor_source_models::{
    IncidentRow, RateAggregation, ReadingRow, SectorContribution, SurveyRow,
};
use thiserror::Error;

pub use aggregate::aggregate;
pub use choropleth::{ChoroplethLayer, ChoroplethMap, DEFAULT_BINS, choropleth_layers};
pub use options::filter_options;
pub use scale::scale_for_radar;
pub use stats::{channel_stats, gauges};

/// Errors that can occur while deriving dashboard outputs.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Choropleth layers need one radar group per neighborhood.
    #[error("Choropleth layers need a radar grouped by neighborhood, got {0}")]
    NotGroupedByNeighborhood(GroupKey),

    /// A choropleth needs at least one bin.
    #[error("Choropleth bin count must be at least 1")]
    NoBins,
}

/// Borrowed view of the prepared datasets.
#[derive(Debug, Clone, Copy)]
pub struct DatasetView<'a> {
    pub readings: &'a [ReadingRow],
    pub incidents: &'a [IncidentRow],
    pub survey: &'a [SurveyRow],
    pub census: &'a [SectorContribution],
    pub rates: RateAggregation,
}

impl DatasetView<'_> {
    /// Wide indicator table for one filter selection.
    #[must_use]
    pub fn table(&self, filter: &FilterSpec) -> IndicatorTable {
        aggregate(
            self.readings,
            self.incidents,
            self.survey,
            self.census,
            filter,
            self.rates,
        )
    }
}

/// Recomputes everything a dashboard shows for one filter selection.
///
/// The radar is only produced with an active neighborhood filter, at
/// least one column, and at least one row.
#[must_use]
pub fn snapshot(
    view: &DatasetView<'_>,
    filter: &FilterSpec,
    columns: &[IndicatorColumn],
    group_key: GroupKey,
) -> DashboardSnapshot {
    let table = view.table(filter);
    let gauges = gauges(&table, filter);

    let radar = (filter.has_neighborhoods() && !columns.is_empty() && !table.is_empty())
        .then(|| scale_for_radar(&table, columns, group_key));

    log::info!(
        "Snapshot: {} rows, radar over {} groups",
        table.len(),
        radar.as_ref().map_or(0, |r| r.raw.len())
    );

    DashboardSnapshot {
        filter: filter.clone(),
        gauges,
        table,
        radar,
    }
}
