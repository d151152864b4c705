#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Types flowing through the aggregation pipeline.
//!
//! A [`FilterSpec`] selects rows, the aggregator produces an
//! [`IndicatorTable`], and the scaler and statistics stages derive
//! [`ChannelStats`], [`Gauge`]s, and a [`RadarOutput`] from it. Everything
//! serializes as camelCase JSON for presentation layers.

pub mod filter;
pub mod indicator;
pub mod radar;
pub mod stats;
pub mod table;

pub use filter::{FilterSpec, RangeSemantics, TimeBounds, TimeRange};
pub use indicator::{
    ColorRamp, IndicatorColumn, IndicatorDescriptor, UnknownIndicator, catalogue,
};
pub use radar::{GroupKey, GroupProfile, RadarOutput};
pub use stats::{ChannelStats, Gauge, GaugeStatus};
pub use table::{IndicatorRow, IndicatorTable};

use city_monitor_source_models::{DayPeriod, WeekdayCode};
use serde::Serialize;

/// Values a filter UI can offer, derived from the prepared readings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Distinct neighborhoods, sorted.
    pub neighborhoods: Vec<String>,
    /// Distinct periods, in day order.
    pub periods: Vec<DayPeriod>,
    /// Distinct weekday codes, Monday first.
    pub weekdays: Vec<WeekdayCode>,
    /// Per-field minimum and maximum, the default range. `None` without
    /// readings.
    pub range: Option<TimeRange>,
}

/// Everything a dashboard renders for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub filter: FilterSpec,
    /// One gauge per environmental channel.
    pub gauges: Vec<Gauge>,
    pub table: IndicatorTable,
    /// Present only with a neighborhood filter, selected columns, and rows.
    pub radar: Option<RadarOutput>,
}
