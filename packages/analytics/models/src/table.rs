//! The wide indicator table.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use city_monitor_source_models::{CensusVariable, EnvironmentalChannels, SurveyItem, TimeFields};
use serde::{Deserialize, Serialize};

use crate::indicator::IndicatorColumn;

/// One filtered sensor reading with its neighborhood's aggregates
/// left-joined on.
///
/// Aggregates missing for the neighborhood are `None` (or absent from the
/// maps), never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorRow {
    pub id: String,
    pub neighborhood: String,
    pub timestamp: NaiveDateTime,
    pub time: TimeFields,
    pub channels: EnvironmentalChannels,
    /// Incidents in the neighborhood after filtering.
    pub crime_count: Option<u64>,
    /// Survey responses in the neighborhood.
    pub responses: Option<f64>,
    pub survey: BTreeMap<SurveyItem, f64>,
    pub census: BTreeMap<CensusVariable, f64>,
}

impl IndicatorRow {
    /// Value of any indicator column.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value(&self, column: IndicatorColumn) -> Option<f64> {
        match column {
            IndicatorColumn::Channel(channel) => self.channels.get(channel),
            IndicatorColumn::CrimeCount => self.crime_count.map(|n| n as f64),
            IndicatorColumn::Responses => self.responses,
            IndicatorColumn::Survey(item) => self.survey.get(&item).copied(),
            IndicatorColumn::Census(variable) => self.census.get(&variable).copied(),
        }
    }
}

/// The aggregator's output for one filter selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorTable {
    pub rows: Vec<IndicatorRow>,
}

impl IndicatorTable {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Present values of one column, missing values skipped.
    pub fn values(&self, column: IndicatorColumn) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().filter_map(move |row| row.value(column))
    }
}
