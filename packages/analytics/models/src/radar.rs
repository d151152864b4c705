//! Radar comparison output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::indicator::IndicatorColumn;

/// What radar series are grouped by.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum GroupKey {
    #[default]
    Neighborhood,
    Period,
    Weekday,
}

/// Per-column means of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupProfile {
    /// Group label (neighborhood name, period, or weekday code).
    pub group: String,
    /// Rows in the group.
    pub rows: usize,
    /// Mean per column; `None` when the group has no value for it.
    pub values: BTreeMap<IndicatorColumn, Option<f64>>,
}

impl GroupProfile {
    /// Mean of one column.
    #[must_use]
    pub fn value(&self, column: IndicatorColumn) -> Option<f64> {
        self.values.get(&column).copied().flatten()
    }
}

/// Scaled series for the radar chart and raw means for its companion
/// table, both from one pass over the same rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarOutput {
    pub group_key: GroupKey,
    pub columns: Vec<IndicatorColumn>,
    /// Group means of min-max scaled values, in `[0, 1]`.
    pub scaled: Vec<GroupProfile>,
    /// Group means of raw values.
    pub raw: Vec<GroupProfile>,
}

impl RadarOutput {
    /// Raw profile of one group.
    #[must_use]
    pub fn raw_group(&self, group: &str) -> Option<&GroupProfile> {
        self.raw.iter().find(|p| p.group == group)
    }

    /// Scaled profile of one group.
    #[must_use]
    pub fn scaled_group(&self, group: &str) -> Option<&GroupProfile> {
        self.scaled.iter().find(|p| p.group == group)
    }
}
