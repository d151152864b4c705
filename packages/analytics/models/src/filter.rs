//! User filter selection.

use std::collections::BTreeSet;

use city_monitor_source_models::{DayPeriod, TimeFields, WeekdayCode};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// How the day/month/year/hour/minute range is compared.
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
#[strum(serialize_all = "snake_case")]
pub enum RangeSemantics {
    /// Five independent inclusive bounds. `day` 5..=20 matches the 5th of
    /// any month of any year.
    #[default]
    PerField,
    /// The `(year, month, day, hour, minute)` tuple compared as one
    /// instant.
    Chronological,
}

/// One end of a time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBounds {
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub hour: u32,
    pub minute: u32,
}

impl TimeBounds {
    /// `(year, month, day, hour, minute)`.
    #[must_use]
    pub const fn chronological_key(&self) -> (i32, u32, u32, u32, u32) {
        (self.year, self.month, self.day, self.hour, self.minute)
    }
}

/// Inclusive range over the calendar fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub from: TimeBounds,
    pub to: TimeBounds,
}

impl TimeRange {
    /// Whether `fields` falls in the range under `semantics`.
    #[must_use]
    pub fn contains(&self, fields: &TimeFields, semantics: RangeSemantics) -> bool {
        match semantics {
            RangeSemantics::PerField => {
                (self.from.day..=self.to.day).contains(&fields.day)
                    && (self.from.month..=self.to.month).contains(&fields.month)
                    && (self.from.year..=self.to.year).contains(&fields.year)
                    && (self.from.hour..=self.to.hour).contains(&fields.hour)
                    && (self.from.minute..=self.to.minute).contains(&fields.minute)
            }
            RangeSemantics::Chronological => {
                let key = fields.chronological_key();
                self.from.chronological_key() <= key && key <= self.to.chronological_key()
            }
        }
    }
}

/// A filter selection. Empty sets mean "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    /// Normalized neighborhood names.
    pub neighborhoods: BTreeSet<String>,
    pub periods: BTreeSet<DayPeriod>,
    pub weekdays: BTreeSet<WeekdayCode>,
    /// Calendar range, applied to sensor readings only.
    pub range: Option<TimeRange>,
    pub semantics: RangeSemantics,
}

impl FilterSpec {
    /// Whether a neighborhood filter is active.
    #[must_use]
    pub fn has_neighborhoods(&self) -> bool {
        !self.neighborhoods.is_empty()
    }

    /// Set-membership test on the categorical dimensions.
    #[must_use]
    pub fn matches_categories(&self, neighborhood: &str, fields: &TimeFields) -> bool {
        (self.neighborhoods.is_empty() || self.neighborhoods.contains(neighborhood))
            && (self.periods.is_empty() || self.periods.contains(&fields.period))
            && (self.weekdays.is_empty() || self.weekdays.contains(&fields.weekday))
    }

    /// Range test; always true without a range.
    #[must_use]
    pub fn matches_range(&self, fields: &TimeFields) -> bool {
        self.range
            .is_none_or(|range| range.contains(fields, self.semantics))
    }
}
