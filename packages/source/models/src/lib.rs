#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record types produced by the source loaders.
//!
//! Every input file (sensor readings, public-safety incidents, survey
//! results, census sectors) is parsed into one of these types. Records
//! come in two stages: the raw parsed form, and the joined form carrying
//! the neighborhood name and derived [`TimeFields`] that the aggregation
//! stage filters and groups on.

pub mod census;
pub mod survey;
pub mod time;

pub use census::{
    CensusSectorRow, CensusVariable, RateAggregation, SectorContribution, VariableKind,
};
pub use survey::{SurveyItem, SurveyRow};
pub use time::{DayPeriod, TimeFields, WeekdayCode};

use chrono::NaiveDateTime;
use city_monitor_incident_models::{Completion, CrimeClass};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One of the six environmental sensor channels.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Channel {
    /// Air temperature (°C)
    Temperature,
    /// Relative humidity
    Humidity,
    /// Luminosity
    Luminosity,
    /// Noise level
    Noise,
    /// Equivalent CO2
    Eco2,
    /// Equivalent total volatile organic compounds
    Etvoc,
}

impl Channel {
    /// All channels in display order.
    pub const ALL: [Self; 6] = [
        Self::Temperature,
        Self::Humidity,
        Self::Luminosity,
        Self::Noise,
        Self::Eco2,
        Self::Etvoc,
    ];
}

/// Optional readings for each environmental channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalChannels {
    /// Temperature.
    pub temperature: Option<f64>,
    /// Humidity.
    pub humidity: Option<f64>,
    /// Luminosity.
    pub luminosity: Option<f64>,
    /// Noise.
    pub noise: Option<f64>,
    /// eCO2.
    pub eco2: Option<f64>,
    /// eTVOC.
    pub etvoc: Option<f64>,
}

impl EnvironmentalChannels {
    /// Value of one channel.
    #[must_use]
    pub const fn get(&self, channel: Channel) -> Option<f64> {
        match channel {
            Channel::Temperature => self.temperature,
            Channel::Humidity => self.humidity,
            Channel::Luminosity => self.luminosity,
            Channel::Noise => self.noise,
            Channel::Eco2 => self.eco2,
            Channel::Etvoc => self.etvoc,
        }
    }

    /// Sets one channel.
    pub const fn set(&mut self, channel: Channel, value: Option<f64>) {
        match channel {
            Channel::Temperature => self.temperature = value,
            Channel::Humidity => self.humidity = value,
            Channel::Luminosity => self.luminosity = value,
            Channel::Noise => self.noise = value,
            Channel::Eco2 => self.eco2 = value,
            Channel::Etvoc => self.etvoc = value,
        }
    }
}

/// A sensor reading as parsed from a monitoring export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    /// Record id: the id column when configured, else `file:row`.
    pub id: String,
    /// Reading time (local, no zone).
    pub timestamp: NaiveDateTime,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Channel values.
    pub channels: EnvironmentalChannels,
}

/// A sensor reading attributed to a neighborhood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingRow {
    /// Record id.
    pub id: String,
    /// Normalized neighborhood name.
    pub neighborhood: String,
    /// Reading time.
    pub timestamp: NaiveDateTime,
    /// Derived calendar fields.
    pub time: TimeFields,
    /// Channel values.
    pub channels: EnvironmentalChannels,
}

/// A public-safety incident as parsed from the incident export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// Record id: the id column when configured, else `file:row`.
    pub id: String,
    /// When the incident occurred.
    pub timestamp: NaiveDateTime,
    /// Latitude, when the export carries coordinates.
    pub latitude: Option<f64>,
    /// Longitude, when the export carries coordinates.
    pub longitude: Option<f64>,
    /// Normalized municipality name.
    pub municipality: Option<String>,
    /// Normalized neighborhood name as written in the export.
    pub neighborhood: Option<String>,
    /// Place type ("Via Pública", "Residência", ...).
    pub place_type: Option<String>,
    /// Offense description.
    pub description: String,
    /// Completion status.
    pub completion: Completion,
    /// Whether the offender was caught in the act.
    pub flagrant: Option<bool>,
    /// Derived classification.
    pub class: CrimeClass,
}

impl IncidentRecord {
    /// `(longitude, latitude)` when both coordinates are present and
    /// non-zero.
    #[must_use]
    pub fn point(&self) -> Option<(f64, f64)> {
        match (self.longitude, self.latitude) {
            (Some(lng), Some(lat)) if lng != 0.0 && lat != 0.0 => Some((lng, lat)),
            _ => None,
        }
    }
}

/// An incident attributed to a neighborhood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRow {
    /// Normalized neighborhood name.
    pub neighborhood: String,
    /// Derived calendar fields.
    pub time: TimeFields,
    /// The parsed record.
    pub incident: IncidentRecord,
}

/// Row counters for one loaded file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    /// Data rows read.
    pub rows: usize,
    /// Rows kept.
    pub kept: usize,
    /// Rows dropped for an unparseable or missing timestamp.
    pub bad_timestamp: usize,
    /// Rows dropped for zero or missing coordinates, or unusable geometry.
    pub bad_coordinates: usize,
    /// Rows dropped for any other reason (missing key, filtered out).
    pub skipped: usize,
}

impl LoadReport {
    /// Adds another report's counters to this one.
    pub const fn merge(&mut self, other: &Self) {
        self.rows += other.rows;
        self.kept += other.kept;
        self.bad_timestamp += other.bad_timestamp;
        self.bad_coordinates += other.bad_coordinates;
        self.skipped += other.skipped;
    }
}
