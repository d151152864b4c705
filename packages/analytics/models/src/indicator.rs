//! The indicator catalogue.
//!
//! Every column of the wide indicator table is an [`IndicatorColumn`].
//! Display labels and colour ramps come from one descriptor list, so
//! per-indicator logic (statistics, radar scaling, choropleth layers) is
//! written once and iterated.

use std::fmt;
use std::str::FromStr;

use city_monitor_source_models::{CensusVariable, Channel, SurveyItem};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A column of the indicator table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum IndicatorColumn {
    /// An environmental sensor channel.
    Channel(Channel),
    /// Incidents in the neighborhood.
    CrimeCount,
    /// Survey response count.
    Responses,
    /// A survey score.
    Survey(SurveyItem),
    /// A census variable.
    Census(CensusVariable),
}

/// Unknown indicator code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownIndicator(pub String);

impl fmt::Display for UnknownIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown indicator '{}'", self.0)
    }
}

impl std::error::Error for UnknownIndicator {}

impl IndicatorColumn {
    /// The six environmental channels, the default radar selection.
    pub const CHANNELS: [Self; 6] = [
        Self::Channel(Channel::Temperature),
        Self::Channel(Channel::Humidity),
        Self::Channel(Channel::Luminosity),
        Self::Channel(Channel::Noise),
        Self::Channel(Channel::Eco2),
        Self::Channel(Channel::Etvoc),
    ];

    /// Every column in table order.
    #[must_use]
    pub fn all() -> Vec<Self> {
        Self::CHANNELS
            .into_iter()
            .chain([Self::CrimeCount, Self::Responses])
            .chain(SurveyItem::ALL.into_iter().map(Self::Survey))
            .chain(CensusVariable::ALL.into_iter().map(Self::Census))
            .collect()
    }

    /// Column code as it appears in table headers.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Channel(channel) => match channel {
                Channel::Temperature => "TEMPERATURA",
                Channel::Humidity => "UMIDADE",
                Channel::Luminosity => "LUMINOSIDADE",
                Channel::Noise => "RUIDO",
                Channel::Eco2 => "CO2",
                Channel::Etvoc => "ETVOC",
            },
            Self::CrimeCount => "NRO_CRIMES",
            Self::Responses => "QTD_RESP",
            Self::Survey(item) => item.into(),
            Self::Census(variable) => variable.code(),
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Channel(channel) => match channel {
                Channel::Temperature => "Temperatura (°C)",
                Channel::Humidity => "Umidade",
                Channel::Luminosity => "Luminosidade",
                Channel::Noise => "Ruído",
                Channel::Eco2 => "CO₂",
                Channel::Etvoc => "ETVOC",
            },
            Self::CrimeCount => "Qtd. Crimes",
            Self::Responses => "Qtd. Respostas",
            Self::Survey(item) => item.question(),
            Self::Census(variable) => variable.description(),
        }
    }

    /// Colour ramp used when the column is mapped.
    #[must_use]
    pub const fn ramp(self) -> ColorRamp {
        match self {
            Self::Channel(_) => ColorRamp::Spectral,
            Self::CrimeCount => ColorRamp::Reds,
            Self::Responses | Self::Survey(_) => ColorRamp::Greens,
            Self::Census(_) => ColorRamp::Purples,
        }
    }

    /// Full descriptor for this column.
    #[must_use]
    pub fn descriptor(self) -> IndicatorDescriptor {
        IndicatorDescriptor {
            column: self,
            code: self.code(),
            label: self.label(),
            ramp: self.ramp(),
        }
    }
}

impl fmt::Display for IndicatorColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for IndicatorColumn {
    type Err = UnknownIndicator;

    /// Parses a column code. Case is ignored; "CO₂" is accepted for CO2.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('₂', "2");
        Self::all()
            .into_iter()
            .find(|column| column.code().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| UnknownIndicator(s.to_string()))
    }
}

impl From<IndicatorColumn> for String {
    fn from(column: IndicatorColumn) -> Self {
        column.code().to_string()
    }
}

impl TryFrom<String> for IndicatorColumn {
    type Error = UnknownIndicator;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Column, label, and colour ramp of one indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorDescriptor {
    pub column: IndicatorColumn,
    pub code: &'static str,
    pub label: &'static str,
    pub ramp: ColorRamp,
}

/// Every indicator descriptor in table order.
#[must_use]
pub fn catalogue() -> Vec<IndicatorDescriptor> {
    IndicatorColumn::all()
        .into_iter()
        .map(IndicatorColumn::descriptor)
        .collect()
}

/// Sequential or diverging colour ramp for choropleth layers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum ColorRamp {
    Spectral,
    Reds,
    Greens,
    Purples,
}

impl ColorRamp {
    /// Colour stops, low to high.
    #[must_use]
    pub const fn stops(self) -> &'static [&'static str] {
        match self {
            Self::Spectral => &[
                "#3288BD", "#66C2A5", "#ABDDA4", "#E6F598", "#FEE08B", "#FDAE61", "#F46D43",
                "#D53E4F",
            ],
            Self::Reds => &["#FEE5D9", "#FCAE91", "#FB6A4A", "#DE2D26", "#A50F15"],
            Self::Greens => &["#EDF8E9", "#BAE4B3", "#74C476", "#31A354", "#006D2C"],
            Self::Purples => &["#F2F0F7", "#CBC9E2", "#9E9AC8", "#756BB1", "#54278F"],
        }
    }

    /// Colour of bin `bin` out of `bins`, spreading the stops evenly.
    #[must_use]
    pub fn color_for_bin(self, bin: usize, bins: usize) -> &'static str {
        let stops = self.stops();
        if bins <= 1 {
            return stops[stops.len() / 2];
        }
        let bin = bin.min(bins - 1);
        stops[bin * (stops.len() - 1) / (bins - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_parse_back() {
        for column in IndicatorColumn::all() {
            assert_eq!(column.code().parse::<IndicatorColumn>().unwrap(), column);
        }
        assert_eq!(IndicatorColumn::all().len(), 6 + 2 + 15 + 9);
    }

    #[test]
    fn accepts_display_spelling_of_co2() {
        assert_eq!(
            "CO₂".parse::<IndicatorColumn>().unwrap(),
            IndicatorColumn::Channel(Channel::Eco2)
        );
        assert_eq!(
            "sat07".parse::<IndicatorColumn>().unwrap(),
            IndicatorColumn::Survey(SurveyItem::Sat07)
        );
        assert!("PM25".parse::<IndicatorColumn>().is_err());
    }

    #[test]
    fn serializes_as_code() {
        let json = serde_json::to_string(&IndicatorColumn::Census(CensusVariable::V0001)).unwrap();
        assert_eq!(json, "\"v0001\"");
        let back: IndicatorColumn = serde_json::from_str("\"NRO_CRIMES\"").unwrap();
        assert_eq!(back, IndicatorColumn::CrimeCount);
    }

    #[test]
    fn ramp_endpoints() {
        let ramp = ColorRamp::Reds;
        assert_eq!(ramp.color_for_bin(0, 10), "#FEE5D9");
        assert_eq!(ramp.color_for_bin(9, 10), "#A50F15");
        assert_eq!(ramp.color_for_bin(42, 10), "#A50F15");
    }
}
