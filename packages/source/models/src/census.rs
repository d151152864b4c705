//! Census sector rows and their variables.

use std::collections::BTreeMap;

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString, IntoStaticStr};

/// How a census variable combines across the sectors of a neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// Additive quantity (people, households).
    Count,
    /// Already an average or a percentage.
    Rate,
}

/// How rate-typed survey and census variables are combined per
/// neighborhood.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateAggregation {
    /// Rates are summed like counts.
    #[default]
    Sum,
    /// Rates are averaged over the contributing rows.
    Mean,
}

/// A census sector variable.
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
    IntoStaticStr,
)]
pub enum CensusVariable {
    /// Total residents
    #[serde(rename = "v0001")]
    #[strum(serialize = "v0001")]
    V0001,
    /// Total households
    #[serde(rename = "v0002")]
    #[strum(serialize = "v0002")]
    V0002,
    /// Private households
    #[serde(rename = "v0003")]
    #[strum(serialize = "v0003")]
    V0003,
    /// Collective households
    #[serde(rename = "v0004")]
    #[strum(serialize = "v0004")]
    V0004,
    /// Mean residents per occupied private household
    #[serde(rename = "v0005")]
    #[strum(serialize = "v0005")]
    V0005,
    /// Percentage of occupied private households
    #[serde(rename = "v0006")]
    #[strum(serialize = "v0006")]
    V0006,
    /// Occupied private households
    #[serde(rename = "v0007")]
    #[strum(serialize = "v0007")]
    V0007,
    /// Mean household income
    #[serde(rename = "RENDA_MEDIA")]
    #[strum(serialize = "RENDA_MEDIA")]
    AverageIncome,
    /// Literate residents
    #[serde(rename = "ALFABETIZADOS")]
    #[strum(serialize = "ALFABETIZADOS")]
    Literate,
}

impl CensusVariable {
    /// All variables in column order.
    pub const ALL: [Self; 9] = [
        Self::V0001,
        Self::V0002,
        Self::V0003,
        Self::V0004,
        Self::V0005,
        Self::V0006,
        Self::V0007,
        Self::AverageIncome,
        Self::Literate,
    ];

    /// Whether the variable is a count or a rate.
    #[must_use]
    pub const fn kind(self) -> VariableKind {
        match self {
            Self::V0005 | Self::V0006 | Self::AverageIncome => VariableKind::Rate,
            Self::V0001
            | Self::V0002
            | Self::V0003
            | Self::V0004
            | Self::V0007
            | Self::Literate => VariableKind::Count,
        }
    }

    /// Column code ("v0001", "RENDA_MEDIA", ...).
    #[must_use]
    pub fn code(self) -> &'static str {
        self.into()
    }

    /// Human-readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::V0001 => "Total de Pessoas",
            Self::V0002 => "Total de Domicílios",
            Self::V0003 => "Total de Domicílios Particulares",
            Self::V0004 => "Total de Domicílios Coletivos",
            Self::V0005 => "Média de Moradores em Domicílios Particulares Ocupados",
            Self::V0006 => "Percentual de Domicílios Particulares Ocupados",
            Self::V0007 => "Total de Domicílios Particulares Ocupados",
            Self::AverageIncome => "Renda Média",
            Self::Literate => "Pessoas Alfabetizadas",
        }
    }
}

/// A census sector with its polygon and attribute values.
#[derive(Debug, Clone, PartialEq)]
pub struct CensusSectorRow {
    /// Sector code.
    pub code: String,
    /// Normalized municipality name, if the layer carries one.
    pub municipality: Option<String>,
    /// Sector polygon in EPSG:4326.
    pub boundary: MultiPolygon<f64>,
    /// Variables present for this sector. Absent ones were blank or not
    /// exported.
    pub values: BTreeMap<CensusVariable, f64>,
}

/// A census sector attributed to a neighborhood by the spatial join.
///
/// A sector straddling a boundary appears once per neighborhood it
/// intersects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorContribution {
    /// Normalized neighborhood name.
    pub neighborhood: String,
    /// Sector code.
    pub code: String,
    /// Sector values.
    pub values: BTreeMap<CensusVariable, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn codes_round_trip_through_strum() {
        for variable in CensusVariable::ALL {
            let code = variable.to_string();
            assert_eq!(CensusVariable::from_str(&code).unwrap(), variable);
        }
        assert_eq!(CensusVariable::V0001.to_string(), "v0001");
        assert_eq!(CensusVariable::AverageIncome.to_string(), "RENDA_MEDIA");
    }

    #[test]
    fn rates_are_tagged() {
        assert_eq!(CensusVariable::V0005.kind(), VariableKind::Rate);
        assert_eq!(CensusVariable::V0006.kind(), VariableKind::Rate);
        assert_eq!(CensusVariable::V0001.kind(), VariableKind::Count);
        assert_eq!(CensusVariable::Literate.kind(), VariableKind::Count);
    }
}
