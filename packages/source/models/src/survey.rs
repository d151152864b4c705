//! Citizen-satisfaction survey rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// One of the fifteen survey questions.
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
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SurveyItem {
    /// Neighborhood satisfaction
    Sat01,
    /// Health
    Sat02,
    /// Physical activity
    Sat03,
    /// Financial situation
    Sat04,
    /// Local commerce
    Sat05,
    /// Air quality
    Sat06,
    /// Noise
    Sat07,
    /// Leisure spaces
    Sat08,
    /// Garbage collection
    Sat09,
    /// Distance to bus stops
    Sat10,
    /// Bus stop quality
    Sat11,
    /// Access to important places
    Sat12,
    /// Feeling of safety
    Sat13,
    /// Trust in people
    Sat14,
    /// Sewage treatment
    Sat15,
}

impl SurveyItem {
    /// All items in question order.
    pub const ALL: [Self; 15] = [
        Self::Sat01,
        Self::Sat02,
        Self::Sat03,
        Self::Sat04,
        Self::Sat05,
        Self::Sat06,
        Self::Sat07,
        Self::Sat08,
        Self::Sat09,
        Self::Sat10,
        Self::Sat11,
        Self::Sat12,
        Self::Sat13,
        Self::Sat14,
        Self::Sat15,
    ];

    /// Question text, also the default column header of the survey export.
    #[must_use]
    pub const fn question(self) -> &'static str {
        match self {
            Self::Sat01 => "Satisfação com o bairro",
            Self::Sat02 => "Satisfação com a Saúde",
            Self::Sat03 => "Prática de atividade física",
            Self::Sat04 => "Satisfação financeira",
            Self::Sat05 => "Satisfação com atividade comercial",
            Self::Sat06 => "Satisfação com qualidade do ar",
            Self::Sat07 => "Satisfação com ruído",
            Self::Sat08 => "Satisfação com espaços de lazer",
            Self::Sat09 => "Satistação com coleta de lixo",
            Self::Sat10 => "Satisfação com distância da parada de ônibus",
            Self::Sat11 => "Satisfação com qualidade das paradas de ônibus",
            Self::Sat12 => "Satisfação com acesso aos locais importantes da cidade",
            Self::Sat13 => "Sentimento de segurança",
            Self::Sat14 => "Sentimento de confiança nas pessoas",
            Self::Sat15 => "Satisfação com tratamento de esgoto",
        }
    }
}

/// Survey results for one neighborhood.
///
/// Scores carry no assumed bound; exports mix 0-10 and 0-100 scales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyRow {
    /// Normalized neighborhood name.
    pub neighborhood: String,
    /// Number of responses, `None` when the cell is blank.
    pub responses: Option<f64>,
    /// Scores present in the row. Absent items were blank.
    pub scores: BTreeMap<SurveyItem, f64>,
}

impl SurveyRow {
    /// Score for one item, if present.
    #[must_use]
    pub fn score(&self, item: SurveyItem) -> Option<f64> {
        self.scores.get(&item).copied()
    }
}
