#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident classification taxonomy.
//!
//! Public-safety records carry a free-text description and a completion
//! status ("Tentado" / "Consumado"). This crate turns that pair into one of
//! five fixed [`CrimeClass`] values through an explicit decision table, so
//! the `Other` fallthrough is a single, visible row rather than the tail of
//! a conditional chain.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Whether the offense was carried out or only attempted.
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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Completion {
    /// "Tentado"
    Attempted,
    /// "Consumado"
    Consummated,
    /// Blank or unrecognized status
    Unknown,
}

impl Completion {
    /// Parses the completion status column.
    ///
    /// Matching is case-insensitive and accepts both the Portuguese source
    /// values and their English equivalents. Anything else is
    /// [`Completion::Unknown`].
    #[must_use]
    pub fn from_status(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "TENTADO" | "TENTADA" | "ATTEMPTED" => Self::Attempted,
            "CONSUMADO" | "CONSUMADA" | "CONSUMMATED" | "COMPLETED" => Self::Consummated,
            _ => Self::Unknown,
        }
    }

    /// Convenience for callers that only know the attempted flag.
    #[must_use]
    pub const fn from_attempted(attempted: bool) -> Self {
        if attempted {
            Self::Attempted
        } else {
            Self::Consummated
        }
    }
}

/// Offense keyword looked up in an incident description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OffenseKeyword {
    /// "HOMICIDIO" / "HOMICIDE"
    Homicide,
    /// "ROUBO" / "ROBBERY"
    Robbery,
}

impl OffenseKeyword {
    /// Upper-case, accent-free spellings that identify this offense.
    #[must_use]
    pub const fn spellings(self) -> &'static [&'static str] {
        match self {
            Self::Homicide => &["HOMICIDIO", "HOMICIDE"],
            Self::Robbery => &["ROUBO", "ROBBERY"],
        }
    }

    /// Whether `description` mentions this offense.
    ///
    /// `description` is expected to be upper-case and accent-free already.
    #[must_use]
    pub fn found_in(self, description: &str) -> bool {
        self.spellings().iter().any(|s| description.contains(s))
    }
}

/// Five-way crime classification used for the public-safety indicators.
///
/// The display form is the Portuguese label shown on the dashboard.
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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrimeClass {
    /// Consummated homicide
    #[strum(serialize = "Homicídio")]
    Homicide,
    /// Consummated robbery
    #[strum(serialize = "Roubo")]
    Robbery,
    /// Attempted homicide
    #[strum(serialize = "Tentativa de Homicídio")]
    AttemptedHomicide,
    /// Attempted robbery
    #[strum(serialize = "Tentativa de Roubo")]
    AttemptedRobbery,
    /// Everything the table does not name
    #[strum(serialize = "Outros")]
    Other,
}

/// Decision table for [`CrimeClass::classify`], evaluated top to bottom.
///
/// Homicide rows precede robbery rows, so a description mentioning both is
/// classified as a homicide.
const CLASSIFICATION_TABLE: &[(Completion, OffenseKeyword, CrimeClass)] = &[
    (
        Completion::Attempted,
        OffenseKeyword::Homicide,
        CrimeClass::AttemptedHomicide,
    ),
    (
        Completion::Attempted,
        OffenseKeyword::Robbery,
        CrimeClass::AttemptedRobbery,
    ),
    (
        Completion::Consummated,
        OffenseKeyword::Homicide,
        CrimeClass::Homicide,
    ),
    (
        Completion::Consummated,
        OffenseKeyword::Robbery,
        CrimeClass::Robbery,
    ),
];

impl CrimeClass {
    /// Classifies an incident from its completion status and its
    /// (upper-case, accent-free) description.
    ///
    /// Returns [`CrimeClass::Other`] when no table row matches, including
    /// every record with an [`Completion::Unknown`] status.
    #[must_use]
    pub fn classify(completion: Completion, description: &str) -> Self {
        CLASSIFICATION_TABLE
            .iter()
            .find(|(status, keyword, _)| *status == completion && keyword.found_in(description))
            .map_or(Self::Other, |(_, _, class)| *class)
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Homicide,
            Self::Robbery,
            Self::AttemptedHomicide,
            Self::AttemptedRobbery,
            Self::Other,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempted_homicide_label() {
        let class = CrimeClass::classify(Completion::from_attempted(true), "TENTATIVA DE HOMICIDIO");
        assert_eq!(class, CrimeClass::AttemptedHomicide);
        assert_eq!(class.to_string(), "Tentativa de Homicídio");
    }

    #[test]
    fn consummated_robbery_label() {
        let class = CrimeClass::classify(Completion::from_attempted(false), "ROUBO A PEDESTRE");
        assert_eq!(class, CrimeClass::Robbery);
        assert_eq!(class.to_string(), "Roubo");
    }

    #[test]
    fn consummated_without_keyword_is_other() {
        let class = CrimeClass::classify(Completion::from_attempted(false), "FURTO SIMPLES");
        assert_eq!(class, CrimeClass::Other);
        assert_eq!(class.to_string(), "Outros");
    }

    #[test]
    fn unknown_completion_is_always_other() {
        for description in ["HOMICIDIO", "ROUBO", ""] {
            assert_eq!(
                CrimeClass::classify(Completion::Unknown, description),
                CrimeClass::Other
            );
        }
    }

    #[test]
    fn homicide_wins_over_robbery() {
        assert_eq!(
            CrimeClass::classify(Completion::Consummated, "ROUBO SEGUIDO DE HOMICIDIO"),
            CrimeClass::Homicide
        );
        assert_eq!(
            CrimeClass::classify(Completion::Attempted, "ROUBO SEGUIDO DE HOMICIDIO"),
            CrimeClass::AttemptedHomicide
        );
    }

    #[test]
    fn english_keywords_match() {
        assert_eq!(
            CrimeClass::classify(Completion::Attempted, "ARMED ROBBERY"),
            CrimeClass::AttemptedRobbery
        );
        assert_eq!(
            CrimeClass::classify(Completion::Consummated, "HOMICIDE"),
            CrimeClass::Homicide
        );
    }

    #[test]
    fn completion_status_parsing() {
        assert_eq!(Completion::from_status("Tentado"), Completion::Attempted);
        assert_eq!(Completion::from_status(" consumado "), Completion::Consummated);
        assert_eq!(Completion::from_status(""), Completion::Unknown);
        assert_eq!(Completion::from_status("Outro"), Completion::Unknown);
    }

    #[test]
    fn labels_round_trip_through_strum() {
        for class in CrimeClass::all() {
            let parsed: CrimeClass = class.to_string().parse().unwrap();
            assert_eq!(parsed, *class);
        }
    }
}
