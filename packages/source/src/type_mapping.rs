//! Incident classification from raw export cells.
//!
//! Export descriptions come in mixed case and with accents
//! ("Homicídio Doloso", "ROUBO A PEDESTRE"). They are normalized the same
//! way neighborhood names are before the keyword table in
//! [`CrimeClass::classify`] is consulted.

use city_monitor_incident_models::{Completion, CrimeClass};
use city_monitor_neighborhood::names::normalize_name;

/// Classifies an incident from its raw completion status and description.
#[must_use]
pub fn classify_incident(status: &str, description: &str) -> (Completion, CrimeClass) {
    let completion = Completion::from_status(&normalize_name(status));
    let class = CrimeClass::classify(completion, &normalize_name(description));
    (completion, class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempted_homicide_with_accents() {
        let (completion, class) = classify_incident("Tentado", "Homicídio doloso");
        assert_eq!(completion, Completion::Attempted);
        assert_eq!(class, CrimeClass::AttemptedHomicide);
        assert_eq!(class.to_string(), "Tentativa de Homicídio");
    }

    #[test]
    fn consummated_robbery() {
        let (_, class) = classify_incident("Consumado", "Roubo a pedestre");
        assert_eq!(class.to_string(), "Roubo");
    }

    #[test]
    fn unrelated_description_is_other() {
        let (_, class) = classify_incident("Consumado", "Furto de veículo");
        assert_eq!(class.to_string(), "Outros");
    }

    #[test]
    fn unknown_status_is_other() {
        let (completion, class) = classify_incident("", "ROUBO");
        assert_eq!(completion, Completion::Unknown);
        assert_eq!(class, CrimeClass::Other);
    }
}
