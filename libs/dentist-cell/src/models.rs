use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DentistSpecialty {
    General,
    Orthodontist,
    Endodontist,
    Periodontist,
    OralSurgeon,
    Pediatric,
    Cosmetic,
}

impl DentistSpecialty {
    pub fn all() -> &'static [DentistSpecialty] {
        &[
            DentistSpecialty::General,
            DentistSpecialty::Orthodontist,
            DentistSpecialty::Endodontist,
            DentistSpecialty::Periodontist,
            DentistSpecialty::OralSurgeon,
            DentistSpecialty::Pediatric,
            DentistSpecialty::Cosmetic,
        ]
    }
}

impl fmt::Display for DentistSpecialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DentistSpecialty::General => write!(f, "general"),
            DentistSpecialty::Orthodontist => write!(f, "orthodontist"),
            DentistSpecialty::Endodontist => write!(f, "endodontist"),
            DentistSpecialty::Periodontist => write!(f, "periodontist"),
            DentistSpecialty::OralSurgeon => write!(f, "oral_surgeon"),
            DentistSpecialty::Pediatric => write!(f, "pediatric"),
            DentistSpecialty::Cosmetic => write!(f, "cosmetic"),
        }
    }
}

fn default_working_days() -> Vec<String> {
    ["monday", "tuesday", "wednesday", "thursday", "friday", "saturday"]
        .iter()
        .map(|day| day.to_string())
        .collect()
}

/// Dentist roster record. Identity only: slot generation in the scheduling
/// cell does not consult working days, they are informational.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dentist {
    pub dentist_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub specialty: DentistSpecialty,
    pub license_number: String,
    #[serde(default)]
    pub years_experience: u32,
    #[serde(default = "default_working_days")]
    pub working_days: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dentist {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        dentist_id: String,
        first_name: String,
        last_name: String,
        email: String,
        phone: String,
        specialty: DentistSpecialty,
        license_number: String,
        years_experience: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            dentist_id,
            first_name,
            last_name,
            email,
            phone,
            specialty,
            license_number,
            years_experience,
            working_days: default_working_days(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("Dr. {} {}", self.first_name, self.last_name)
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDentistRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub specialty: DentistSpecialty,
    pub license_number: String,
    #[serde(default)]
    pub years_experience: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateDentistRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<DentistSpecialty>,
    pub license_number: Option<String>,
    pub years_experience: Option<u32>,
    pub working_days: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_carries_the_title() {
        let d = Dentist::new(
            "D0001".to_string(),
            "Sarah".to_string(),
            "Chen".to_string(),
            "sarah@example.com".to_string(),
            "555-0100".to_string(),
            DentistSpecialty::Orthodontist,
            "LIC-1234".to_string(),
            8,
        );
        assert_eq!(d.full_name(), "Dr. Sarah Chen");
        assert_eq!(d.working_days.len(), 6);
    }

    #[test]
    fn specialty_codes_are_snake_case() {
        let code = serde_json::to_string(&DentistSpecialty::OralSurgeon).unwrap();
        assert_eq!(code, "\"oral_surgeon\"");
        assert!(serde_json::from_str::<DentistSpecialty>("\"podiatrist\"").is_err());
    }
}
