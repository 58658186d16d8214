use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Patient record. The directory owns identity and demographics; clinical
/// appointments live in the scheduling cell and are linked by `patient_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub insurance_provider: Option<String>,
    pub insurance_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub medical_history: Vec<MedicalHistoryEntry>,
    #[serde(default)]
    pub treatments: Vec<TreatmentRecord>,
    #[serde(default)]
    pub notes: Vec<PatientNote>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicalHistoryEntry {
    pub condition: String,
    pub date: NaiveDate,
    pub notes: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreatmentRecord {
    pub treatment_type: String,
    pub date: NaiveDate,
    pub cost: f64,
    pub notes: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientNote {
    pub note: String,
    pub category: String,
    pub added_at: DateTime<Utc>,
}

impl Patient {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        patient_id: String,
        first_name: String,
        last_name: String,
        email: String,
        phone: String,
        date_of_birth: NaiveDate,
        insurance_provider: Option<String>,
        insurance_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            patient_id,
            first_name,
            last_name,
            email,
            phone,
            date_of_birth,
            insurance_provider,
            insurance_id,
            created_at: now,
            updated_at: now,
            medical_history: Vec::new(),
            treatments: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whole years elapsed since the date of birth, birthday not yet
    /// reached this year counting one less.
    pub fn age(&self) -> i32 {
        let today = Utc::now().date_naive();
        let mut age = today.year() - self.date_of_birth.year();
        if (today.month(), today.day()) < (self.date_of_birth.month(), self.date_of_birth.day()) {
            age -= 1;
        }
        age
    }

    pub fn add_medical_history(&mut self, condition: String, date: NaiveDate, notes: String) {
        self.medical_history.push(MedicalHistoryEntry {
            condition,
            date,
            notes,
            added_at: Utc::now(),
        });
        self.updated_at = Utc::now();
    }

    pub fn add_treatment(&mut self, treatment_type: String, date: NaiveDate, cost: f64, notes: String) {
        self.treatments.push(TreatmentRecord {
            treatment_type,
            date,
            cost,
            notes,
            added_at: Utc::now(),
        });
        self.updated_at = Utc::now();
    }

    pub fn add_note(&mut self, note: String, category: String) {
        self.notes.push(PatientNote {
            note,
            category,
            added_at: Utc::now(),
        });
        self.updated_at = Utc::now();
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePatientRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub insurance_provider: Option<String>,
    pub insurance_id: Option<String>,
}

/// Updatable fields only. Unknown keys are rejected rather than silently
/// ignored so a typoed field name cannot pass as a successful update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePatientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub insurance_provider: Option<String>,
    pub insurance_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MedicalHistoryRequest {
    pub condition: String,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreatmentRequest {
    pub treatment_type: String,
    pub date: Option<NaiveDate>,
    pub cost: f64,
    #[serde(default)]
    pub notes: String,
}

fn default_note_category() -> String {
    "general".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoteRequest {
    pub note: String,
    #[serde(default = "default_note_category")]
    pub category: String,
}
