use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use shared_store::CollectionStore;

use crate::models::{Patient, UpdatePatientRequest};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PatientStats {
    pub total_patients: usize,
    pub patients_with_insurance: usize,
    pub insurance_coverage_percentage: f64,
    pub age_distribution: BTreeMap<String, usize>,
}

/// In-memory patient registry backed by a persistent collection store.
/// Every mutation flushes the whole collection, matching the other cells.
pub struct PatientDirectory {
    store: Box<dyn CollectionStore<Patient>>,
    patients: HashMap<String, Patient>,
}

impl PatientDirectory {
    pub fn new(store: Box<dyn CollectionStore<Patient>>) -> Self {
        let patients = store.load_all();
        info!("Loaded {} patients", patients.len());
        Self { store, patients }
    }

    fn flush(&self) {
        self.store.save_all(&self.patients);
    }

    /// Ids must keep increasing across deletions, so the next id comes from
    /// the highest existing one rather than the collection size (a size-based
    /// id would collide with a survivor after a delete and overwrite it).
    fn next_id(&self) -> String {
        let highest = self
            .patients
            .keys()
            .filter_map(|id| id.strip_prefix('P')?.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("P{:04}", highest + 1)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &mut self,
        first_name: String,
        last_name: String,
        email: String,
        phone: String,
        date_of_birth: NaiveDate,
        insurance_provider: Option<String>,
        insurance_id: Option<String>,
    ) -> Patient {
        let patient = Patient::new(
            self.next_id(),
            first_name,
            last_name,
            email,
            phone,
            date_of_birth,
            insurance_provider,
            insurance_id,
        );
        self.patients
            .insert(patient.patient_id.clone(), patient.clone());
        self.flush();
        patient
    }

    pub fn get(&self, patient_id: &str) -> Option<Patient> {
        self.patients.get(patient_id).cloned()
    }

    pub fn by_email(&self, email: &str) -> Option<Patient> {
        self.patients
            .values()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    pub fn by_phone(&self, phone: &str) -> Option<Patient> {
        self.patients.values().find(|p| p.phone == phone).cloned()
    }

    /// Case-insensitive substring match over names, email, and phone.
    pub fn search(&self, query: &str) -> Vec<Patient> {
        let query = query.to_lowercase();
        let mut results: Vec<Patient> = self
            .patients
            .values()
            .filter(|p| {
                p.first_name.to_lowercase().contains(&query)
                    || p.last_name.to_lowercase().contains(&query)
                    || p.full_name().to_lowercase().contains(&query)
                    || p.email.to_lowercase().contains(&query)
                    || p.phone.contains(&query)
            })
            .cloned()
            .collect();
        results.sort_by(|a, b| a.patient_id.cmp(&b.patient_id));
        results
    }

    pub fn update(&mut self, patient_id: &str, request: UpdatePatientRequest) -> Option<Patient> {
        let patient = self.patients.get_mut(patient_id)?;

        if let Some(first_name) = request.first_name {
            patient.first_name = first_name;
        }
        if let Some(last_name) = request.last_name {
            patient.last_name = last_name;
        }
        if let Some(email) = request.email {
            patient.email = email;
        }
        if let Some(phone) = request.phone {
            patient.phone = phone;
        }
        if let Some(date_of_birth) = request.date_of_birth {
            patient.date_of_birth = date_of_birth;
        }
        if let Some(insurance_provider) = request.insurance_provider {
            patient.insurance_provider = Some(insurance_provider);
        }
        if let Some(insurance_id) = request.insurance_id {
            patient.insurance_id = Some(insurance_id);
        }
        patient.updated_at = Utc::now();

        let updated = patient.clone();
        self.flush();
        Some(updated)
    }

    pub fn delete(&mut self, patient_id: &str) -> bool {
        if self.patients.remove(patient_id).is_some() {
            self.flush();
            true
        } else {
            false
        }
    }

    pub fn all(&self) -> Vec<Patient> {
        let mut patients: Vec<Patient> = self.patients.values().cloned().collect();
        patients.sort_by(|a, b| a.patient_id.cmp(&b.patient_id));
        patients
    }

    pub fn by_insurance(&self, provider: &str) -> Vec<Patient> {
        let mut patients: Vec<Patient> = self
            .patients
            .values()
            .filter(|p| {
                p.insurance_provider
                    .as_deref()
                    .is_some_and(|existing| existing.eq_ignore_ascii_case(provider))
            })
            .cloned()
            .collect();
        patients.sort_by(|a, b| a.patient_id.cmp(&b.patient_id));
        patients
    }

    pub fn add_medical_history(
        &mut self,
        patient_id: &str,
        condition: String,
        date: NaiveDate,
        notes: String,
    ) -> bool {
        match self.patients.get_mut(patient_id) {
            Some(patient) => {
                patient.add_medical_history(condition, date, notes);
                self.flush();
                true
            }
            None => false,
        }
    }

    pub fn add_treatment(
        &mut self,
        patient_id: &str,
        treatment_type: String,
        date: NaiveDate,
        cost: f64,
        notes: String,
    ) -> bool {
        match self.patients.get_mut(patient_id) {
            Some(patient) => {
                patient.add_treatment(treatment_type, date, cost, notes);
                self.flush();
                true
            }
            None => false,
        }
    }

    pub fn add_note(&mut self, patient_id: &str, note: String, category: String) -> bool {
        match self.patients.get_mut(patient_id) {
            Some(patient) => {
                patient.add_note(note, category);
                self.flush();
                true
            }
            None => false,
        }
    }

    pub fn statistics(&self) -> PatientStats {
        let total_patients = self.patients.len();
        let patients_with_insurance = self
            .patients
            .values()
            .filter(|p| p.insurance_provider.is_some())
            .count();
        let insurance_coverage_percentage = if total_patients > 0 {
            patients_with_insurance as f64 / total_patients as f64 * 100.0
        } else {
            0.0
        };

        let mut age_distribution: BTreeMap<String, usize> = ["0-17", "18-30", "31-50", "51-70", "70+"]
            .into_iter()
            .map(|bucket| (bucket.to_string(), 0))
            .collect();
        for patient in self.patients.values() {
            let bucket = match patient.age() {
                age if age < 18 => "0-17",
                age if age < 31 => "18-30",
                age if age < 51 => "31-50",
                age if age < 71 => "51-70",
                _ => "70+",
            };
            *age_distribution
                .get_mut(bucket)
                .expect("bucket pre-seeded above") += 1;
        }

        PatientStats {
            total_patients,
            patients_with_insurance,
            insurance_coverage_percentage,
            age_distribution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use shared_store::MemoryStore;

    fn directory() -> PatientDirectory {
        PatientDirectory::new(Box::new(MemoryStore::new()))
    }

    fn dob(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 1, 15).unwrap()
    }

    fn add(dir: &mut PatientDirectory, first: &str, last: &str, email: &str, phone: &str) -> Patient {
        dir.create(
            first.to_string(),
            last.to_string(),
            email.to_string(),
            phone.to_string(),
            dob(1990),
            None,
            None,
        )
    }

    #[test]
    fn ids_are_sequential_with_p_prefix() {
        let mut dir = directory();
        let a = add(&mut dir, "Jane", "Doe", "jane@example.com", "555-0100");
        let b = add(&mut dir, "John", "Roe", "john@example.com", "555-0101");
        assert_eq!(a.patient_id, "P0001");
        assert_eq!(b.patient_id, "P0002");
    }

    #[test]
    fn email_lookup_ignores_case() {
        let mut dir = directory();
        add(&mut dir, "Jane", "Doe", "Jane@Example.com", "555-0100");
        let found = dir.by_email("jane@example.com").unwrap();
        assert_eq!(found.patient_id, "P0001");
        assert!(dir.by_email("missing@example.com").is_none());
    }

    #[test]
    fn phone_lookup_is_exact() {
        let mut dir = directory();
        add(&mut dir, "Jane", "Doe", "jane@example.com", "555-0100");
        assert!(dir.by_phone("555-0100").is_some());
        assert!(dir.by_phone("555-9999").is_none());
    }

    #[test]
    fn search_matches_name_email_and_phone() {
        let mut dir = directory();
        add(&mut dir, "Jane", "Doe", "jane@example.com", "555-0100");
        add(&mut dir, "John", "Smith", "john@clinic.org", "555-0101");

        assert_eq!(dir.search("doe").len(), 1);
        assert_eq!(dir.search("jane doe").len(), 1);
        assert_eq!(dir.search("clinic").len(), 1);
        assert_eq!(dir.search("555-01").len(), 2);
        assert!(dir.search("nobody").is_empty());
    }

    #[test]
    fn update_applies_only_present_fields() {
        let mut dir = directory();
        add(&mut dir, "Jane", "Doe", "jane@example.com", "555-0100");

        let updated = dir
            .update(
                "P0001",
                UpdatePatientRequest {
                    phone: Some("555-0200".to_string()),
                    insurance_provider: Some("Aetna".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.phone, "555-0200");
        assert_eq!(updated.first_name, "Jane");
        assert_eq!(updated.insurance_provider.as_deref(), Some("Aetna"));

        assert!(dir.update("P9999", UpdatePatientRequest::default()).is_none());
    }

    #[test]
    fn delete_reports_whether_anything_was_removed() {
        let mut dir = directory();
        add(&mut dir, "Jane", "Doe", "jane@example.com", "555-0100");
        assert!(dir.delete("P0001"));
        assert!(!dir.delete("P0001"));
        assert!(dir.get("P0001").is_none());
    }

    #[test]
    fn ids_keep_increasing_after_a_delete() {
        let mut dir = directory();
        add(&mut dir, "Jane", "Doe", "jane@example.com", "555-0100");
        add(&mut dir, "John", "Roe", "john@example.com", "555-0101");
        assert!(dir.delete("P0001"));

        let third = add(&mut dir, "Mary", "Poe", "mary@example.com", "555-0102");
        assert_eq!(third.patient_id, "P0003");
        // The survivor must not be overwritten by the new record.
        assert_eq!(dir.get("P0002").unwrap().first_name, "John");
        assert_eq!(dir.all().len(), 2);
    }

    #[test]
    fn insurance_filter_ignores_case_and_skips_uninsured() {
        let mut dir = directory();
        dir.create(
            "Jane".to_string(),
            "Doe".to_string(),
            "jane@example.com".to_string(),
            "555-0100".to_string(),
            dob(1990),
            Some("Delta Dental".to_string()),
            Some("DD-123".to_string()),
        );
        add(&mut dir, "John", "Roe", "john@example.com", "555-0101");

        let insured = dir.by_insurance("delta dental");
        assert_eq!(insured.len(), 1);
        assert_eq!(insured[0].patient_id, "P0001");
        assert!(dir.by_insurance("Cigna").is_empty());
    }

    #[test]
    fn record_appenders_report_unknown_patient() {
        let mut dir = directory();
        add(&mut dir, "Jane", "Doe", "jane@example.com", "555-0100");

        assert!(dir.add_note("P0001", "note".to_string(), "general".to_string()));
        assert!(!dir.add_note("P9999", "note".to_string(), "general".to_string()));
        assert!(dir.add_medical_history(
            "P0001",
            "gingivitis".to_string(),
            dob(2020),
            String::new()
        ));
        assert!(dir.add_treatment(
            "P0001",
            "cleaning".to_string(),
            dob(2024),
            120.0,
            String::new()
        ));
        let patient = dir.get("P0001").unwrap();
        assert_eq!(patient.notes.len(), 1);
        assert_eq!(patient.medical_history.len(), 1);
        assert_eq!(patient.treatments.len(), 1);
    }

    #[test]
    fn statistics_cover_insurance_and_age_buckets() {
        let mut dir = directory();
        let current_year = Utc::now().date_naive().year();
        dir.create(
            "Kid".to_string(),
            "Doe".to_string(),
            "kid@example.com".to_string(),
            "555-0100".to_string(),
            dob(current_year - 10),
            Some("Aetna".to_string()),
            None,
        );
        dir.create(
            "Elder".to_string(),
            "Doe".to_string(),
            "elder@example.com".to_string(),
            "555-0101".to_string(),
            dob(current_year - 80),
            None,
            None,
        );

        let stats = dir.statistics();
        assert_eq!(stats.total_patients, 2);
        assert_eq!(stats.patients_with_insurance, 1);
        assert!((stats.insurance_coverage_percentage - 50.0).abs() < f64::EPSILON);
        assert_eq!(stats.age_distribution["0-17"], 1);
        assert_eq!(stats.age_distribution["70+"], 1);
        assert_eq!(stats.age_distribution["31-50"], 0);
    }

    #[test]
    fn empty_directory_statistics_avoid_division_by_zero() {
        let dir = directory();
        let stats = dir.statistics();
        assert_eq!(stats.total_patients, 0);
        assert_eq!(stats.insurance_coverage_percentage, 0.0);
    }
}
