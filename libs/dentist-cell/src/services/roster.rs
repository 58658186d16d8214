use std::collections::HashMap;

use chrono::Utc;
use tracing::info;

use shared_store::CollectionStore;

use crate::models::{CreateDentistRequest, Dentist, DentistSpecialty, UpdateDentistRequest};

pub struct DentistRoster {
    store: Box<dyn CollectionStore<Dentist>>,
    dentists: HashMap<String, Dentist>,
}

impl DentistRoster {
    pub fn new(store: Box<dyn CollectionStore<Dentist>>) -> Self {
        let dentists = store.load_all();
        info!("Loaded {} dentists", dentists.len());
        Self { store, dentists }
    }

    fn flush(&self) {
        self.store.save_all(&self.dentists);
    }

    fn next_id(&self) -> String {
        format!("D{:04}", self.dentists.len() + 1)
    }

    pub fn create(&mut self, request: CreateDentistRequest) -> Dentist {
        let dentist = Dentist::new(
            self.next_id(),
            request.first_name,
            request.last_name,
            request.email,
            request.phone,
            request.specialty,
            request.license_number,
            request.years_experience,
        );
        self.dentists
            .insert(dentist.dentist_id.clone(), dentist.clone());
        self.flush();
        dentist
    }

    pub fn get(&self, dentist_id: &str) -> Option<Dentist> {
        self.dentists.get(dentist_id).cloned()
    }

    pub fn all(&self) -> Vec<Dentist> {
        let mut dentists: Vec<Dentist> = self.dentists.values().cloned().collect();
        dentists.sort_by(|a, b| a.dentist_id.cmp(&b.dentist_id));
        dentists
    }

    pub fn by_specialty(&self, specialty: DentistSpecialty) -> Vec<Dentist> {
        let mut dentists: Vec<Dentist> = self
            .dentists
            .values()
            .filter(|d| d.specialty == specialty)
            .cloned()
            .collect();
        dentists.sort_by(|a, b| a.dentist_id.cmp(&b.dentist_id));
        dentists
    }

    pub fn update(&mut self, dentist_id: &str, request: UpdateDentistRequest) -> Option<Dentist> {
        let dentist = self.dentists.get_mut(dentist_id)?;

        if let Some(first_name) = request.first_name {
            dentist.first_name = first_name;
        }
        if let Some(last_name) = request.last_name {
            dentist.last_name = last_name;
        }
        if let Some(email) = request.email {
            dentist.email = email;
        }
        if let Some(phone) = request.phone {
            dentist.phone = phone;
        }
        if let Some(specialty) = request.specialty {
            dentist.specialty = specialty;
        }
        if let Some(license_number) = request.license_number {
            dentist.license_number = license_number;
        }
        if let Some(years_experience) = request.years_experience {
            dentist.years_experience = years_experience;
        }
        if let Some(working_days) = request.working_days {
            dentist.working_days = working_days;
        }
        dentist.updated_at = Utc::now();

        let updated = dentist.clone();
        self.flush();
        Some(updated)
    }
}
