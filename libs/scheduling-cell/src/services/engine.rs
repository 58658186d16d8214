use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info, warn};

use shared_store::CollectionStore;

use crate::models::{
    Appointment, AppointmentStats, AppointmentStatus, AppointmentType,
};

/// Appointment lifecycle owner: conflict detection, slot generation,
/// cancellation and reschedule rules.
///
/// The engine holds the whole collection in memory and flushes it to the
/// store after every mutation. It takes no locks itself; callers must
/// serialize access (the API wraps it in a single `RwLock`), which is what
/// makes the scan-then-insert conflict check sound.
pub struct SchedulingEngine {
    store: Box<dyn CollectionStore<Appointment>>,
    appointments: HashMap<String, Appointment>,
    open_hour: u32,
    close_hour: u32,
}

const SLOT_STRIDE_MINUTES: i64 = 30;

impl SchedulingEngine {
    pub fn new(store: Box<dyn CollectionStore<Appointment>>) -> Self {
        Self::with_office_hours(store, 9, 17)
    }

    pub fn with_office_hours(
        store: Box<dyn CollectionStore<Appointment>>,
        open_hour: u32,
        close_hour: u32,
    ) -> Self {
        let appointments = store.load_all();
        info!("Loaded {} appointments", appointments.len());
        Self {
            store,
            appointments,
            open_hour,
            close_hour,
        }
    }

    fn flush(&self) {
        // Best-effort: a failed save leaves memory ahead of disk.
        self.store.save_all(&self.appointments);
    }

    fn next_id(&self) -> String {
        format!("A{:04}", self.appointments.len() + 1)
    }

    /// Conflict rule: intervals overlap and the dentists are not known to
    /// differ. An appointment with no dentist assigned blocks every
    /// dentist's calendar for its interval.
    fn has_conflict(
        &self,
        start: DateTime<Utc>,
        duration_minutes: i64,
        dentist_id: Option<&str>,
        exclude_id: Option<&str>,
    ) -> bool {
        let end = start + Duration::minutes(duration_minutes);

        self.appointments.values().any(|existing| {
            if exclude_id == Some(existing.appointment_id.as_str()) {
                return false;
            }
            if !existing.status.is_active() {
                return false;
            }
            if let (Some(requested), Some(assigned)) = (dentist_id, existing.dentist_id.as_deref())
            {
                if requested != assigned {
                    return false;
                }
            }
            existing.overlaps(start, end)
        })
    }

    // ==========================================================================
    // MUTATIONS
    // ==========================================================================

    /// Create an appointment, rejecting any slot that conflicts with an
    /// active appointment. Returns `None` with no side effect on conflict.
    pub fn create(
        &mut self,
        patient_id: String,
        appointment_type: AppointmentType,
        scheduled_date: DateTime<Utc>,
        duration_minutes: i64,
        dentist_id: Option<String>,
        notes: String,
    ) -> Option<Appointment> {
        if self.has_conflict(
            scheduled_date,
            duration_minutes,
            dentist_id.as_deref(),
            None,
        ) {
            warn!(
                "Rejected booking for patient {} at {}: slot conflict",
                patient_id, scheduled_date
            );
            return None;
        }

        let appointment = Appointment::new(
            self.next_id(),
            patient_id,
            appointment_type,
            scheduled_date,
            duration_minutes,
            dentist_id,
            notes,
        );

        info!(
            "Created appointment {} at {}",
            appointment.appointment_id, appointment.scheduled_date
        );
        self.appointments
            .insert(appointment.appointment_id.clone(), appointment.clone());
        self.flush();
        Some(appointment)
    }

    /// Move an appointment to a new start, keeping its duration and dentist.
    /// The appointment itself is excluded from the conflict scan.
    pub fn reschedule(&mut self, appointment_id: &str, new_start: DateTime<Utc>) -> bool {
        let (duration, dentist) = match self.appointments.get(appointment_id) {
            Some(a) => (a.duration_minutes, a.dentist_id.clone()),
            None => return false,
        };

        if self.has_conflict(new_start, duration, dentist.as_deref(), Some(appointment_id)) {
            debug!(
                "Reschedule of {} to {} rejected: slot conflict",
                appointment_id, new_start
            );
            return false;
        }

        let appointment = self
            .appointments
            .get_mut(appointment_id)
            .expect("checked above");
        appointment.scheduled_date = new_start;
        appointment.updated_at = Utc::now();
        self.flush();
        true
    }

    /// Cancel, allowed only more than 24 hours before the scheduled start.
    pub fn cancel(&mut self, appointment_id: &str, reason: &str) -> bool {
        let Some(appointment) = self.appointments.get_mut(appointment_id) else {
            return false;
        };
        if !appointment.can_be_cancelled() {
            debug!(
                "Cancel of {} rejected: inside 24-hour window",
                appointment_id
            );
            return false;
        }

        appointment.update_status(AppointmentStatus::Cancelled);
        if reason.is_empty() {
            appointment.notes.push_str("\nCancelled");
        } else {
            appointment.notes.push_str(&format!("\nCancelled: {reason}"));
        }
        self.flush();
        true
    }

    /// Unconditional status overwrite. No transition table is enforced, so
    /// `completed -> scheduled` goes through; callers that care must check.
    pub fn update_status(&mut self, appointment_id: &str, new_status: AppointmentStatus) -> bool {
        let Some(appointment) = self.appointments.get_mut(appointment_id) else {
            return false;
        };
        appointment.update_status(new_status);
        self.flush();
        true
    }

    pub fn set_notes(&mut self, appointment_id: &str, notes: String) -> bool {
        let Some(appointment) = self.appointments.get_mut(appointment_id) else {
            return false;
        };
        appointment.notes = notes;
        appointment.updated_at = Utc::now();
        self.flush();
        true
    }

    pub fn add_treatment_note(
        &mut self,
        appointment_id: &str,
        note: String,
        dentist_id: String,
    ) -> bool {
        let Some(appointment) = self.appointments.get_mut(appointment_id) else {
            return false;
        };
        appointment.add_treatment_note(note, dentist_id);
        self.flush();
        true
    }

    pub fn add_reminder_sent(&mut self, appointment_id: &str, reminder_type: String) -> bool {
        let Some(appointment) = self.appointments.get_mut(appointment_id) else {
            return false;
        };
        appointment.add_reminder_sent(reminder_type);
        self.flush();
        true
    }

    // ==========================================================================
    // SLOT GENERATION
    // ==========================================================================

    /// Candidate start times for a date: 30-minute stride from opening,
    /// emitted when the whole interval fits the window and does not
    /// conflict with any active appointment. Chronological by construction.
    pub fn available_slots(
        &self,
        date: NaiveDate,
        duration_minutes: i64,
        dentist_id: Option<&str>,
    ) -> Vec<DateTime<Utc>> {
        let Some(window_start) = date.and_hms_opt(self.open_hour, 0, 0) else {
            return Vec::new();
        };
        let Some(window_end) = date.and_hms_opt(self.close_hour, 0, 0) else {
            return Vec::new();
        };
        let window_start = window_start.and_utc();
        let window_end = window_end.and_utc();

        let mut slots = Vec::new();
        let mut candidate = window_start;
        while candidate + Duration::minutes(duration_minutes) <= window_end {
            if !self.has_conflict(candidate, duration_minutes, dentist_id, None) {
                slots.push(candidate);
            }
            candidate += Duration::minutes(SLOT_STRIDE_MINUTES);
        }
        slots
    }

    // ==========================================================================
    // QUERIES
    // ==========================================================================

    pub fn get(&self, appointment_id: &str) -> Option<&Appointment> {
        self.appointments.get(appointment_id)
    }

    pub fn all(&self) -> Vec<Appointment> {
        let mut all: Vec<_> = self.appointments.values().cloned().collect();
        all.sort_by(|a, b| a.appointment_id.cmp(&b.appointment_id));
        all
    }

    pub fn by_patient(&self, patient_id: &str) -> Vec<Appointment> {
        self.filtered(|a| a.patient_id == patient_id)
    }

    pub fn by_dentist(&self, dentist_id: &str) -> Vec<Appointment> {
        self.filtered(|a| a.dentist_id.as_deref() == Some(dentist_id))
    }

    pub fn by_date(&self, date: NaiveDate) -> Vec<Appointment> {
        self.filtered(|a| a.scheduled_date.date_naive() == date)
    }

    pub fn by_status(&self, status: AppointmentStatus) -> Vec<Appointment> {
        self.filtered(|a| a.status == status)
    }

    /// Open appointments starting within `(now, now + hours]`.
    pub fn upcoming(&self, hours: i64) -> Vec<Appointment> {
        self.filtered(|a| a.status.is_open() && a.is_upcoming(hours))
    }

    /// Open appointments whose start has passed without a status update.
    /// A data-quality signal, not an automatic transition.
    pub fn overdue(&self) -> Vec<Appointment> {
        let now = Utc::now();
        self.filtered(|a| a.status.is_open() && a.scheduled_date < now)
    }

    pub fn statistics(&self) -> AppointmentStats {
        let mut status_distribution = BTreeMap::new();
        for status in AppointmentStatus::all() {
            status_distribution.insert(status.to_string(), self.by_status(status).len());
        }

        let mut type_distribution = BTreeMap::new();
        for kind in AppointmentType::all() {
            let count = self
                .appointments
                .values()
                .filter(|a| a.appointment_type == kind)
                .count();
            type_distribution.insert(kind.to_string(), count);
        }

        AppointmentStats {
            total_appointments: self.appointments.len(),
            status_distribution,
            type_distribution,
            upcoming_appointments: self.upcoming(24).len(),
            overdue_appointments: self.overdue().len(),
        }
    }

    fn filtered(&self, keep: impl Fn(&Appointment) -> bool) -> Vec<Appointment> {
        let mut matches: Vec<_> = self
            .appointments
            .values()
            .filter(|a| keep(a))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.scheduled_date.cmp(&b.scheduled_date));
        matches
    }
}
