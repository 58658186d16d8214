use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub appointment_id: String,
    pub patient_id: String,
    pub appointment_type: AppointmentType,
    pub scheduled_date: DateTime<Utc>,
    pub duration_minutes: i64,
    pub dentist_id: Option<String>,
    pub notes: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reminders_sent: Vec<ReminderRecord>,
    pub treatment_notes: Vec<TreatmentNote>,
}

impl Appointment {
    pub fn new(
        appointment_id: String,
        patient_id: String,
        appointment_type: AppointmentType,
        scheduled_date: DateTime<Utc>,
        duration_minutes: i64,
        dentist_id: Option<String>,
        notes: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            appointment_id,
            patient_id,
            appointment_type,
            scheduled_date,
            duration_minutes,
            dentist_id,
            notes,
            status: AppointmentStatus::Scheduled,
            created_at: now,
            updated_at: now,
            reminders_sent: Vec::new(),
            treatment_notes: Vec::new(),
        }
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.scheduled_date + Duration::minutes(self.duration_minutes)
    }

    /// Half-open interval overlap: [start, end) against [start, end).
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.scheduled_date < end && self.end_time() > start
    }

    pub fn update_status(&mut self, new_status: AppointmentStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }

    pub fn add_treatment_note(&mut self, note: String, dentist_id: String) {
        self.treatment_notes.push(TreatmentNote {
            note,
            dentist_id,
            timestamp: Utc::now(),
        });
        self.updated_at = Utc::now();
    }

    pub fn add_reminder_sent(&mut self, reminder_type: String) {
        self.reminders_sent.push(ReminderRecord {
            reminder_type,
            sent_at: Utc::now(),
        });
    }

    pub fn is_upcoming(&self, hours: i64) -> bool {
        let now = Utc::now();
        self.scheduled_date > now && self.scheduled_date <= now + Duration::hours(hours)
    }

    /// Cancellable only while more than 24 hours out.
    pub fn can_be_cancelled(&self) -> bool {
        self.scheduled_date > Utc::now() + Duration::hours(24)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreatmentNote {
    pub note: String,
    pub dentist_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderRecord {
    pub reminder_type: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Active appointments participate in conflict detection.
    pub fn is_active(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled | AppointmentStatus::NoShow)
    }

    /// Still waiting to happen: counted by upcoming/overdue listings.
    pub fn is_open(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::Confirmed)
    }

    pub fn all() -> [AppointmentStatus; 6] {
        [
            AppointmentStatus::Scheduled,
            AppointmentStatus::Confirmed,
            AppointmentStatus::InProgress,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow,
        ]
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    Consultation,
    Cleaning,
    Filling,
    RootCanal,
    Extraction,
    Whitening,
    Implant,
    Emergency,
    FollowUp,
}

impl AppointmentType {
    pub fn all() -> [AppointmentType; 9] {
        [
            AppointmentType::Consultation,
            AppointmentType::Cleaning,
            AppointmentType::Filling,
            AppointmentType::RootCanal,
            AppointmentType::Extraction,
            AppointmentType::Whitening,
            AppointmentType::Implant,
            AppointmentType::Emergency,
            AppointmentType::FollowUp,
        ]
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::Consultation => write!(f, "consultation"),
            AppointmentType::Cleaning => write!(f, "cleaning"),
            AppointmentType::Filling => write!(f, "filling"),
            AppointmentType::RootCanal => write!(f, "root_canal"),
            AppointmentType::Extraction => write!(f, "extraction"),
            AppointmentType::Whitening => write!(f, "whitening"),
            AppointmentType::Implant => write!(f, "implant"),
            AppointmentType::Emergency => write!(f, "emergency"),
            AppointmentType::FollowUp => write!(f, "follow_up"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

fn default_duration() -> i64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: String,
    pub appointment_type: AppointmentType,
    pub scheduled_date: DateTime<Utc>,
    #[serde(default = "default_duration")]
    pub duration_minutes: i64,
    pub dentist_id: Option<String>,
    #[serde(default)]
    pub notes: String,
}

/// Field-whitelist update. Unknown fields are rejected at deserialization
/// rather than reflected onto the appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateAppointmentRequest {
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
    pub reschedule_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreatmentNoteRequest {
    pub note: String,
    pub dentist_id: String,
}

// ==============================================================================
// STATISTICS MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentStats {
    pub total_appointments: usize,
    pub status_distribution: std::collections::BTreeMap<String, usize>,
    pub type_distribution: std::collections::BTreeMap<String, usize>,
    pub upcoming_appointments: usize,
    pub overdue_appointments: usize,
}
