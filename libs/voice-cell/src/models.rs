use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of utterance intents. Declaration order matters: the resolver
/// tries pattern tables in exactly this sequence and the first match wins,
/// so the order is part of the public contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    ScheduleAppointment,
    CheckAvailability,
    InsuranceInquiry,
    ServiceInquiry,
    OfficeHours,
    Emergency,
    GeneralInquiry,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::ScheduleAppointment => write!(f, "schedule_appointment"),
            Intent::CheckAvailability => write!(f, "check_availability"),
            Intent::InsuranceInquiry => write!(f, "insurance_inquiry"),
            Intent::ServiceInquiry => write!(f, "service_inquiry"),
            Intent::OfficeHours => write!(f, "office_hours"),
            Intent::Emergency => write!(f, "emergency"),
            Intent::GeneralInquiry => write!(f, "general_inquiry"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    High,
    Medium,
}

/// Structured values pulled out of an utterance in support of its intent.
/// `original_text` accompanies every pattern-matched intent; the
/// `general_inquiry` fallback carries the raw text as `query` instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VoiceEntities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency_level: Option<UrgencyLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceQueryRequest {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceQueryResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<VoiceEntities>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub response: String,
}
