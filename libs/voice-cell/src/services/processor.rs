use regex::Regex;
use tracing::debug;

use crate::models::{Intent, UrgencyLevel, VoiceEntities, VoiceQueryResult};

/// Speech-to-text collaborator contract: a lowercase transcript, or `None`
/// on listen timeout, unintelligible audio, or recognizer error.
pub trait Transcriber: Send + Sync {
    fn transcribe(&self) -> Option<String>;
}

const APPOINTMENT_KEYWORDS: &[&str] = &["appointment", "schedule", "book", "reschedule", "cancel"];
const INSURANCE_KEYWORDS: &[&str] = &["insurance", "coverage", "provider", "policy"];
const SERVICE_KEYWORDS: &[&str] = &["cleaning", "filling", "whitening", "checkup", "emergency"];

const INSURANCE_PROVIDERS: &[&str] = &[
    "delta dental",
    "aetna",
    "cigna",
    "blue cross",
    "metlife",
    "unitedhealthcare",
];

const URGENCY_WORDS: &[&str] = &["severe", "bad", "terrible", "excruciating", "unbearable"];

/// Rule-based intent resolution over a fixed regex taxonomy. Stateless
/// beyond the compiled pattern tables.
pub struct VoiceProcessor {
    intents: Vec<(Intent, Vec<Regex>)>,
    date_patterns: Vec<Regex>,
}

impl VoiceProcessor {
    pub fn new() -> Self {
        let compile = |patterns: &[&str]| -> Vec<Regex> {
            patterns
                .iter()
                .map(|p| Regex::new(p).expect("intent pattern compiles"))
                .collect()
        };

        // First-match-wins over this declaration order.
        let intents = vec![
            (
                Intent::ScheduleAppointment,
                compile(&[
                    r"(schedule|book|make)\s+(an?\s+)?appointment",
                    r"(want|need)\s+(to\s+)?(schedule|book)\s+(an?\s+)?appointment",
                    r"appointment\s+(for|on)\s+(\w+)",
                    r"(when|what)\s+(time|day)\s+(are|do)\s+(you|they)\s+(have|available)",
                ]),
            ),
            (
                Intent::CheckAvailability,
                compile(&[
                    r"(available|open|free)\s+(time|slot|appointment)",
                    r"(what|when)\s+(are|do)\s+(you|they)\s+(have|available)",
                    r"(next|upcoming)\s+(available|open)\s+(time|slot)",
                ]),
            ),
            (
                Intent::InsuranceInquiry,
                compile(&[
                    r"(accept|take|work\s+with)\s+(insurance|coverage)",
                    r"(what|which)\s+(insurance|provider)\s+(do\s+you|are\s+accepted)",
                    r"(my|the)\s+(insurance|provider)\s+(is|are)",
                    r"(coverage|benefits)\s+(for|of)",
                ]),
            ),
            (
                Intent::ServiceInquiry,
                compile(&[
                    r"(what|which)\s+(services|treatments)\s+(do\s+you|are\s+offered)",
                    r"(cost|price|how\s+much)\s+(for|is)\s+(\w+)",
                    r"(cleaning|filling|whitening|checkup)\s+(cost|price)",
                ]),
            ),
            (
                Intent::OfficeHours,
                compile(&[
                    r"(what|when)\s+(are|do)\s+(you|they)\s+(open|close)",
                    r"(hours|schedule)\s+(of\s+operation)?",
                    r"(open|closed)\s+(on|during)",
                ]),
            ),
            (
                Intent::Emergency,
                compile(&[
                    r"(emergency|urgent|pain|hurt)",
                    r"(broken|cracked|chipped)\s+(tooth|teeth)",
                    r"(severe|bad|terrible)\s+(pain|ache)",
                ]),
            ),
        ];

        let date_patterns = compile(&[
            r"(today|tomorrow|next\s+\w+)",
            r"(\d{1,2})[/-](\d{1,2})[/-](\d{2,4})",
            r"(monday|tuesday|wednesday|thursday|friday|saturday|sunday)",
            r"(morning|afternoon|evening|night)",
        ]);

        Self {
            intents,
            date_patterns,
        }
    }

    /// Resolve an utterance to an intent and its entities. The first
    /// pattern of the first intent to match wins; anything unmatched falls
    /// back to a general inquiry carrying the raw text.
    pub fn extract_intent(&self, text: &str) -> (Intent, VoiceEntities) {
        let text = text.to_lowercase();
        let text = text.trim();

        for (intent, patterns) in &self.intents {
            if patterns.iter().any(|p| p.is_match(text)) {
                debug!("Resolved \"{}\" to intent {}", text, intent);
                return (*intent, self.extract_entities(text, *intent));
            }
        }

        (
            Intent::GeneralInquiry,
            VoiceEntities {
                query: Some(text.to_string()),
                ..Default::default()
            },
        )
    }

    pub fn extract_entities(&self, text: &str, intent: Intent) -> VoiceEntities {
        let mut entities = VoiceEntities {
            original_text: Some(text.to_string()),
            ..Default::default()
        };

        match intent {
            Intent::ScheduleAppointment => {
                entities.preferred_time = self
                    .date_patterns
                    .iter()
                    .find_map(|p| p.find(text))
                    .map(|m| m.as_str().to_string());
                entities.service_type = first_contained(text, SERVICE_KEYWORDS);
            }
            Intent::InsuranceInquiry => {
                entities.insurance_provider = first_contained(text, INSURANCE_PROVIDERS);
            }
            Intent::ServiceInquiry => {
                entities.service_type = first_contained(text, SERVICE_KEYWORDS);
            }
            Intent::Emergency => {
                // Always populated for emergencies, unlike the other fields.
                entities.urgency_level = Some(if URGENCY_WORDS.iter().any(|w| text.contains(w)) {
                    UrgencyLevel::High
                } else {
                    UrgencyLevel::Medium
                });
            }
            _ => {}
        }

        entities
    }

    /// Canned per-intent responses. The exact phrasing is part of the
    /// observable contract for the voice front end.
    pub fn generate_response(&self, intent: Intent, entities: &VoiceEntities) -> String {
        match intent {
            Intent::ScheduleAppointment => {
                let service = entities.service_type.as_deref().unwrap_or("appointment");
                let mut response =
                    format!("I'd be happy to help you schedule a {service} appointment.");
                if let Some(time) = &entities.preferred_time {
                    response.push_str(&format!(" You mentioned {time}. "));
                }
                response.push_str(
                    "Let me check our available slots. What's your preferred date and time?",
                );
                response
            }
            Intent::CheckAvailability => {
                "I can check our available appointment slots for you. What date are you looking for?"
                    .to_string()
            }
            Intent::InsuranceInquiry => match &entities.insurance_provider {
                Some(provider) => format!(
                    "Yes, we do accept {provider} insurance. Would you like me to check your specific coverage?"
                ),
                None => "We accept most major insurance providers including Delta Dental, Aetna, Cigna, Blue Cross Blue Shield, MetLife, and UnitedHealthcare. Which provider do you have?"
                    .to_string(),
            },
            Intent::ServiceInquiry => match &entities.service_type {
                Some(service) => format!(
                    "For {service}, our prices typically range from $100 to $500 depending on the specific treatment needed. Would you like me to schedule a consultation to get a more accurate estimate?"
                ),
                None => "We offer a wide range of dental services including cleanings, fillings, root canals, teeth whitening, and emergency care. Which service are you interested in?"
                    .to_string(),
            },
            Intent::OfficeHours => {
                "Our office hours are Monday through Friday 8 AM to 6 PM, Saturday 9 AM to 3 PM, and we're closed on Sundays. We also offer emergency appointments outside of regular hours."
                    .to_string()
            }
            Intent::Emergency => match entities.urgency_level {
                Some(UrgencyLevel::High) => {
                    "I understand this is an emergency. Please call our emergency line at (555) 123-4567 immediately, or if it's after hours, call (555) 999-8888 for urgent dental care."
                        .to_string()
                }
                _ => "I can help you schedule an emergency appointment. How soon do you need to be seen?"
                    .to_string(),
            },
            Intent::GeneralInquiry => {
                let query = entities.query.as_deref().unwrap_or("");
                if APPOINTMENT_KEYWORDS.iter().any(|k| query.contains(k)) {
                    "I can help you with appointment scheduling. Would you like to book an appointment?"
                        .to_string()
                } else if INSURANCE_KEYWORDS.iter().any(|k| query.contains(k)) {
                    "I can help you with insurance questions. What would you like to know about your coverage?"
                        .to_string()
                } else {
                    "I'm here to help with your dental care needs. How can I assist you today?"
                        .to_string()
                }
            }
        }
    }

    /// Full pipeline for one utterance. `None` means no transcript was
    /// obtained, which yields a failure result with a fixed apology.
    pub fn process(&self, text: Option<&str>) -> VoiceQueryResult {
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            return VoiceQueryResult {
                success: false,
                original_text: None,
                intent: None,
                entities: None,
                error: Some("No speech detected".to_string()),
                response: "I didn't catch that. Could you please repeat?".to_string(),
            };
        };

        let (intent, entities) = self.extract_intent(text);
        let response = self.generate_response(intent, &entities);

        VoiceQueryResult {
            success: true,
            original_text: Some(text.to_string()),
            intent: Some(intent),
            entities: Some(entities),
            error: None,
            response,
        }
    }

    /// Same pipeline, fed from the speech-to-text collaborator.
    pub fn process_from(&self, transcriber: &dyn Transcriber) -> VoiceQueryResult {
        let transcript = transcriber.transcribe();
        self.process(transcript.as_deref())
    }
}

impl Default for VoiceProcessor {
    fn default() -> Self {
        Self::new()
    }
}

fn first_contained(text: &str, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .find(|candidate| text.contains(*candidate))
        .map(|candidate| candidate.to_string())
}
