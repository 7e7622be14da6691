//! Core domain types for the Dosetrack adherence system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Users, roles and session identity
//! - Medications, reminders and precautions
//! - Symptoms, advice tickets and their message threads
//! - Notifications and their acknowledgement state
//! - Clinician roster records and gamification state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Identity Types
// ============================================================================

/// Role of an account
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Patient,
    Caregiver,
    Clinician,
}

/// A user account (session copy, no password)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub age: Option<u8>,
    pub contact: Option<String>,
    pub emergency_contact: Option<String>,
    pub timezone: Option<String>,
    pub language: Option<String>,
}

/// Directory record for a user, including the stored password
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredUser {
    #[serde(flatten)]
    pub user: User,
    pub password: String,
}

// ============================================================================
// Medication and Reminder Types
// ============================================================================

/// A medication owned by a patient
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    /// Time-of-day string, e.g. "08:00"
    pub schedule: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub notes: Option<String>,
    pub color: String,
    pub is_paused: bool,
    pub interactions: Vec<String>,
}

/// A scheduling rule derived from a medication.
///
/// Reminders have an independent lifecycle: deleting the medication does NOT
/// delete its reminders, so a reminder may reference a medication id that no
/// longer resolves.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Reminder {
    pub id: String,
    pub user_id: String,
    pub medication_id: String,
    pub medication_name: String,
    pub time: String,
    /// Lowercase day abbreviations, e.g. ["mon", "wed", "fri"]
    pub days: Vec<String>,
    pub is_enabled: bool,
    pub snooze_minutes: Option<u32>,
    pub last_triggered: Option<DateTime<Utc>>,
}

// ============================================================================
// Symptom and Ticket Types
// ============================================================================

/// Reported symptom severity
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SymptomSeverity {
    Mild,
    Moderate,
    Severe,
}

/// Optional vital-sign readings attached to a symptom report
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct VitalSigns {
    pub temperature: Option<String>,
    pub blood_pressure: Option<String>,
    pub heart_rate: Option<String>,
}

/// A logged symptom (append-only, never edited or deleted)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Symptom {
    pub id: String,
    pub user_id: String,
    pub symptom_name: String,
    pub severity: SymptomSeverity,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub related_medications: Vec<String>,
    pub vital_signs: Option<VitalSigns>,
}

/// Lifecycle status of an advice ticket
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
}

/// Advice ticket priority
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
}

/// Who authored a ticket thread message
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageSender {
    Patient,
    Clinician,
    Ai,
}

/// One message in a ticket thread
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TicketMessage {
    pub id: String,
    pub sender: MessageSender,
    pub sender_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// A threaded patient-to-clinician advice request
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AdviceTicket {
    pub id: String,
    pub user_id: String,
    pub patient_name: String,
    pub subject: String,
    pub description: String,
    pub symptoms: Vec<String>,
    pub medications: Vec<String>,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub timestamp: DateTime<Utc>,
    pub clinician_response: Option<String>,
    pub ai_suggestion: Option<String>,
    pub thread: Vec<TicketMessage>,
}

// ============================================================================
// Notification Types
// ============================================================================

/// Kind of alert surfaced to a user
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Reminder,
    MissedDose,
    InteractionAlert,
    TriageEscalation,
    CaregiverRequest,
    DoctorAdvice,
    System,
}

/// Alert severity (drives which actions the UI offers)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

/// Structured references a notification may carry
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct NotificationMeta {
    pub medication_id: Option<String>,
    pub medication_name: Option<String>,
    pub caregiver_id: Option<String>,
    pub ticket_id: Option<String>,
}

/// An alert record.
///
/// `is_read` and `is_acknowledged` are independent flags, except that
/// acknowledging also marks the notification read (one-directional).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    pub is_acknowledged: bool,
    pub severity: AlertSeverity,
    pub action_url: Option<String>,
    pub metadata: Option<NotificationMeta>,
}

// ============================================================================
// Clinician Roster Types
// ============================================================================

/// Patient risk stratification
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Denormalized patient view for the clinician roster
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PatientProfile {
    pub id: String,
    pub name: String,
    pub age: u8,
    pub email: String,
    pub phone: String,
    pub medication_count: u32,
    pub adherence_rate: u8,
    pub last_active: DateTime<Utc>,
    pub risk_level: RiskLevel,
    pub conditions: Vec<String>,
    pub assigned_clinician: Option<String>,
}

/// Kind of event in a patient's timeline
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PatientEventKind {
    MedTaken,
    MedMissed,
    SymptomReport,
    AdviceRequest,
    ClinicianNote,
}

/// A timeline event for a patient
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PatientEvent {
    pub id: String,
    pub patient_id: String,
    pub kind: PatientEventKind,
    pub timestamp: DateTime<Utc>,
    pub details: String,
}

/// Category of a clinician note
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoteCategory {
    Observation,
    TreatmentPlan,
    FollowUp,
    General,
}

/// A free-text note a clinician attached to a patient
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClinicianNote {
    pub id: String,
    pub patient_id: String,
    pub clinician_id: String,
    pub clinician_name: String,
    pub note: String,
    pub timestamp: DateTime<Utc>,
    pub category: NoteCategory,
}

// ============================================================================
// Gamification Types
// ============================================================================

/// Consecutive-day dose streak state
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct StreakData {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_dose_date: Option<DateTime<Utc>>,
    pub total_doses_taken: u32,
}

/// An unlocked achievement
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub unlocked_at: DateTime<Utc>,
}

// ============================================================================
// Precaution Types
// ============================================================================

/// Category of a precaution note
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PrecautionKind {
    Food,
    Activity,
    Other,
}

/// A free-text safety note attached to a medication
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Precaution {
    pub id: String,
    pub medication_id: String,
    pub medication_name: String,
    pub kind: PrecautionKind,
    pub description: String,
    pub severity: AlertSeverity,
}

// ============================================================================
// Journal Types
// ============================================================================

/// A recorded dose-taken event (append-only journal line)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DoseEvent {
    pub id: Uuid,
    pub user_id: String,
    pub medication_id: Option<String>,
    pub medication_name: Option<String>,
    pub taken_at: DateTime<Utc>,
}

impl UserRole {
    /// Parse a role string as entered on the CLI
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "patient" => Some(UserRole::Patient),
            "caregiver" => Some(UserRole::Caregiver),
            "clinician" => Some(UserRole::Clinician),
            _ => None,
        }
    }
}

impl SymptomSeverity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mild" => Some(SymptomSeverity::Mild),
            "moderate" => Some(SymptomSeverity::Moderate),
            "severe" => Some(SymptomSeverity::Severe),
            _ => None,
        }
    }
}

impl TicketPriority {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(TicketPriority::Low),
            "medium" => Some(TicketPriority::Medium),
            "high" => Some(TicketPriority::High),
            _ => None,
        }
    }
}

impl AlertSeverity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(AlertSeverity::Low),
            "medium" => Some(AlertSeverity::Medium),
            "high" => Some(AlertSeverity::High),
            _ => None,
        }
    }
}

impl PrecautionKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "food" => Some(PrecautionKind::Food),
            "activity" => Some(PrecautionKind::Activity),
            "other" => Some(PrecautionKind::Other),
            _ => None,
        }
    }
}

impl RiskLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

impl NoteCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "observation" => Some(NoteCategory::Observation),
            "treatment_plan" => Some(NoteCategory::TreatmentPlan),
            "follow_up" => Some(NoteCategory::FollowUp),
            "general" => Some(NoteCategory::General),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&TicketStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            serde_json::from_str::<TicketStatus>("\"resolved\"").unwrap(),
            TicketStatus::Resolved
        );
    }

    #[test]
    fn test_notification_kind_wire_format() {
        assert_eq!(
            serde_json::to_string(&NotificationKind::MissedDose).unwrap(),
            "\"missed_dose\""
        );
        assert_eq!(
            serde_json::to_string(&NotificationKind::InteractionAlert).unwrap(),
            "\"interaction_alert\""
        );
    }

    #[test]
    fn test_stored_user_flattens_password() {
        let stored = StoredUser {
            user: User {
                id: "user_1".into(),
                email: "a@b.c".into(),
                name: "A".into(),
                role: UserRole::Patient,
                age: None,
                contact: None,
                emergency_contact: None,
                timezone: None,
                language: None,
            },
            password: "secret".into(),
        };

        let json = serde_json::to_string(&stored).unwrap();
        assert!(json.contains("\"password\":\"secret\""));
        assert!(json.contains("\"email\":\"a@b.c\""));

        let parsed: StoredUser = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.user.email, "a@b.c");
        assert_eq!(parsed.password, "secret");
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(UserRole::parse("Clinician"), Some(UserRole::Clinician));
        assert_eq!(UserRole::parse("PATIENT"), Some(UserRole::Patient));
        assert_eq!(UserRole::parse("admin"), None);
    }
}
