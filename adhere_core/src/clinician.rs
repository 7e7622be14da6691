//! Clinician-facing patient roster, timeline events and notes.
//!
//! These collections are globally shared (not per-user) and are only
//! readable from a clinician-role session. On first access the roster is
//! seeded from fixed demo data, matching the original system's demo feed.

use crate::repo::{generate_id, Collection, Record};
use crate::storage::Backend;
use crate::{
    ClinicianNote, Error, NoteCategory, PatientEvent, PatientEventKind, PatientProfile, Result,
    RiskLevel, User, UserRole,
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

const PATIENTS_KEY: &str = "patients";
const EVENTS_KEY: &str = "events";
const NOTES_KEY: &str = "notes";

impl Record for PatientProfile {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for PatientEvent {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for ClinicianNote {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Fields supplied when attaching a note to a patient
#[derive(Clone, Debug)]
pub struct NewNote {
    pub patient_id: String,
    pub note: String,
    pub category: NoteCategory,
}

/// Owns the patient roster for clinician-role sessions
pub struct ClinicianStore {
    backend: Arc<dyn Backend>,
    user: User,
    seed_demo_data: bool,
}

impl ClinicianStore {
    pub fn new(backend: Arc<dyn Backend>, user: User, seed_demo_data: bool) -> Self {
        Self {
            backend,
            user,
            seed_demo_data,
        }
    }

    fn is_clinician(&self) -> bool {
        self.user.role == UserRole::Clinician
    }

    fn patient_collection(&self) -> Collection<PatientProfile> {
        Collection::new(PATIENTS_KEY)
    }

    fn event_collection(&self) -> Collection<PatientEvent> {
        Collection::new(EVENTS_KEY)
    }

    fn note_collection(&self) -> Collection<ClinicianNote> {
        Collection::new(NOTES_KEY)
    }

    /// The patient roster. Empty for non-clinician sessions.
    pub fn patients(&self) -> Vec<PatientProfile> {
        if !self.is_clinician() {
            return Vec::new();
        }
        if let Err(e) = self.ensure_seeded() {
            tracing::warn!("Failed to seed demo roster: {}", e);
        }
        self.patient_collection().load(self.backend.as_ref())
    }

    /// Timeline events for one patient, newest first
    pub fn patient_events(&self, patient_id: &str) -> Vec<PatientEvent> {
        if !self.is_clinician() {
            return Vec::new();
        }
        if let Err(e) = self.ensure_seeded() {
            tracing::warn!("Failed to seed demo roster: {}", e);
        }
        let mut events: Vec<PatientEvent> = self
            .event_collection()
            .load(self.backend.as_ref())
            .into_iter()
            .filter(|e| e.patient_id == patient_id)
            .collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events
    }

    /// Notes for one patient, newest first
    pub fn patient_notes(&self, patient_id: &str) -> Vec<ClinicianNote> {
        if !self.is_clinician() {
            return Vec::new();
        }
        let mut notes: Vec<ClinicianNote> = self
            .note_collection()
            .load(self.backend.as_ref())
            .into_iter()
            .filter(|n| n.patient_id == patient_id)
            .collect();
        notes.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        notes
    }

    /// Attach a note to a patient and fan it out to their timeline
    pub fn add_note(&self, draft: NewNote) -> Result<ClinicianNote> {
        if !self.is_clinician() {
            return Err(Error::Auth("Clinician role required".into()));
        }

        let note = ClinicianNote {
            id: generate_id("note"),
            patient_id: draft.patient_id.clone(),
            clinician_id: self.user.id.clone(),
            clinician_name: self.user.name.clone(),
            note: draft.note,
            timestamp: Utc::now(),
            category: draft.category,
        };

        let collection = self.note_collection();
        let mut notes = collection.load(self.backend.as_ref());
        notes.insert(0, note.clone());
        collection.store(self.backend.as_ref(), &notes)?;

        // Timeline entry with the note text truncated to 50 chars
        let mut summary: String = note.note.chars().take(50).collect();
        if note.note.chars().count() > 50 {
            summary.push_str("...");
        }
        let event = PatientEvent {
            id: generate_id("event"),
            patient_id: draft.patient_id,
            kind: PatientEventKind::ClinicianNote,
            timestamp: note.timestamp,
            details: format!("Dr. {} added note: {}", self.user.name, summary),
        };

        let events_collection = self.event_collection();
        let mut events = events_collection.load(self.backend.as_ref());
        events.insert(0, event);
        events_collection.store(self.backend.as_ref(), &events)?;

        tracing::info!("Added note {} for patient {}", note.id, note.patient_id);
        Ok(note)
    }

    pub fn update_patient_risk(
        &self,
        patient_id: &str,
        risk_level: RiskLevel,
    ) -> Result<PatientProfile> {
        if !self.is_clinician() {
            return Err(Error::Auth("Clinician role required".into()));
        }

        self.patient_collection()
            .update_by_id(self.backend.as_ref(), patient_id, |p| {
                p.risk_level = risk_level;
            })?
            .ok_or_else(|| Error::NotFound(format!("patient {}", patient_id)))
    }

    fn ensure_seeded(&self) -> Result<()> {
        if !self.seed_demo_data {
            return Ok(());
        }

        let now = Utc::now();
        if self.backend.read(PATIENTS_KEY)?.is_none() {
            self.patient_collection()
                .store(self.backend.as_ref(), &demo_patients(now))?;
            tracing::info!("Seeded demo patient roster");
        }
        if self.backend.read(EVENTS_KEY)?.is_none() {
            self.event_collection()
                .store(self.backend.as_ref(), &demo_events(now))?;
            tracing::info!("Seeded demo patient events");
        }
        Ok(())
    }
}

/// Fixed demo roster, timestamped relative to `now`
fn demo_patients(now: DateTime<Utc>) -> Vec<PatientProfile> {
    vec![
        PatientProfile {
            id: "patient_001".into(),
            name: "John Doe".into(),
            age: 45,
            email: "john.doe@example.com".into(),
            phone: "(555) 123-4567".into(),
            medication_count: 3,
            adherence_rate: 65,
            last_active: now - Duration::hours(2),
            risk_level: RiskLevel::High,
            conditions: vec!["Hypertension".into(), "Type 2 Diabetes".into()],
            assigned_clinician: Some("Dr. Emily Chen".into()),
        },
        PatientProfile {
            id: "patient_002".into(),
            name: "Sarah Smith".into(),
            age: 62,
            email: "sarah.smith@example.com".into(),
            phone: "(555) 234-5678".into(),
            medication_count: 5,
            adherence_rate: 88,
            last_active: now - Duration::hours(4),
            risk_level: RiskLevel::Medium,
            conditions: vec!["Heart Disease".into(), "High Cholesterol".into()],
            assigned_clinician: Some("Dr. Emily Chen".into()),
        },
        PatientProfile {
            id: "patient_003".into(),
            name: "Alex Johnson".into(),
            age: 38,
            email: "alex.j@example.com".into(),
            phone: "(555) 345-6789".into(),
            medication_count: 2,
            adherence_rate: 96,
            last_active: now - Duration::days(1),
            risk_level: RiskLevel::Low,
            conditions: vec!["Hypothyroidism".into()],
            assigned_clinician: Some("Dr. Emily Chen".into()),
        },
        PatientProfile {
            id: "patient_004".into(),
            name: "Maria Garcia".into(),
            age: 55,
            email: "maria.g@example.com".into(),
            phone: "(555) 456-7890".into(),
            medication_count: 4,
            adherence_rate: 92,
            last_active: now - Duration::hours(6),
            risk_level: RiskLevel::Low,
            conditions: vec!["Asthma".into(), "Allergies".into()],
            assigned_clinician: Some("Dr. Emily Chen".into()),
        },
    ]
}

fn demo_events(now: DateTime<Utc>) -> Vec<PatientEvent> {
    vec![
        PatientEvent {
            id: "event_001".into(),
            patient_id: "patient_001".into(),
            kind: PatientEventKind::MedMissed,
            timestamp: now - Duration::hours(2),
            details: "Missed Lisinopril 10mg dose at 8:00 AM".into(),
        },
        PatientEvent {
            id: "event_002".into(),
            patient_id: "patient_001".into(),
            kind: PatientEventKind::MedMissed,
            timestamp: now - Duration::hours(26),
            details: "Missed Metformin 500mg dose at 7:00 PM".into(),
        },
        PatientEvent {
            id: "event_003".into(),
            patient_id: "patient_002".into(),
            kind: PatientEventKind::SymptomReport,
            timestamp: now - Duration::hours(4),
            details: "Reported mild dizziness".into(),
        },
        PatientEvent {
            id: "event_004".into(),
            patient_id: "patient_002".into(),
            kind: PatientEventKind::MedTaken,
            timestamp: now - Duration::hours(5),
            details: "Took Atorvastatin 20mg".into(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    fn clinician_user() -> User {
        User {
            id: "clin_1".into(),
            email: "chen@example.com".into(),
            name: "Emily Chen".into(),
            role: UserRole::Clinician,
            age: None,
            contact: None,
            emergency_contact: None,
            timezone: None,
            language: None,
        }
    }

    fn patient_user() -> User {
        User {
            role: UserRole::Patient,
            ..clinician_user()
        }
    }

    fn store(user: User) -> ClinicianStore {
        ClinicianStore::new(Arc::new(MemoryBackend::new()), user, true)
    }

    #[test]
    fn test_roster_seeds_once_for_clinician() {
        let store = store(clinician_user());
        let patients = store.patients();
        assert_eq!(patients.len(), 4);
        assert_eq!(patients[0].id, "patient_001");

        // A second read does not re-seed or duplicate
        assert_eq!(store.patients().len(), 4);
    }

    #[test]
    fn test_non_clinician_sees_nothing() {
        let store = store(patient_user());
        assert!(store.patients().is_empty());
        assert!(store.patient_events("patient_001").is_empty());
    }

    #[test]
    fn test_seeding_can_be_disabled() {
        let store = ClinicianStore::new(Arc::new(MemoryBackend::new()), clinician_user(), false);
        assert!(store.patients().is_empty());
    }

    #[test]
    fn test_patient_events_sorted_newest_first() {
        let store = store(clinician_user());
        let events = store.patient_events("patient_001");
        assert_eq!(events.len(), 2);
        assert!(events[0].timestamp > events[1].timestamp);
    }

    #[test]
    fn test_add_note_appends_timeline_event() {
        let store = store(clinician_user());
        store.patients(); // seed

        let long_note = "Patient reports improved adherence after switching to the \
morning schedule; continue monitoring blood pressure weekly.";
        let note = store
            .add_note(NewNote {
                patient_id: "patient_002".into(),
                note: long_note.into(),
                category: NoteCategory::Observation,
            })
            .unwrap();

        assert_eq!(note.clinician_name, "Emily Chen");

        let notes = store.patient_notes("patient_002");
        assert_eq!(notes.len(), 1);

        let events = store.patient_events("patient_002");
        let note_event = events
            .iter()
            .find(|e| e.kind == PatientEventKind::ClinicianNote)
            .unwrap();
        assert!(note_event.details.starts_with("Dr. Emily Chen added note:"));
        assert!(note_event.details.ends_with("..."));
    }

    #[test]
    fn test_add_note_requires_clinician_role() {
        let store = store(patient_user());
        let err = store
            .add_note(NewNote {
                patient_id: "patient_001".into(),
                note: "nope".into(),
                category: NoteCategory::General,
            })
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn test_update_patient_risk() {
        let store = store(clinician_user());
        store.patients(); // seed

        let updated = store
            .update_patient_risk("patient_003", RiskLevel::Medium)
            .unwrap();
        assert_eq!(updated.risk_level, RiskLevel::Medium);

        let err = store
            .update_patient_risk("patient_999", RiskLevel::Low)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
