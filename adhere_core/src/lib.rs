#![forbid(unsafe_code)]

//! Core domain model and business logic for the Dosetrack adherence system.
//!
//! This crate provides:
//! - Domain types (users, medications, reminders, symptoms, tickets, alerts)
//! - Repository stores over an injected storage backend
//! - Gamification streak engine and achievement rules
//! - Static medicine-precautions reference dataset
//! - Persistence (key-value backends, dose journal, CSV export)

pub mod types;
pub mod error;
pub mod storage;
pub mod repo;
pub mod config;
pub mod logging;
pub mod identity;
pub mod medication;
pub mod reminder;
pub mod symptom;
pub mod notification;
pub mod clinician;
pub mod gamification;
pub mod precaution;
pub mod reference;
pub mod journal;
pub mod onboarding;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use storage::{Backend, FileBackend, MemoryBackend};
pub use config::Config;
pub use identity::{IdentityStore, ProfilePatch};
pub use medication::{MedicationPatch, MedicationStore, NewMedication, COMMON_MEDICATIONS};
pub use reminder::{NewReminder, ReminderStore};
pub use symptom::{NewSymptom, NewTicket, SymptomStore, COMMON_SYMPTOMS};
pub use notification::{NewNotification, NotificationStore};
pub use clinician::{ClinicianStore, NewNote};
pub use gamification::{earned_achievements, DoseOutcome, GamificationStore, ACHIEVEMENTS};
pub use precaution::{NewPrecaution, PrecautionStore};
pub use reference::{interactions_between, lookup_medicine, reference_data, MedicineRecord};
pub use journal::{EventSink, JsonlJournal};
pub use onboarding::OnboardingStore;
