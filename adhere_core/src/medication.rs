//! Per-user medication records.

use crate::repo::{generate_id, Collection, Owned, Record};
use crate::storage::Backend;
use crate::{Error, Medication, Result};
use std::sync::Arc;

const MEDICATIONS_KEY: &str = "medications";
const DEFAULT_COLOR: &str = "#3b82f6";

/// Common medication names offered for autocomplete
pub const COMMON_MEDICATIONS: &[&str] = &[
    "Aspirin",
    "Ibuprofen",
    "Acetaminophen",
    "Amoxicillin",
    "Lisinopril",
    "Metformin",
    "Atorvastatin",
    "Levothyroxine",
    "Omeprazole",
    "Warfarin",
    "Gabapentin",
    "Losartan",
    "Metoprolol",
    "Sertraline",
    "Simvastatin",
];

impl Record for Medication {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Owned for Medication {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

/// Fields supplied when creating a medication
#[derive(Clone, Debug)]
pub struct NewMedication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub schedule: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub notes: Option<String>,
    pub color: Option<String>,
    pub interactions: Vec<String>,
}

/// Partial medication update (shallow merge)
#[derive(Clone, Debug, Default)]
pub struct MedicationPatch {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub schedule: Option<String>,
    pub end_date: Option<String>,
    pub notes: Option<String>,
    pub color: Option<String>,
    pub is_paused: Option<bool>,
}

/// Owns medication records for one user
pub struct MedicationStore {
    backend: Arc<dyn Backend>,
    user_id: String,
}

impl MedicationStore {
    pub fn new(backend: Arc<dyn Backend>, user_id: impl Into<String>) -> Self {
        Self {
            backend,
            user_id: user_id.into(),
        }
    }

    fn collection(&self) -> Collection<Medication> {
        Collection::new(MEDICATIONS_KEY)
    }

    pub fn list(&self) -> Vec<Medication> {
        self.collection()
            .for_owner(self.backend.as_ref(), &self.user_id)
    }

    pub fn get(&self, id: &str) -> Option<Medication> {
        self.list().into_iter().find(|m| m.id == id)
    }

    pub fn add(&self, draft: NewMedication) -> Result<Medication> {
        let medication = Medication {
            id: generate_id("med"),
            user_id: self.user_id.clone(),
            name: draft.name,
            dosage: draft.dosage,
            frequency: draft.frequency,
            schedule: draft.schedule,
            start_date: draft.start_date,
            end_date: draft.end_date,
            notes: draft.notes,
            color: draft.color.unwrap_or_else(|| DEFAULT_COLOR.into()),
            is_paused: false,
            interactions: draft.interactions,
        };

        let mut mine = self.list();
        mine.push(medication.clone());
        self.save(&mine)?;

        tracing::info!("Added medication {} ({})", medication.name, medication.id);
        Ok(medication)
    }

    pub fn update(&self, id: &str, patch: MedicationPatch) -> Result<Medication> {
        let mut mine = self.list();
        let medication = mine
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| Error::NotFound(format!("medication {}", id)))?;

        if let Some(name) = patch.name {
            medication.name = name;
        }
        if let Some(dosage) = patch.dosage {
            medication.dosage = dosage;
        }
        if let Some(frequency) = patch.frequency {
            medication.frequency = frequency;
        }
        if let Some(schedule) = patch.schedule {
            medication.schedule = schedule;
        }
        if let Some(end_date) = patch.end_date {
            medication.end_date = Some(end_date);
        }
        if let Some(notes) = patch.notes {
            medication.notes = Some(notes);
        }
        if let Some(color) = patch.color {
            medication.color = color;
        }
        if let Some(is_paused) = patch.is_paused {
            medication.is_paused = is_paused;
        }

        let updated = medication.clone();
        self.save(&mine)?;
        Ok(updated)
    }

    /// Delete a medication. Reminders and precautions referencing it are
    /// deliberately left in place (no cascade).
    pub fn delete(&self, id: &str) -> Result<()> {
        let mut mine = self.list();
        let before = mine.len();
        mine.retain(|m| m.id != id);

        if mine.len() == before {
            return Err(Error::NotFound(format!("medication {}", id)));
        }

        self.save(&mine)?;
        tracing::info!("Deleted medication {}", id);
        Ok(())
    }

    pub fn pause(&self, id: &str) -> Result<Medication> {
        self.update(
            id,
            MedicationPatch {
                is_paused: Some(true),
                ..Default::default()
            },
        )
    }

    pub fn resume(&self, id: &str) -> Result<Medication> {
        self.update(
            id,
            MedicationPatch {
                is_paused: Some(false),
                ..Default::default()
            },
        )
    }

    fn save(&self, records: &[Medication]) -> Result<()> {
        self.collection()
            .replace_for_owner(self.backend.as_ref(), &self.user_id, records)
    }
}
