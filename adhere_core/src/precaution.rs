//! Free-text safety notes attached to medications.
//!
//! Precautions are keyed by medication rather than user, and survive the
//! deletion of their medication (no cascade). An empty store is seeded with
//! one default precaution per existing medication.

use crate::repo::{generate_id, Collection, Record};
use crate::storage::Backend;
use crate::{AlertSeverity, Error, Medication, Precaution, PrecautionKind, Result};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use uuid::Uuid;

const PRECAUTIONS_KEY: &str = "precautions";

/// Seed set for medications with no recorded precautions
const DEFAULT_PRECAUTIONS: &[(PrecautionKind, &str, AlertSeverity)] = &[
    (
        PrecautionKind::Food,
        "Avoid grapefruit and grapefruit juice",
        AlertSeverity::High,
    ),
    (
        PrecautionKind::Activity,
        "May cause drowsiness, avoid driving",
        AlertSeverity::Medium,
    ),
    (
        PrecautionKind::Food,
        "Take with food to prevent stomach upset",
        AlertSeverity::Low,
    ),
    (
        PrecautionKind::Other,
        "Avoid prolonged sun exposure",
        AlertSeverity::Medium,
    ),
    (PrecautionKind::Food, "Avoid alcohol", AlertSeverity::High),
];

impl Record for Precaution {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Fields supplied when adding a precaution
#[derive(Clone, Debug)]
pub struct NewPrecaution {
    pub medication_id: String,
    pub medication_name: String,
    pub kind: PrecautionKind,
    pub description: String,
    pub severity: AlertSeverity,
}

/// Owns safety notes per medication
pub struct PrecautionStore {
    backend: Arc<dyn Backend>,
}

impl PrecautionStore {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    fn collection(&self) -> Collection<Precaution> {
        Collection::new(PRECAUTIONS_KEY)
    }

    pub fn list(&self) -> Vec<Precaution> {
        self.collection().load(self.backend.as_ref())
    }

    pub fn for_medication(&self, medication_id: &str) -> Vec<Precaution> {
        self.list()
            .into_iter()
            .filter(|p| p.medication_id == medication_id)
            .collect()
    }

    pub fn add(&self, draft: NewPrecaution) -> Result<Precaution> {
        let precaution = Precaution {
            id: precaution_id(),
            medication_id: draft.medication_id,
            medication_name: draft.medication_name,
            kind: draft.kind,
            description: draft.description,
            severity: draft.severity,
        };

        let mut all = self.list();
        all.push(precaution.clone());
        self.collection().store(self.backend.as_ref(), &all)?;
        Ok(precaution)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let mut all = self.list();
        let before = all.len();
        all.retain(|p| p.id != id);

        if all.len() == before {
            return Err(Error::NotFound(format!("precaution {}", id)));
        }
        self.collection().store(self.backend.as_ref(), &all)
    }

    /// Seed one default precaution per medication when nothing is stored yet.
    ///
    /// The default is picked by hashing the medication id, so the spread
    /// looks arbitrary but stays reproducible. Returns how many were seeded.
    pub fn seed_defaults(&self, medications: &[Medication]) -> Result<usize> {
        if self.backend.read(PRECAUTIONS_KEY)?.is_some() {
            return Ok(0);
        }

        let seeded: Vec<Precaution> = medications
            .iter()
            .map(|med| {
                let (kind, description, severity) =
                    DEFAULT_PRECAUTIONS[pick_index(&med.id, DEFAULT_PRECAUTIONS.len())];
                Precaution {
                    id: precaution_id(),
                    medication_id: med.id.clone(),
                    medication_name: med.name.clone(),
                    kind,
                    description: description.to_string(),
                    severity,
                }
            })
            .collect();

        if seeded.is_empty() {
            return Ok(0);
        }

        self.collection().store(self.backend.as_ref(), &seeded)?;
        tracing::info!("Seeded {} default precautions", seeded.len());
        Ok(seeded.len())
    }
}

fn pick_index(medication_id: &str, len: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    medication_id.hash(&mut hasher);
    (hasher.finish() as usize) % len
}

fn precaution_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}", generate_id("prec"), &suffix[..9])
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::storage::MemoryBackend;

    fn store() -> PrecautionStore {
        PrecautionStore::new(Arc::new(MemoryBackend::new()))
    }

    fn medication(id: &str, name: &str) -> Medication {
        Medication {
            id: id.into(),
            user_id: "u1".into(),
            name: name.into(),
            dosage: "10mg".into(),
            frequency: "daily".into(),
            schedule: "08:00".into(),
            start_date: "2026-01-01".into(),
            end_date: None,
            notes: None,
            color: "#3b82f6".into(),
            is_paused: false,
            interactions: vec![],
        }
    }

    fn draft(med_id: &str) -> NewPrecaution {
        NewPrecaution {
            medication_id: med_id.into(),
            medication_name: "Warfarin".into(),
            kind: PrecautionKind::Food,
            description: "Keep vitamin K intake consistent".into(),
            severity: AlertSeverity::High,
        }
    }

    #[test]
    fn test_add_and_filter_by_medication() {
        let store = store();
        store.add(draft("med_1")).unwrap();
        store.add(draft("med_2")).unwrap();

        assert_eq!(store.for_medication("med_1").len(), 1);
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn test_delete() {
        let store = store();
        let p = store.add(draft("med_1")).unwrap();
        store.delete(&p.id).unwrap();
        assert!(store.list().is_empty());

        assert!(matches!(store.delete(&p.id), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_seed_one_default_per_medication() {
        let store = store();
        let meds = vec![
            medication("med_1", "Aspirin"),
            medication("med_2", "Metformin"),
        ];

        let seeded = store.seed_defaults(&meds).unwrap();
        assert_eq!(seeded, 2);

        assert_eq!(store.for_medication("med_1").len(), 1);
        assert_eq!(store.for_medication("med_2").len(), 1);
    }

    #[test]
    fn test_seed_is_deterministic() {
        let a = store();
        let b = store();
        let meds = vec![medication("med_1", "Aspirin")];

        a.seed_defaults(&meds).unwrap();
        b.seed_defaults(&meds).unwrap();

        assert_eq!(
            a.for_medication("med_1")[0].description,
            b.for_medication("med_1")[0].description
        );
    }

    #[test]
    fn test_seed_skipped_when_key_exists() {
        let store = store();
        store.add(draft("med_1")).unwrap();

        let seeded = store
            .seed_defaults(&[medication("med_2", "Metformin")])
            .unwrap();
        assert_eq!(seeded, 0);
        assert!(store.for_medication("med_2").is_empty());
    }

    #[test]
    fn test_precautions_survive_without_medication() {
        // Precautions are not cascade-deleted; the store never checks that
        // the referenced medication still exists.
        let store = store();
        let p = store.add(draft("med_gone")).unwrap();
        assert_eq!(store.for_medication("med_gone"), vec![p]);
    }
}
