//! Per-user reminder scheduling rules.
//!
//! Reminders are created from a medication but live independently: deleting
//! the medication leaves its reminders queryable (orphaned by design).

use crate::repo::{generate_id, Collection, Owned, Record};
use crate::storage::Backend;
use crate::{Error, Reminder, Result};
use chrono::Utc;
use std::sync::Arc;

const REMINDERS_KEY: &str = "reminders";

impl Record for Reminder {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Owned for Reminder {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

/// Fields supplied when creating a reminder
#[derive(Clone, Debug)]
pub struct NewReminder {
    pub medication_id: String,
    pub medication_name: String,
    pub time: String,
    pub days: Vec<String>,
}

/// Owns scheduling rules for one user
pub struct ReminderStore {
    backend: Arc<dyn Backend>,
    user_id: String,
}

impl ReminderStore {
    pub fn new(backend: Arc<dyn Backend>, user_id: impl Into<String>) -> Self {
        Self {
            backend,
            user_id: user_id.into(),
        }
    }

    fn collection(&self) -> Collection<Reminder> {
        Collection::new(REMINDERS_KEY)
    }

    pub fn list(&self) -> Vec<Reminder> {
        self.collection()
            .for_owner(self.backend.as_ref(), &self.user_id)
    }

    pub fn add(&self, draft: NewReminder) -> Result<Reminder> {
        let reminder = Reminder {
            id: generate_id("rem"),
            user_id: self.user_id.clone(),
            medication_id: draft.medication_id,
            medication_name: draft.medication_name,
            time: draft.time,
            days: draft.days,
            is_enabled: true,
            snooze_minutes: None,
            last_triggered: None,
        };

        let mut mine = self.list();
        mine.push(reminder.clone());
        self.save(&mine)?;

        tracing::info!("Added reminder {} at {}", reminder.id, reminder.time);
        Ok(reminder)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let mut mine = self.list();
        let before = mine.len();
        mine.retain(|r| r.id != id);

        if mine.len() == before {
            return Err(Error::NotFound(format!("reminder {}", id)));
        }
        self.save(&mine)
    }

    /// Record a snooze: remember the duration and when it was triggered
    pub fn snooze(&self, id: &str, minutes: u32) -> Result<Reminder> {
        self.mutate(id, |r| {
            r.snooze_minutes = Some(minutes);
            r.last_triggered = Some(Utc::now());
        })
    }

    /// Flip the enabled flag
    pub fn toggle(&self, id: &str) -> Result<Reminder> {
        self.mutate(id, |r| r.is_enabled = !r.is_enabled)
    }

    fn mutate<F>(&self, id: &str, f: F) -> Result<Reminder>
    where
        F: FnOnce(&mut Reminder),
    {
        let mut mine = self.list();
        let reminder = mine
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("reminder {}", id)))?;
        f(reminder);
        let updated = reminder.clone();
        self.save(&mine)?;
        Ok(updated)
    }

    fn save(&self, records: &[Reminder]) -> Result<()> {
        self.collection()
            .replace_for_owner(self.backend.as_ref(), &self.user_id, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medication::{MedicationStore, NewMedication};
    use crate::storage::MemoryBackend;

    fn reminder_draft(med_id: &str) -> NewReminder {
        NewReminder {
            medication_id: med_id.into(),
            medication_name: "Aspirin".into(),
            time: "08:00".into(),
            days: vec!["mon".into(), "wed".into(), "fri".into()],
        }
    }

    #[test]
    fn test_add_enables_by_default() {
        let store = ReminderStore::new(Arc::new(MemoryBackend::new()), "u1");
        let reminder = store.add(reminder_draft("med_1")).unwrap();

        assert!(reminder.id.starts_with("rem_"));
        assert!(reminder.is_enabled);
        assert!(reminder.snooze_minutes.is_none());
    }

    #[test]
    fn test_toggle_flips_enabled() {
        let store = ReminderStore::new(Arc::new(MemoryBackend::new()), "u1");
        let reminder = store.add(reminder_draft("med_1")).unwrap();

        assert!(!store.toggle(&reminder.id).unwrap().is_enabled);
        assert!(store.toggle(&reminder.id).unwrap().is_enabled);
    }

    #[test]
    fn test_snooze_records_trigger_time() {
        let store = ReminderStore::new(Arc::new(MemoryBackend::new()), "u1");
        let reminder = store.add(reminder_draft("med_1")).unwrap();

        let snoozed = store.snooze(&reminder.id, 15).unwrap();
        assert_eq!(snoozed.snooze_minutes, Some(15));
        assert!(snoozed.last_triggered.is_some());
    }

    #[test]
    fn test_reminders_survive_medication_delete() {
        let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
        let meds = MedicationStore::new(backend.clone(), "u1");
        let reminders = ReminderStore::new(backend.clone(), "u1");

        let med = meds
            .add(NewMedication {
                name: "Aspirin".into(),
                dosage: "81mg".into(),
                frequency: "daily".into(),
                schedule: "08:00".into(),
                start_date: "2026-01-01".into(),
                end_date: None,
                notes: None,
                color: None,
                interactions: vec![],
            })
            .unwrap();
        let reminder = reminders.add(reminder_draft(&med.id)).unwrap();

        meds.delete(&med.id).unwrap();

        // No cascade: the reminder is orphaned but still queryable
        let remaining = reminders.list();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, reminder.id);
        assert_eq!(remaining[0].medication_id, med.id);
        assert!(meds.get(&med.id).is_none());
    }
}
