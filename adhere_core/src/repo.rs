//! Generic record collections over a storage backend.
//!
//! Every entity collection is persisted as a flat JSON array under a fixed
//! key. Loads are parse-guarded: a missing key, unparseable JSON, or a
//! non-array value resets the collection to empty (logged, never surfaced).
//! Per-owner writes follow the merge-back discipline: re-read the full
//! collection, drop the owner's old records, splice in the replacement set,
//! and write the whole array back in one atomic step.

use crate::storage::Backend;
use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicI64, Ordering};

/// A persistable record with a string id
pub trait Record: Serialize + DeserializeOwned + Clone {
    fn id(&self) -> &str;
}

/// A record owned by a single user
pub trait Owned: Record {
    fn owner_id(&self) -> &str;
}

/// Typed view of one storage key holding a JSON array of records
pub struct Collection<T> {
    key: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> Collection<T> {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the full collection, treating any parse failure as empty
    pub fn load(&self, backend: &dyn Backend) -> Vec<T> {
        let raw = match backend.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read key {:?}: {}. Using empty.", self.key, e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Failed to parse key {:?}: {}. Using empty.", self.key, e);
                Vec::new()
            }
        }
    }

    /// Serialize and write the full collection back
    pub fn store(&self, backend: &dyn Backend, records: &[T]) -> Result<()> {
        let contents = serde_json::to_string(records)?;
        backend.write(&self.key, &contents)?;
        tracing::debug!("Stored {} records under {:?}", records.len(), self.key);
        Ok(())
    }

    /// Mutate one record by id across the whole collection.
    ///
    /// Returns the updated record, or None if no record matched. Used where a
    /// writer legitimately touches records it does not own (e.g. a clinician
    /// replying to a patient's ticket).
    pub fn update_by_id<F>(&self, backend: &dyn Backend, id: &str, f: F) -> Result<Option<T>>
    where
        F: FnOnce(&mut T),
    {
        let mut records = self.load(backend);

        let updated = match records.iter_mut().find(|r| r.id() == id) {
            Some(record) => {
                f(record);
                Some(record.clone())
            }
            None => None,
        };

        if updated.is_some() {
            self.store(backend, &records)?;
        }
        Ok(updated)
    }
}

impl<T: Owned> Collection<T> {
    /// Load only the records belonging to one owner
    pub fn for_owner(&self, backend: &dyn Backend, owner: &str) -> Vec<T> {
        self.load(backend)
            .into_iter()
            .filter(|r| r.owner_id() == owner)
            .collect()
    }

    /// Replace one owner's records, leaving everyone else's untouched
    pub fn replace_for_owner(
        &self,
        backend: &dyn Backend,
        owner: &str,
        records: &[T],
    ) -> Result<()> {
        let mut merged: Vec<T> = self
            .load(backend)
            .into_iter()
            .filter(|r| r.owner_id() != owner)
            .collect();
        merged.extend_from_slice(records);
        self.store(backend, &merged)
    }
}

static LAST_ID_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Generate a `"<prefix>_" + millis` record id.
///
/// The millis value is bumped monotonically per process so two creates in the
/// same millisecond cannot collide.
pub fn generate_id(prefix: &str) -> String {
    let now = chrono::Utc::now().timestamp_millis();
    let mut candidate = now;
    loop {
        let last = LAST_ID_MILLIS.load(Ordering::SeqCst);
        if candidate <= last {
            candidate = last + 1;
        }
        if LAST_ID_MILLIS
            .compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            return format!("{}_{}", prefix, candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use serde::Deserialize;
    use std::collections::HashSet;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: String,
        user_id: String,
        value: u32,
    }

    impl Record for Item {
        fn id(&self) -> &str {
            &self.id
        }
    }

    impl Owned for Item {
        fn owner_id(&self) -> &str {
            &self.user_id
        }
    }

    fn item(id: &str, user: &str, value: u32) -> Item {
        Item {
            id: id.into(),
            user_id: user.into(),
            value,
        }
    }

    #[test]
    fn test_store_then_load_roundtrip() {
        let backend = MemoryBackend::new();
        let coll = Collection::<Item>::new("items");

        coll.store(&backend, &[item("a", "u1", 1), item("b", "u1", 2)])
            .unwrap();

        let loaded = coll.load(&backend);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, "a");
    }

    #[test]
    fn test_parse_failure_resets_to_empty() {
        let backend = MemoryBackend::new();
        backend.write("items", "{ not an array }").unwrap();

        let coll = Collection::<Item>::new("items");
        assert!(coll.load(&backend).is_empty());
    }

    #[test]
    fn test_non_array_value_resets_to_empty() {
        let backend = MemoryBackend::new();
        backend.write("items", "{\"id\":\"a\"}").unwrap();

        let coll = Collection::<Item>::new("items");
        assert!(coll.load(&backend).is_empty());
    }

    #[test]
    fn test_replace_for_owner_preserves_other_users() {
        let backend = MemoryBackend::new();
        let coll = Collection::<Item>::new("items");

        coll.store(&backend, &[item("a", "u1", 1), item("b", "u2", 2)])
            .unwrap();

        coll.replace_for_owner(&backend, "u1", &[item("c", "u1", 3)])
            .unwrap();

        let all = coll.load(&backend);
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|i| i.id == "b" && i.user_id == "u2"));
        assert!(all.iter().any(|i| i.id == "c" && i.user_id == "u1"));
        assert!(!all.iter().any(|i| i.id == "a"));

        let mine = coll.for_owner(&backend, "u1");
        assert_eq!(mine, vec![item("c", "u1", 3)]);
    }

    #[test]
    fn test_update_by_id_touches_only_match() {
        let backend = MemoryBackend::new();
        let coll = Collection::<Item>::new("items");

        coll.store(&backend, &[item("a", "u1", 1), item("b", "u2", 2)])
            .unwrap();

        let updated = coll
            .update_by_id(&backend, "b", |i| i.value = 99)
            .unwrap()
            .unwrap();
        assert_eq!(updated.value, 99);

        let all = coll.load(&backend);
        assert_eq!(all.iter().find(|i| i.id == "a").unwrap().value, 1);
        assert_eq!(all.iter().find(|i| i.id == "b").unwrap().value, 99);
    }

    #[test]
    fn test_update_by_id_missing_returns_none() {
        let backend = MemoryBackend::new();
        let coll = Collection::<Item>::new("items");
        coll.store(&backend, &[item("a", "u1", 1)]).unwrap();

        let result = coll.update_by_id(&backend, "zzz", |i| i.value = 5).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_generate_id_is_unique_under_rapid_calls() {
        let ids: HashSet<String> = (0..200).map(|_| generate_id("med")).collect();
        assert_eq!(ids.len(), 200);
        assert!(ids.iter().all(|id| id.starts_with("med_")));
    }
}
