//! Key-value storage backends.
//!
//! Every store in this crate persists whole collections under a fixed string
//! key. The backend is injected so tests run against an in-memory map while
//! the binaries use per-key JSON files with file locking and atomic writes.

use crate::{Error, Result};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Injected storage backend: whole-value reads and writes per key.
///
/// A write replaces the key's entire value in one step, so the
/// read-merge-write cycle in [`crate::repo::Collection`] never leaves a key
/// half-updated.
pub trait Backend: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, contents: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory backend for tests
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| Error::Storage("memory backend poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, contents: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| Error::Storage("memory backend poisoned".into()))?;
        entries.insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| Error::Storage("memory backend poisoned".into()))?;
        entries.remove(key);
        Ok(())
    }
}

/// File-per-key backend with shared-lock reads and atomic writes.
///
/// Each key maps to `<data_dir>/<key>.json`. Writes go through a locked temp
/// file in the same directory that is fsynced and renamed over the original.
pub struct FileBackend {
    data_dir: PathBuf,
}

impl FileBackend {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }
}

impl Backend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open {:?}: {}. Treating as absent.", path, e);
                return Ok(None);
            }
        };

        // Shared lock so a concurrent writer cannot rename mid-read
        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock {:?}: {}. Treating as absent.", path, e);
            return Ok(None);
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read_result = reader.read_to_string(&mut contents);
        file.unlock()?;

        match read_result {
            Ok(_) => Ok(Some(contents)),
            Err(e) => {
                tracing::warn!("Failed to read {:?}: {}. Treating as absent.", path, e);
                Ok(None)
            }
        }
    }

    fn write(&self, key: &str, contents: &str) -> Result<()> {
        let path = self.key_path(key);
        std::fs::create_dir_all(&self.data_dir)?;

        // Unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(&self.data_dir)?;

        // Exclusive lock on the temp file serializes concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote key {:?} to {:?}", key, path);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed key {:?}", key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend_roundtrip() {
        let backend = MemoryBackend::new();
        assert!(backend.read("missing").unwrap().is_none());

        backend.write("users", "[1,2,3]").unwrap();
        assert_eq!(backend.read("users").unwrap().unwrap(), "[1,2,3]");

        backend.remove("users").unwrap();
        assert!(backend.read("users").unwrap().is_none());
    }

    #[test]
    fn test_file_backend_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(temp_dir.path());

        assert!(backend.read("medications").unwrap().is_none());

        backend.write("medications", "[]").unwrap();
        assert_eq!(backend.read("medications").unwrap().unwrap(), "[]");
        assert!(temp_dir.path().join("medications.json").exists());
    }

    #[test]
    fn test_file_backend_overwrite_is_atomic() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(temp_dir.path());

        backend.write("tickets", "first").unwrap();
        backend.write("tickets", "second").unwrap();
        assert_eq!(backend.read("tickets").unwrap().unwrap(), "second");

        // No stray temp files remain after the rename
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "tickets.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only tickets.json, found extras: {:?}",
            extras
        );
    }

    #[test]
    fn test_file_backend_remove_missing_is_ok() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(temp_dir.path());
        backend.remove("nonexistent").unwrap();
    }

    #[test]
    fn test_file_backend_creates_data_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("deeper").join("data");
        let backend = FileBackend::new(&nested);

        backend.write("notifications", "[]").unwrap();
        assert!(nested.join("notifications.json").exists());
    }
}
