//! Durable local storage for the in-progress session
//!
//! Two keys are kept: the serialized session and the current step index.
//! Both are written on every transition and read once on start-up.

use super::session::FormSession;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

pub const FORM_DATA_KEY: &str = "form_data";
pub const CURRENT_STEP_KEY: &str = "current_step";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("stored session is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// String key-value storage with session helpers layered on top
pub trait SessionStorage: Send + Sync {
    fn read_key(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write_key(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_key(&self, key: &str) -> Result<(), StorageError>;

    /// Restore the persisted session, if any.
    ///
    /// A readable step index key overrides the index embedded in the
    /// session document.
    fn load(&self) -> Result<Option<FormSession>, StorageError> {
        let Some(raw) = self.read_key(FORM_DATA_KEY)? else {
            return Ok(None);
        };
        let mut session: FormSession = serde_json::from_str(&raw)?;
        if let Some(step) = self
            .read_key(CURRENT_STEP_KEY)?
            .and_then(|s| s.trim().parse::<usize>().ok())
        {
            session.current_step_index = step;
        }
        Ok(Some(session))
    }

    fn save(&self, session: &FormSession) -> Result<(), StorageError> {
        let raw = serde_json::to_string(session)?;
        self.write_key(FORM_DATA_KEY, &raw)?;
        self.write_key(CURRENT_STEP_KEY, &session.current_step_index.to_string())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.remove_key(FORM_DATA_KEY)?;
        self.remove_key(CURRENT_STEP_KEY)
    }
}

/// One file per key inside a directory
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        match key {
            FORM_DATA_KEY => self.dir.join("form_data.json"),
            other => self.dir.join(other),
        }
    }
}

impl SessionStorage for FileSessionStore {
    fn read_key(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_key(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.key_path(key), value)?;
        Ok(())
    }

    fn remove_key(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage, used when no data directory is available
#[derive(Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, String>>,
}

impl SessionStorage for MemorySessionStore {
    fn read_key(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        Ok(values.get(key).cloned())
    }

    fn write_key(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_key(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowTrack;
    use pretty_assertions::assert_eq;

    fn sample_session() -> FormSession {
        FormSession {
            current_step_index: 4,
            furthest_step_index: 4,
            track: FlowTrack::DocumentUpload,
            tax_year: Some("2023-2024".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        store.save(&sample_session()).unwrap();

        let restored = store.load().unwrap().unwrap();
        assert_eq!(restored, sample_session());
        assert!(dir.path().join("form_data.json").exists());
        assert!(dir.path().join("current_step").exists());
    }

    #[test]
    fn test_file_store_empty_dir_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("missing"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        store.save(&sample_session()).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        assert!(store.read_key(CURRENT_STEP_KEY).unwrap().is_none());
        // clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_step_key_overrides_embedded_index() {
        let store = MemorySessionStore::default();
        store.save(&sample_session()).unwrap();
        store.write_key(CURRENT_STEP_KEY, "2").unwrap();
        assert_eq!(store.load().unwrap().unwrap().current_step_index, 2);
    }

    #[test]
    fn test_unparseable_step_key_is_ignored() {
        let store = MemorySessionStore::default();
        store.save(&sample_session()).unwrap();
        store.write_key(CURRENT_STEP_KEY, "four").unwrap();
        assert_eq!(store.load().unwrap().unwrap().current_step_index, 4);
    }

    #[test]
    fn test_corrupt_session_is_an_error() {
        let store = MemorySessionStore::default();
        store.write_key(FORM_DATA_KEY, "{not json").unwrap();
        assert!(matches!(store.load(), Err(StorageError::Corrupt(_))));
    }
}
