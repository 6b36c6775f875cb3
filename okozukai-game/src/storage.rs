//! Persistence backends for the single running campaign.
use std::cell::RefCell;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

use crate::constants::SAVE_FILE_NAME;
use crate::snapshot::CampaignSnapshot;

/// Storage for one campaign slot.
pub trait CampaignStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist the snapshot, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn save(&self, snapshot: &CampaignSnapshot) -> Result<(), Self::Error>;

    /// Load the stored snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if stored data exists but cannot be read.
    fn load(&self) -> Result<Option<CampaignSnapshot>, Self::Error>;

    /// Remove the stored snapshot. Clearing an empty slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored data cannot be removed.
    fn clear(&self) -> Result<(), Self::Error>;
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("save file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("save file {path} is not a valid snapshot: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// In-memory slot; clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<Option<CampaignSnapshot>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slot.borrow().is_none()
    }
}

impl CampaignStorage for MemoryStorage {
    type Error = Infallible;

    fn save(&self, snapshot: &CampaignSnapshot) -> Result<(), Self::Error> {
        *self.slot.borrow_mut() = Some(snapshot.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<CampaignSnapshot>, Self::Error> {
        Ok(self.slot.borrow().clone())
    }

    fn clear(&self) -> Result<(), Self::Error> {
        self.slot.borrow_mut().take();
        Ok(())
    }
}

/// JSON save file on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Save file named `okozukai.save.json` inside `dir`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(SAVE_FILE_NAME))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CampaignStorage for FileStorage {
    type Error = StorageError;

    fn save(&self, snapshot: &CampaignSnapshot) -> Result<(), Self::Error> {
        let json = snapshot.to_json().map_err(|source| StorageError::Json {
            path: self.path.clone(),
            source,
        })?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }

    fn load(&self) -> Result<Option<CampaignSnapshot>, Self::Error> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        CampaignSnapshot::from_json(&json)
            .map(Some)
            .map_err(|source| StorageError::Json {
                path: self.path.clone(),
                source,
            })
    }

    fn clear(&self) -> Result<(), Self::Error> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::CampaignController;
    use crate::config::GameConfig;
    use crate::data::Catalog;
    use crate::plan::CampaignPlan;
    use std::sync::Arc;

    fn snapshot() -> CampaignSnapshot {
        let catalog = Arc::new(Catalog::load_from_static().unwrap());
        let goal = catalog.goals[0].clone();
        let mut ctl = CampaignController::seeded(GameConfig::default(), catalog, 11);
        ctl.start_campaign(&CampaignPlan::new(goal)).unwrap();
        ctl.snapshot().unwrap()
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("okozukai-storage-{}-{name}", std::process::id()))
            .join(SAVE_FILE_NAME)
    }

    #[test]
    fn memory_storage_shares_slot_between_clones() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.save(&snapshot()).unwrap();
        assert!(!other.is_empty());
        other.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn file_storage_roundtrips_and_clears() {
        let path = temp_path("roundtrip");
        let storage = FileStorage::new(&path);
        assert!(storage.load().unwrap().is_none());

        let snap = snapshot();
        storage.save(&snap).unwrap();
        assert_eq!(storage.load().unwrap(), Some(snap));

        storage.clear().unwrap();
        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn corrupt_save_is_reported() {
        let path = temp_path("corrupt");
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).unwrap();
        }
        std::fs::write(&path, "{ not json").unwrap();
        let err = FileStorage::new(&path).load().unwrap_err();
        assert!(matches!(err, StorageError::Json { .. }));
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
