use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::StorageError;
use crate::progression::ProgressionState;

/// Where a [`crate::ProgressionStore`] keeps its state between sessions.
pub trait ProgressStorage {
    /// `Ok(None)` means nothing has been saved yet.
    fn load(&mut self) -> Result<Option<ProgressionState>, StorageError>;

    fn save(&mut self, state: &ProgressionState) -> Result<(), StorageError>;
}

/// In-process storage, used by tests and by callers that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    saved: Option<ProgressionState>,
    saves: usize,
    unavailable: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: ProgressionState) -> Self {
        Self {
            saved: Some(state),
            ..Self::default()
        }
    }

    /// Storage that rejects every save until [`MemoryStorage::set_available`] is called.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn set_available(&mut self, available: bool) {
        self.unavailable = !available;
    }

    pub fn saved(&self) -> Option<&ProgressionState> {
        self.saved.as_ref()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl ProgressStorage for MemoryStorage {
    fn load(&mut self) -> Result<Option<ProgressionState>, StorageError> {
        Ok(self.saved.clone())
    }

    fn save(&mut self, state: &ProgressionState) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        self.saved = Some(state.clone());
        self.saves += 1;
        Ok(())
    }
}

/// Pretty JSON on disk. Saves go through a sibling temp file and a rename.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ProgressStorage for JsonFileStorage {
    fn load(&mut self) -> Result<Option<ProgressionState>, StorageError> {
        if !self.path.exists() {
            debug!(path = ?self.path, "[STORE] no save file yet");
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path).map_err(|source| StorageError::Read {
            path: self.path.clone(),
            source,
        })?;
        let state = serde_json::from_str(&text).map_err(|source| StorageError::Decode {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(state))
    }

    fn save(&mut self, state: &ProgressionState) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(state)?;
        let write_err = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let temp = self.temp_path();
        fs::write(&temp, json).map_err(write_err)?;
        fs::rename(&temp, &self.path).map_err(write_err)?;
        debug!(path = ?self.path, xp = state.xp_balance(), "[STORE] saved");
        Ok(())
    }
}
