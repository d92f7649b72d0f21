use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::model::progress::{ProgressMap, ProgressStorage, StorageError};

/// Progress slot backed by one JSON file. Writes replace the file atomically.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/<storage_key>.json`
    pub fn in_dir(dir: &Path, storage_key: &str) -> Self {
        Self::new(dir.join(format!("{storage_key}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<ProgressMap>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, progress: &ProgressMap) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(progress)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Writes `progress` to an arbitrary file (export).
pub fn export_progress(path: &Path, progress: &ProgressMap) -> anyhow::Result<()> {
    JsonFileStorage::new(path).save(progress)?;
    Ok(())
}

/// Reads a progress file chosen by the user (import).
pub fn import_progress(path: &Path) -> anyhow::Result<ProgressMap> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
