use std::collections::BTreeMap;

/// Completion flags keyed by item id. Absent means not completed.
pub type ProgressMap = BTreeMap<String, bool>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A single key-value slot holding the whole progress mapping.
pub trait ProgressStorage {
    /// Reads the persisted mapping. `Ok(None)` when nothing was saved yet.
    fn load(&self) -> Result<Option<ProgressMap>, StorageError>;

    /// Overwrites the slot with the full mapping.
    fn save(&self, progress: &ProgressMap) -> Result<(), StorageError>;
}

pub struct ProgressStore<S> {
    storage: S,
    completed: ProgressMap,
}

impl<S: ProgressStorage> ProgressStore<S> {
    /// Loads the persisted mapping; anything unreadable starts empty.
    pub fn load(storage: S) -> Self {
        let completed = match storage.load() {
            Ok(Some(map)) => map,
            Ok(None) => ProgressMap::new(),
            Err(e) => {
                log::warn!("Discarding unreadable progress: {e}");
                ProgressMap::new()
            }
        };

        log::debug!("Loaded {} progress entries", completed.len());
        Self { storage, completed }
    }

    pub fn toggle(&mut self, item_id: &str) {
        let entry = self.completed.entry(item_id.to_string()).or_insert(false);
        *entry = !*entry;
        log::debug!("Item '{item_id}' completed = {}", *entry);
        self.persist();
    }

    /// Clears every completion flag. The caller is responsible for confirming first.
    pub fn reset(&mut self) {
        self.completed.clear();
        log::info!("Progress reset");
        self.persist();
    }

    /// Replaces the whole mapping, e.g. from an imported file.
    pub fn replace(&mut self, progress: ProgressMap) {
        self.completed = progress;
        self.persist();
    }

    pub fn is_checked(&self, item_id: &str) -> bool {
        self.completed.get(item_id).copied().unwrap_or(false)
    }

    pub fn completed_count(&self) -> usize {
        self.completed.values().filter(|done| **done).count()
    }

    /// `round(100 * completed / total)`, clamped to 0..=100.
    pub fn percent(&self, total_items: usize) -> u8 {
        if total_items == 0 {
            return 0;
        }
        let ratio = self.completed_count() as f64 / total_items as f64;
        (ratio * 100.0).round().min(100.0) as u8
    }

    pub fn mapping(&self) -> &ProgressMap {
        &self.completed
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.completed) {
            log::warn!("Failed to persist progress: {e}");
        }
    }
}
