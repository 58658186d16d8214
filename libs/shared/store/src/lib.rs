//! Flat-file persistence collaborator.
//!
//! Every entity collection lives in one JSON file, keyed by id, read in full
//! at service startup and rewritten in full after every mutation. Saves are
//! best-effort: an I/O failure is logged and swallowed, and the in-memory
//! state already applied is not rolled back. Callers own serialization of
//! access; the store itself takes no locks.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

/// Whole-collection load/save seam between the domain services and disk.
pub trait CollectionStore<T>: Send + Sync {
    /// Load the full collection. Missing or unreadable data yields an empty
    /// map; a corrupt file is reported but never panics the caller.
    fn load_all(&self) -> HashMap<String, T>;

    /// Persist the full collection, best-effort.
    fn save_all(&self, items: &HashMap<String, T>);
}

/// One JSON file per collection, pretty-printed for hand inspection.
pub struct JsonFileStore<T> {
    path: PathBuf,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Convenience for the per-entity layout `<data_dir>/<name>.json`.
    pub fn in_dir(data_dir: impl AsRef<Path>, collection: &str) -> Self {
        Self::new(data_dir.as_ref().join(format!("{collection}.json")))
    }
}

impl<T> CollectionStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn load_all(&self) -> HashMap<String, T> {
        if !self.path.exists() {
            debug!("Store file {} does not exist yet", self.path.display());
            return HashMap::new();
        }

        match fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(items) => items,
                Err(e) => {
                    error!("Error loading {}: {}", self.path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) => {
                error!("Error reading {}: {}", self.path.display(), e);
                HashMap::new()
            }
        }
    }

    fn save_all(&self, items: &HashMap<String, T>) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Error creating {}: {}", parent.display(), e);
                return;
            }
        }

        let payload = match serde_json::to_string_pretty(items) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Error serializing {}: {}", self.path.display(), e);
                return;
            }
        };

        if let Err(e) = fs::write(&self.path, payload) {
            // In-memory state stays ahead of disk until the next good save.
            error!("Error saving {}: {}", self.path.display(), e);
        }
    }
}

/// In-memory store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore<T> {
    items: Mutex<HashMap<String, T>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> CollectionStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync,
{
    fn load_all(&self) -> HashMap<String, T> {
        match self.items.lock() {
            Ok(items) => items.clone(),
            Err(_) => {
                warn!("Memory store mutex poisoned, returning empty collection");
                HashMap::new()
            }
        }
    }

    fn save_all(&self, items: &HashMap<String, T>) {
        if let Ok(mut guard) = self.items.lock() {
            *guard = items.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
        count: u32,
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonFileStore<Record> = JsonFileStore::in_dir(dir.path(), "records");
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonFileStore<Record> = JsonFileStore::in_dir(dir.path(), "records");

        let mut items = HashMap::new();
        items.insert(
            "R0001".to_string(),
            Record {
                name: "drill".to_string(),
                count: 3,
            },
        );
        store.save_all(&items);

        let loaded = store.load_all();
        assert_eq!(loaded, items);
    }

    #[test]
    fn corrupt_file_loads_empty_instead_of_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, "{not json").unwrap();

        let store: JsonFileStore<Record> = JsonFileStore::new(&path);
        assert!(store.load_all().is_empty());
    }
}
