use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use sheetrange_core::{KeyValueStore, StoreError};

/// Key/value store backed by a single JSON object file.
///
/// Every write reads the file, applies the change and writes it back.
/// Concurrent writers race; the last one wins. A file that cannot be read
/// or parsed is treated as empty.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.read_entries().into_keys().collect()
    }

    fn read_entries(&self) -> BTreeMap<String, String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(_) => return BTreeMap::new(),
        };
        match serde_json::from_str(&contents) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("ignoring corrupt store {}: {}", self.path.display(), e);
                BTreeMap::new()
            }
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_entries().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read_entries();
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.read_entries();
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}
