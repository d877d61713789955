//! Collaborator seams: preview, submission, storage, notification.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{PreviewError, StoreError, SubmitError};
use crate::notify::Notification;
use crate::preview::SheetPreview;
use crate::selection::WireRange;

/// Supplies sheet extents and preview cells for a file.
pub trait PreviewSource {
    fn preview(&self, file_key: &str, sheet_index: usize) -> Result<SheetPreview, PreviewError>;
}

/// Sends a validated range to the parse service. Called once per confirmation.
/// The returned payload is opaque to the core and handed back to the caller.
pub trait RangeSubmitter {
    fn submit(&self, range: &WireRange) -> Result<serde_json::Value, SubmitError>;
}

impl<T: RangeSubmitter + ?Sized> RangeSubmitter for &T {
    fn submit(&self, range: &WireRange) -> Result<serde_json::Value, SubmitError> {
        (**self).submit(range)
    }
}

/// String key/value store, shaped like browser session storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Notifier that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// In-process store. Lives as long as the value, like a browser session.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("k"), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);

        store.remove("k").unwrap();
        assert_eq!(store.get("k"), None);
    }
}
