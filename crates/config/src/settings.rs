// Application settings
// Loaded from ~/.config/sheetrange/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sheetrange_core::{RetryPolicy, StateOptions, StoreError, RETRYABLE_STATUSES, STORAGE_KEY_PREFIX};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Range editor
    #[serde(rename = "range.debounceMs")]
    pub debounce_ms: u64,

    #[serde(rename = "range.storageKeyPrefix")]
    pub storage_key_prefix: String,

    // Submission
    #[serde(rename = "retry.maxRetries")]
    pub max_retries: u32,

    #[serde(rename = "retry.delayMs")]
    pub retry_delay_ms: u64,

    // Store
    #[serde(rename = "store.path", skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            storage_key_prefix: STORAGE_KEY_PREFIX.to_string(),
            max_retries: 2,
            retry_delay_ms: 1000,
            store_path: None, // None = selections.json next to settings
        }
    }
}

impl Settings {
    /// Directory holding settings and the selection store
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sheetrange")
    }

    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("error parsing {}: {}; using default settings", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn state_options(&self) -> StateOptions {
        StateOptions {
            debounce: Duration::from_millis(self.debounce_ms),
            key_prefix: self.storage_key_prefix.clone(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            retryable_statuses: RETRYABLE_STATUSES.to_vec(),
        }
    }

    /// Selection store file: the `store.path` override, else the config dir
    pub fn store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("selections.json"))
    }
}
