// Persisted user preferences. Only the dark mode flag exists today.

use crate::error::{Result, UnicodeFixError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DARK_MODE_KEY: &str = "darkMode";

/// Boolean key-value store. Missing keys read as `false`.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> bool;
    fn set(&mut self, key: &str, value: bool) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryPreferenceStore {
    values: BTreeMap<String, bool>,
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> bool {
        self.values.get(key).copied().unwrap_or(false)
    }

    fn set(&mut self, key: &str, value: bool) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Preferences kept as a flat JSON object on disk. The file is read once
/// when opened; every `set` rewrites it.
#[derive(Debug, Clone)]
pub struct JsonPreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, bool>,
}

impl JsonPreferenceStore {
    /// Open the store. A missing file is an empty store; a corrupt one is an
    /// error so it is not silently overwritten.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).map_err(|e| {
                UnicodeFixError::Storage(format!("{}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), "preferences loaded");
        Ok(JsonPreferenceStore { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn get(&self, key: &str) -> bool {
        self.values.get(key).copied().unwrap_or(false)
    }

    fn set(&mut self, key: &str, value: bool) -> Result<()> {
        self.values.insert(key.to_string(), value);
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&self.values)?)?;
        Ok(())
    }
}
