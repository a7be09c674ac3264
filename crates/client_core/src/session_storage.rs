use std::{
    collections::{BTreeMap, HashMap},
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum SessionStorageError {
    #[error("session storage io failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("session storage is not a JSON object: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("session storage lock poisoned")]
    Poisoned,
}

/// Key/value store with `localStorage` semantics.
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionStorageError>;
    fn remove_item(&self, key: &str) -> Result<(), SessionStorageError>;
}

#[derive(Default)]
pub struct MemorySessionStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        match self.items.lock() {
            Ok(items) => items.get(key).cloned(),
            Err(_) => {
                warn!(key, "session storage lock poisoned; reading as empty");
                None
            }
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionStorageError> {
        self.items
            .lock()
            .map_err(|_| SessionStorageError::Poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), SessionStorageError> {
        self.items
            .lock()
            .map_err(|_| SessionStorageError::Poisoned)?
            .remove(key);
        Ok(())
    }
}

/// Storage persisted as a flat JSON object in a single file.
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_items(&self) -> Result<BTreeMap<String, String>, SessionStorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(SessionStorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_items(&self, items: &BTreeMap<String, String>) -> Result<(), SessionStorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SessionStorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let raw = serde_json::to_string_pretty(items)?;
        fs::write(&self.path, raw).map_err(|source| SessionStorageError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl SessionStorage for FileSessionStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        match self.read_items() {
            Ok(mut items) => items.remove(key),
            Err(err) => {
                warn!(path = %self.path.display(), "unreadable session storage: {err}");
                None
            }
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionStorageError> {
        let mut items = match self.read_items() {
            Ok(items) => items,
            Err(err) => {
                warn!(path = %self.path.display(), "replacing unreadable session storage: {err}");
                BTreeMap::new()
            }
        };
        items.insert(key.to_string(), value.to_string());
        self.write_items(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), SessionStorageError> {
        let mut items = self.read_items()?;
        if items.remove(key).is_some() {
            self.write_items(&items)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/session_storage_tests.rs"]
mod tests;
