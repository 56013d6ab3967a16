use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;

use super::{KeyValueStore, StorageError};

/// JSON-file backed store.
///
/// The whole map is rewritten on every mutation through a temporary file and a
/// rename, so a crash mid-write leaves the previous contents intact.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl FileStore {
    /// Open the store at `path`, loading existing contents if the file exists
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| {
                StorageError::ReadFailed {
                    path: path.clone(),
                    source,
                }
            })?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|source| {
                    StorageError::CorruptedData {
                        path: path.clone(),
                        source,
                    }
                })?
            }
        } else {
            BTreeMap::new()
        };

        debug!(
            "[FileStore] Opened {} with {} entries",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            entries: Arc::new(RwLock::new(entries)),
        })
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let write_err = |source| StorageError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let content = serde_json::to_string_pretty(entries).map_err(|source| {
            StorageError::EncodeFailed {
                key: self.path.display().to_string(),
                source,
            }
        })?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, content).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut entries = self.entries.write();
        entries.insert(key.to_string(), value);
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write();
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}
