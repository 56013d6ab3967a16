//! Key-value persistence collaborators
//!
//! The client keeps state in three scopes, each a [`KeyValueStore`]:
//!
//! - session: access token and its expiry, gone when the process ends
//! - cookies: the refresh token, with an absolute max-age ([`CookieJar`])
//! - local: cached user and application snapshots that outlive the session
//!
//! Stores are synchronous. Implementations guard their maps with
//! `parking_lot` locks that are never held across an `.await`.

mod cookies;
mod file;
mod memory;

use std::fmt::Debug;
use std::path::PathBuf;

use log::warn;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

pub use cookies::CookieJar;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading the backing file failed
    #[error("Failed to read {path}")]
    ReadFailed {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Writing the backing file failed
    #[error("Failed to write {path}")]
    WriteFailed {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not a JSON object of strings
    #[error("Corrupted storage data in {path}")]
    CorruptedData {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be serialized
    #[error("Failed to encode value for key '{key}'")]
    EncodeFailed {
        /// Key being written
        key: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

/// String key-value store
pub trait KeyValueStore: Debug + Send + Sync {
    /// Value under `key`, if any
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`
    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete `key`; missing keys are not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read a JSON-encoded value; undecodable entries read as absent
pub fn get_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("[Storage] Ignoring undecodable entry '{}': {}", key, e);
            None
        }
    }
}

/// Store a value JSON-encoded
pub fn set_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::EncodeFailed {
        key: key.to_string(),
        source,
    })?;
    store.set(key, raw)
}
