//! Persistent key/value backends
//!
//! The persistent layer is a plain string-keyed store. Callers treat every
//! failure as a miss, so backends report errors instead of panicking and
//! never try to recover on their own.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors raised by a persistent backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the underlying file failed
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be serialized or parsed
    #[error("stored value is not valid JSON: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The backend is unusable (poisoned lock, disabled storage)
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A synchronous string-keyed store that may fail at any time
pub trait PersistentStore: Send + Sync + std::fmt::Debug {
    /// Returns the stored string, or `Ok(None)` if the key is absent
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Stores each key as a JSON file in a directory
///
/// Keys are escaped into file names so that `omdb:search:the matrix` and
/// `omdb_search_the_matrix` never collide.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`; the directory is created on first write
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", escape_key(key)))
    }
}

impl PersistentStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Longest escaped key used verbatim as a file name
const MAX_ESCAPED_LEN: usize = 200;

/// Bytes of the escaped key kept in front of the digest for long keys
const HASHED_PREFIX_LEN: usize = 120;

/// Escapes a key into a portable file name.
///
/// ASCII alphanumerics, `-` and `.` pass through; every other byte becomes
/// `_xx` (lowercase hex), which keeps the mapping injective. Escaped keys
/// longer than `MAX_ESCAPED_LEN` are cut and suffixed with `_h` and the
/// SHA-256 of the full key. `_h` never occurs in a plain escape, so hashed
/// and plain names cannot collide, and the result stays under NAME_MAX.
fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'.' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("_{:02x}", byte));
        }
    }
    if out.len() > MAX_ESCAPED_LEN {
        let digest = Sha256::digest(key.as_bytes());
        out.truncate(HASHED_PREFIX_LEN);
        out.push_str(&format!("_h{:x}", digest));
    }
    out
}

/// Volatile store used when no storage directory is available, and in tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}
