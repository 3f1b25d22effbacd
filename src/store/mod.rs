//! Local Store - quota-limited string key/value persistence.
//!
//! Every collection and setting lives under one fixed key as a JSON string.
//! A write that would push the total stored size past the quota is refused
//! and leaves the store untouched; callers keep their in-memory state.

pub mod keys;
pub mod models;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default quota, the usual browser allotment for local storage.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage quota exceeded: writing '{key}' needs {needed} bytes, quota is {quota}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },
    #[error("invalid store key '{0}'")]
    InvalidKey(String),
    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn is_quota(&self) -> bool {
        matches!(self, StoreError::QuotaExceeded { .. })
    }
}

pub trait LocalStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
    /// Bytes currently counted against the quota.
    fn used_bytes(&self) -> usize;
    fn quota_bytes(&self) -> usize;
}

fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

/// Size accounting shared by both backends.
#[derive(Debug, Default)]
struct Entries {
    map: HashMap<String, String>,
    used: usize,
}

impl Entries {
    fn size_after(&self, key: &str, value: &str) -> usize {
        let old = self
            .map
            .get(key)
            .map(|v| entry_size(key, v))
            .unwrap_or(0);
        self.used - old + entry_size(key, value)
    }

    fn insert(&mut self, key: &str, value: &str) {
        self.used = self.size_after(key, value);
        self.map.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) -> bool {
        match self.map.remove(key) {
            Some(old) => {
                self.used -= entry_size(key, &old);
                true
            }
            None => false,
        }
    }

    fn check_quota(&self, key: &str, value: &str, quota: usize) -> Result<(), StoreError> {
        let needed = self.size_after(key, value);
        if needed > quota {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                needed,
                quota,
            });
        }
        Ok(())
    }
}

/// In-process store. Nothing survives a restart.
#[derive(Debug)]
pub struct MemoryStore {
    entries: Entries,
    quota: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: Entries::default(),
            quota,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.check_quota(key, value, self.quota)?;
        self.entries.insert(key, value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn used_bytes(&self) -> usize {
        self.entries.used
    }

    fn quota_bytes(&self) -> usize {
        self.quota
    }
}

/// One file per key inside a data directory. Writes are blocking file I/O;
/// async callers go through `routes::mutate`.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    entries: Entries,
    quota: usize,
}

/// Keys become file names, so reject anything that could leave the directory.
fn validate_key(key: &str) -> Result<(), StoreError> {
    let ok = !key.is_empty()
        && !key.contains("..")
        && !key.contains('/')
        && !key.contains('\\')
        && !key.contains('\0');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir` and load every entry.
    pub fn open(dir: impl AsRef<Path>, quota: usize) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        let mut entries = Entries::default();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let key = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            match std::fs::read_to_string(&path) {
                Ok(value) => entries.insert(&key, &value),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "skipping unreadable store entry");
                }
            }
        }

        tracing::info!(
            dir = %dir.display(),
            keys = entries.map.len(),
            used_bytes = entries.used,
            "file store opened"
        );

        Ok(Self {
            dir,
            entries,
            quota,
        })
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.entries.check_quota(key, value, self.quota)?;
        std::fs::write(self.dir.join(key), value)?;
        self.entries.insert(key, value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        if self.entries.remove(key) {
            match std::fs::remove_file(self.dir.join(key)) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn used_bytes(&self) -> usize {
        self.entries.used
    }

    fn quota_bytes(&self) -> usize {
        self.quota
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    File,
    Memory,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub dir: PathBuf,
    pub quota_bytes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: match std::env::var("STORE_BACKEND").as_deref() {
                Ok("memory") => StoreBackend::Memory,
                _ => StoreBackend::File,
            },
            dir: std::env::var("STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            quota_bytes: std::env::var("STORE_QUOTA_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_QUOTA_BYTES),
        }
    }
}

pub fn open_store(config: &StoreConfig) -> Result<Box<dyn LocalStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!(quota_bytes = config.quota_bytes, "using in-memory store");
            Ok(Box::new(MemoryStore::with_quota(config.quota_bytes)))
        }
        StoreBackend::File => Ok(Box::new(FileStore::open(&config.dir, config.quota_bytes)?)),
    }
}
