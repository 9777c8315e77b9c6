//! Durable key-value blobs.
//!
//! [`FileStore`] keeps one JSON file per key under the platform data
//! directory (e.g. `~/.local/share/kanime/kanime-list.json`).

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::KanimeError;

/// JSON array of favorite anime ids.
pub const FAVORITES_KEY: &str = "kanime-list";
/// Set once the community upsell has been dismissed.
pub const UPSELL_DISMISSED_KEY: &str = "kanime-discord-popup";

pub trait BlobStore {
    /// `Ok(None)` when nothing was ever written under `key`.
    fn read(&self, key: &str) -> Result<Option<String>, KanimeError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), KanimeError>;
}

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, KanimeError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), KanimeError> {
        std::fs::create_dir_all(&self.dir)?;
        // Write-then-rename so a crash never leaves a truncated blob.
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-process store for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.values.insert(key.to_string(), value.to_string());
        store
    }

    /// Number of writes performed so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl BlobStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, KanimeError> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), KanimeError> {
        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

pub fn read_json<T: DeserializeOwned>(
    store: &impl BlobStore,
    key: &str,
) -> Result<Option<T>, KanimeError> {
    let Some(raw) = store.read(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| KanimeError::MalformedStorage {
            key: key.to_string(),
            source,
        })
}

pub fn write_json<T: Serialize + ?Sized>(
    store: &mut impl BlobStore,
    key: &str,
    value: &T,
) -> Result<(), KanimeError> {
    let raw = serde_json::to_string(value).map_err(|source| KanimeError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.write(key, &raw)
}

/// Whether the one-time upsell was dismissed. Unreadable flags count as not
/// dismissed.
pub fn upsell_dismissed(store: &impl BlobStore) -> bool {
    match read_json::<bool>(store, UPSELL_DISMISSED_KEY) {
        Ok(flag) => flag.unwrap_or(false),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable upsell flag");
            false
        }
    }
}

pub fn dismiss_upsell(store: &mut impl BlobStore) -> Result<(), KanimeError> {
    write_json(store, UPSELL_DISMISSED_KEY, &true)
}
