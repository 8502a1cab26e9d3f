//! File-backed theme cache.
//!
//! Layout inside the cache directory:
//! ```text
//! themes/
//!   <sha256 of theme id>.json   - entry: schema version, id, payload hash, payload
//! ```
//! Ids are normalized with [`theme_id`], so `"iron age"` and `"Iron Age"`
//! name the same entry. The cache is optional. A missing, unreadable or
//! tampered entry is a miss.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::payload::{ThemePayload, theme_id};

const ENTRY_SCHEMA_VERSION: u32 = 1;

/// Errors from cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
    #[error("entry for {requested} holds {stored}")]
    KeyMismatch { requested: String, stored: String },
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    schema_version: u32,
    theme_id: String,
    sha256: String,
    payload: ThemePayload,
}

/// Key/value store mapping a theme id to its last fetched payload.
#[derive(Debug, Clone)]
pub struct ThemeCache {
    root: PathBuf,
}

impl ThemeCache {
    /// Open or create a cache at the given directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(root.join("themes"))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.root
            .join("themes")
            .join(format!("{}.json", sha256_hex(theme_id(name).as_bytes())))
    }

    /// Write `payload` under its own theme name, replacing any earlier entry.
    pub fn store(&self, payload: &ThemePayload) -> Result<PathBuf, CacheError> {
        self.store_as(&payload.theme_name, payload)
    }

    /// Write `payload` under `name`, which may differ from the payload's own.
    pub fn store_as(&self, name: &str, payload: &ThemePayload) -> Result<PathBuf, CacheError> {
        let entry = CacheEntry {
            schema_version: ENTRY_SCHEMA_VERSION,
            theme_id: theme_id(name),
            sha256: payload_hash(payload)?,
            payload: payload.clone(),
        };
        let path = self.entry_path(name);
        serde_json::to_writer_pretty(std::fs::File::create(&path)?, &entry)?;
        tracing::debug!(theme = %payload.theme_name, path = %path.display(), "theme cached");
        Ok(path)
    }

    /// Load and verify the entry for `name`. `Ok(None)` when there is none.
    pub fn load(&self, name: &str) -> Result<Option<ThemePayload>, CacheError> {
        let id = theme_id(name);
        let path = self.entry_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let entry: CacheEntry = serde_json::from_reader(std::fs::File::open(&path)?)?;
        if entry.schema_version != ENTRY_SCHEMA_VERSION {
            return Err(CacheError::SchemaMismatch {
                file_version: entry.schema_version,
                expected_version: ENTRY_SCHEMA_VERSION,
            });
        }
        if entry.theme_id != id {
            return Err(CacheError::KeyMismatch {
                requested: id,
                stored: entry.theme_id,
            });
        }
        let actual = payload_hash(&entry.payload)?;
        if actual != entry.sha256 {
            return Err(CacheError::IntegrityMismatch {
                expected: entry.sha256,
                actual,
            });
        }
        Ok(Some(entry.payload))
    }

    /// Like [`ThemeCache::load`], with every failure logged and treated as a miss.
    pub fn get(&self, name: &str) -> Option<ThemePayload> {
        match self.load(name) {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(%err, theme = name, "ignoring unusable cache entry");
                None
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry_path(name).exists()
    }

    pub fn remove(&self, name: &str) -> Result<bool, CacheError> {
        let path = self.entry_path(name);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(path)?;
        Ok(true)
    }
}

fn payload_hash(payload: &ThemePayload) -> Result<String, CacheError> {
    Ok(sha256_hex(&serde_json::to_vec(payload)?))
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
