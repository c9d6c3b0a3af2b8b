//! Directory-backed image cache
//!
//! Each entry is a single `<key>.jpg` file in the cache directory. The
//! filesystem is the only source of truth: there is no in-memory index and
//! no locking, so concurrent writers to the same key race and the last
//! write wins.

use crate::error::CacheError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File extension appended to every key
const EXTENSION: &str = "jpg";

/// A flat directory of cached images
#[derive(Debug, Clone)]
pub struct ImageCache {
    cache_dir: PathBuf,
}

impl ImageCache {
    /// Create a cache rooted at an existing directory
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.{}", key, EXTENSION))
    }

    /// Read the cached bytes for a key
    pub async fn read(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        let path = self.path_for(key);
        let data = fs::read(&path).await?;
        debug!(key, size = data.len(), "Cache hit");
        Ok(data)
    }

    /// Create or overwrite the entry for a key
    pub async fn write(&self, key: &str, data: &[u8]) -> Result<(), CacheError> {
        let path = self.path_for(key);
        // A missing cache directory is a storage failure, not a missing entry
        fs::write(&path, data).await.map_err(CacheError::Io)?;
        debug!(key, size = data.len(), path = ?path, "Cached image");
        Ok(())
    }

    /// Remove the entry for a key
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let path = self.path_for(key);
        fs::remove_file(&path).await?;
        debug!(key, path = ?path, "Deleted cached image");
        Ok(())
    }
}
