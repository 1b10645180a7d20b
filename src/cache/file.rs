//! JSON file backed cache
//!
//! Stores the whole postal code mapping as a single JSON object. The file is
//! read once when the cache is opened and rewritten in full on every flush.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{CacheError, ZipCache};

/// Returns the cache file name used for a given radius
pub fn cache_file_name(radius: u32) -> String {
    format!("cache{}.json", radius)
}

/// Cache of radius lookups persisted as a JSON file on disk
///
/// One file exists per radius (`cache10.json`, `cache25.json`, ...). There is
/// no locking, so two runs sharing a file will clobber each other.
#[derive(Debug)]
pub struct FileCache {
    /// Location of the backing file
    path: PathBuf,
    /// In-memory copy of every entry
    entries: BTreeMap<String, String>,
}

impl FileCache {
    /// Opens the cache for `radius` inside `cache_dir`
    ///
    /// Creates the directory and an empty cache file if either is missing,
    /// then loads every entry into memory.
    ///
    /// # Arguments
    /// * `cache_dir` - Directory holding the cache files
    /// * `radius` - Search radius the cache belongs to
    ///
    /// # Returns
    /// * `Ok(FileCache)` with all existing entries loaded
    /// * `Err(CacheError)` if the file cannot be created, read or parsed
    pub fn open(cache_dir: &Path, radius: u32) -> Result<Self, CacheError> {
        Self::open_path(cache_dir.join(cache_file_name(radius)))
    }

    /// Opens a cache stored at an explicit file path
    pub fn open_path(path: PathBuf) -> Result<Self, CacheError> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| io_error(&path, source))?;
            }
            fs::write(&path, "{}").map_err(|source| io_error(&path, source))?;
            debug!("Created empty cache file {}", path.display());
        }

        let content = fs::read_to_string(&path).map_err(|source| io_error(&path, source))?;
        let entries: BTreeMap<String, String> =
            serde_json::from_str(&content).map_err(|source| CacheError::Corrupt {
                path: path.display().to_string(),
                source,
            })?;

        debug!("Loaded {} cached entries from {}", entries.len(), path.display());

        Ok(Self { path, entries })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ZipCache for FileCache {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn put(&mut self, key: &str, value: String) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(key.to_string(), value);
        true
    }

    fn flush(&mut self) -> Result<(), CacheError> {
        let json = serde_json::to_string_pretty(&self.entries).map_err(|e| {
            io_error(
                &self.path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;

        // Truncate and rewrite; a crash mid-write leaves a partial file.
        fs::write(&self.path, json).map_err(|source| io_error(&self.path, source))?;
        debug!("Flushed {} entries to {}", self.entries.len(), self.path.display());
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

fn io_error(path: &Path, source: std::io::Error) -> CacheError {
    CacheError::Io {
        path: path.display().to_string(),
        source,
    }
}
