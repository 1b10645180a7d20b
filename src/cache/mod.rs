//! Key-value store for resolved radius lookups
//!
//! Lookups are keyed by postal code and partitioned by radius: each radius
//! gets its own store. The enrichment loop only talks to the [`ZipCache`]
//! trait, so the on-disk [`FileCache`] can be swapped for a [`MemoryCache`]
//! in tests.

mod file;
mod memory;

pub use file::{cache_file_name, FileCache};
pub use memory::MemoryCache;

use thiserror::Error;

/// Errors that can occur while loading or flushing a cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing the cache file failed
    #[error("Cache I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The cache file exists but is not a valid postal code mapping
    #[error("Cache file {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A grow-only mapping from postal code to its resolved radius result
pub trait ZipCache {
    /// Returns the cached result for `key`, if any.
    ///
    /// An empty string is a valid cached value (a lookup that failed or found
    /// nothing) and is distinct from `None`.
    fn get(&self, key: &str) -> Option<&str>;

    /// Inserts `value` under `key` unless the key is already present.
    ///
    /// Returns `true` if the entry was added. Existing entries are never
    /// overwritten.
    fn put(&mut self, key: &str, value: String) -> bool;

    /// Persists the full contents of the cache.
    fn flush(&mut self) -> Result<(), CacheError>;

    /// Number of cached postal codes
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
