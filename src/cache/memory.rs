//! In-memory cache used where nothing needs to hit the disk

use std::collections::BTreeMap;

use super::{CacheError, ZipCache};

/// Cache that lives only in memory
///
/// Flushing is a no-op apart from bumping `flush_count`, which lets callers
/// check how often the enrichment loop asked for persistence.
#[derive(Debug, Default, Clone)]
pub struct MemoryCache {
    entries: BTreeMap<String, String>,
    /// Number of times `flush` has been called
    pub flush_count: usize,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cache pre-populated with the given entries
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            flush_count: 0,
        }
    }

    /// Cached postal codes in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl ZipCache for MemoryCache {
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
        self.flush_count += 1;
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
