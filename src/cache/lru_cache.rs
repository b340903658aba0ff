//! In-memory LRU response cache

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use super::http_cache::{CacheEntry, CacheError, HttpCache};
use crate::fetcher::ResponseHeaders;

/// Bounded in-memory cache
///
/// Entries are shared as `Arc<CacheEntry>` and swapped in whole under the
/// lock. When full, the least recently looked-up URL is evicted.
pub struct LruHttpCache {
    entries: Mutex<LruCache<String, Arc<CacheEntry>>>,
}

impl LruHttpCache {
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Cache sized from configuration; a zero capacity is raised to one
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl HttpCache for LruHttpCache {
    fn lookup(&self, url: &str) -> Option<Arc<CacheEntry>> {
        // get() updates recency, so it needs the lock exclusively
        self.entries.lock().get(url).cloned()
    }

    fn store(&self, url: &str, headers: &ResponseHeaders, body: &[u8]) -> Result<(), CacheError> {
        let entry = Arc::new(CacheEntry::new(headers.clone(), body.to_vec()));
        let evicted = self.entries.lock().push(url.to_string(), entry);
        if let Some((evicted_url, _)) = evicted
            && evicted_url != url
        {
            log::trace!("LruHttpCache at capacity, evicted {evicted_url}");
        }
        Ok(())
    }
}
