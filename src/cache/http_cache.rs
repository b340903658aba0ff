//! The cache contract shared by the fetcher and its backends

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fetcher::ResponseHeaders;

/// A cached response: headers plus the complete body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub headers: ResponseHeaders,
    pub body: Vec<u8>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    #[must_use]
    pub fn new(headers: ResponseHeaders, body: Vec<u8>) -> Self {
        Self {
            headers,
            body,
            stored_at: Utc::now(),
        }
    }
}

/// Error types for cache writes
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The entry could not be persisted
    #[error("Failed to store cache entry for {url}: {source:#}")]
    Store {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// Metadata did not fit the on-disk format
    #[error("Cache metadata for {url} is too large: {len} bytes")]
    MetadataTooLarge { url: String, len: usize },
}

/// Response storage keyed by URL
///
/// Stores are atomic per entry: a lookup racing a store sees either the old
/// entry, the new one, or nothing, never a partial body. Concurrent stores to
/// the same URL are last-writer-wins.
pub trait HttpCache: Send + Sync {
    fn lookup(&self, url: &str) -> Option<Arc<CacheEntry>>;

    fn store(&self, url: &str, headers: &ResponseHeaders, body: &[u8]) -> Result<(), CacheError>;
}
