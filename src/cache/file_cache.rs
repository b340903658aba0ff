//! On-disk response cache
//!
//! One gzip file per URL at `root/<xxh3 of url>.gz`. The gzip header comment
//! carries JSON metadata (url, status, headers, stored time, body etag) so a
//! lookup needs nothing but the file. Files are written to a temp file in the
//! same directory and renamed into place, so readers never observe a partial
//! entry.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::{Compression, GzBuilder};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::http_cache::{CacheEntry, CacheError, HttpCache};
use crate::fetcher::ResponseHeaders;

/// Gzip comment field maximum size per RFC 1952
const MAX_METADATA_JSON_LEN: usize = 60_000;

/// Metadata stored in the gzip header comment of each cache file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FileCacheMetadata {
    url: String,
    etag: String,
    headers: ResponseHeaders,
    #[serde(with = "chrono::serde::ts_seconds")]
    stored_at: DateTime<Utc>,
}

pub struct FileHttpCache {
    root: PathBuf,
}

impl FileHttpCache {
    /// Open (creating if needed) a cache rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create cache directory {}", root.display()))?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `url`'s entry
    #[must_use]
    pub fn entry_path(&self, url: &str) -> PathBuf {
        let hash = xxhash_rust::xxh3::xxh3_64(url.as_bytes());
        self.root.join(format!("{hash:016x}.gz"))
    }

    fn read_entry(&self, url: &str) -> Result<Option<CacheEntry>> {
        let path = self.entry_path(url);
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(&path).context("Failed to open cache file")?;
        let mut gz = GzDecoder::new(file);

        let header = gz
            .header()
            .ok_or_else(|| anyhow::anyhow!("No gzip header found"))?;
        let comment = std::str::from_utf8(header.comment().unwrap_or(&[]))
            .context("Invalid UTF-8 in gzip comment")?;
        let metadata: FileCacheMetadata =
            serde_json::from_str(comment).context("Failed to parse cache metadata JSON")?;

        // Distinct URLs can collide on the 64-bit name
        if metadata.url != url {
            return Ok(None);
        }

        let mut body = Vec::new();
        gz.read_to_end(&mut body)
            .context("Failed to decompress cache body")?;

        let etag = format!("\"{:x}\"", xxhash_rust::xxh3::xxh3_64(&body));
        if etag != metadata.etag {
            anyhow::bail!("Cache body does not match its etag");
        }

        Ok(Some(CacheEntry {
            headers: metadata.headers,
            body,
            stored_at: metadata.stored_at,
        }))
    }

    fn write_entry(&self, path: &Path, metadata_json: String, body: &[u8]) -> Result<()> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid cache file name"))?
            .to_string();

        let temp_file =
            NamedTempFile::new_in(&self.root).context("Failed to create temp cache file")?;
        let mut gz = GzBuilder::new()
            .filename(file_name)
            .comment(metadata_json)
            .write(temp_file, Compression::new(3));
        gz.write_all(body).context("Failed to compress cache body")?;
        let temp_file = gz.finish().context("Failed to finish gzip stream")?;

        // Atomic at the OS level; last writer wins
        temp_file
            .persist(path)
            .context("Failed to move cache file into place")?;
        Ok(())
    }
}

impl HttpCache for FileHttpCache {
    fn lookup(&self, url: &str) -> Option<Arc<CacheEntry>> {
        match self.read_entry(url) {
            Ok(entry) => entry.map(Arc::new),
            Err(e) => {
                log::warn!("Ignoring unreadable cache entry for {url}: {e:#}");
                None
            }
        }
    }

    fn store(&self, url: &str, headers: &ResponseHeaders, body: &[u8]) -> Result<(), CacheError> {
        let metadata = FileCacheMetadata {
            url: url.to_string(),
            etag: format!("\"{:x}\"", xxhash_rust::xxh3::xxh3_64(body)),
            headers: headers.clone(),
            stored_at: Utc::now(),
        };
        let metadata_json = serde_json::to_string(&metadata).map_err(|e| CacheError::Store {
            url: url.to_string(),
            source: e.into(),
        })?;
        if metadata_json.len() > MAX_METADATA_JSON_LEN {
            return Err(CacheError::MetadataTooLarge {
                url: url.to_string(),
                len: metadata_json.len(),
            });
        }

        let path = self.entry_path(url);
        self.write_entry(&path, metadata_json, body)
            .map_err(|source| CacheError::Store {
                url: url.to_string(),
                source,
            })?;
        log::debug!("Cached {} bytes for {url} at {}", body.len(), path.display());
        Ok(())
    }
}
