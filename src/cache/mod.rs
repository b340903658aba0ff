//! HTTP response caches consulted by the fetcher

pub mod file_cache;
pub mod http_cache;
pub mod lru_cache;

pub use file_cache::FileHttpCache;
pub use http_cache::{CacheEntry, CacheError, HttpCache};
pub use lru_cache::LruHttpCache;
