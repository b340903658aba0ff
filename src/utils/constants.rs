//! Shared configuration constants for the rewriter
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Default JPEG re-encode quality: 85
///
/// Below ~80 artifacts become visible on photographic content; above ~90
/// the output is rarely smaller than what sites already serve.
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Default number of entries held by the in-memory HTTP cache
///
/// 1,000 entries × ~50KB average resource ≈ 50 MB worst case.
pub const DEFAULT_CACHE_CAPACITY: usize = 1_000;

/// Default timeout for a single resource fetch: 30 seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Maximum size of a fetched resource (bytes)
///
/// Based on the 99th percentile of real-world images plus margin.
/// Anything larger is not worth rewriting inline with page delivery.
pub const DEFAULT_MAX_RESOURCE_SIZE: usize = 5 * 1024 * 1024;

/// MIME type the outline filter expects on `<style>` elements
pub const TEXT_CSS: &str = "text/css";

/// MIME type the outline filter expects on `<script>` elements
pub const TEXT_JAVASCRIPT: &str = "text/javascript";

/// Chrome user agent string sent by the bundled transports
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
///
/// Reference: https://chromiumdash.appspot.com/schedule
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
