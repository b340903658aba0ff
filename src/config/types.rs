//! Core configuration types for HTML rewriting
//!
//! This module contains the main `RewriteConfig` struct and the set of
//! rewriters it can enable.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A rewriter that can be registered with the pipeline driver
///
/// Registration order in `RewriteConfig::filters` is the order in which the
/// driver runs the filters over each flush window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriterKind {
    /// Move inline `<style>` blocks into external stylesheets
    OutlineCss,
    /// Move inline `<script>` blocks into external scripts
    OutlineJavascript,
    /// Recompress referenced images and point `src` at the result
    RewriteImages,
}

impl std::fmt::Display for RewriterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RewriterKind::OutlineCss => write!(f, "outline_css"),
            RewriterKind::OutlineJavascript => write!(f, "outline_javascript"),
            RewriterKind::RewriteImages => write!(f, "rewrite_images"),
        }
    }
}

/// Main configuration struct for rewriting operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteConfig {
    /// Directory where output resources are published.
    pub(crate) output_dir: PathBuf,

    /// Prefix prepended to published file names to form their URL.
    ///
    /// **INVARIANT:** Always ends with `/` (normalized in builder).
    pub(crate) url_prefix: String,

    pub(crate) filters: Vec<RewriterKind>,

    /// Rewrite GIF images by re-encoding them as PNG.
    ///
    /// Default: false
    pub(crate) enable_gif: bool,

    /// Quality used when re-encoding JPEG images (1..=100)
    ///
    /// Default: 85
    pub(crate) jpeg_quality: u8,

    /// Number of entries held by the in-memory HTTP cache
    pub(crate) cache_capacity: usize,

    /// Timeout in seconds for a single transport fetch
    ///
    /// Default: 30 seconds
    pub(crate) fetch_timeout_secs: u64,

    /// Resources larger than this are rejected by the transports (bytes)
    pub(crate) max_resource_size: usize,

    pub(crate) user_agent: String,
}

impl RewriteConfig {
    /// Create a new builder for `RewriteConfig`
    #[must_use]
    pub fn builder() -> super::builder::RewriteConfigBuilder {
        super::builder::RewriteConfigBuilder::default()
    }

    /// Whether a given rewriter is registered
    #[must_use]
    pub fn is_enabled(&self, kind: RewriterKind) -> bool {
        self.filters.contains(&kind)
    }
}
