//! Type-safe builder for `RewriteConfig` using the typestate pattern
//!
//! This module provides a fluent builder interface with compile-time validation
//! ensuring that required fields are set before building a `RewriteConfig`.

use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::{RewriteConfig, RewriterKind};
use crate::utils::{
    CHROME_USER_AGENT, DEFAULT_CACHE_CAPACITY, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_JPEG_QUALITY,
    DEFAULT_MAX_RESOURCE_SIZE,
};

/// Errors raised while validating a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("output_dir is required")]
    MissingOutputDir,

    #[error("url_prefix must not be empty")]
    EmptyUrlPrefix,

    #[error("jpeg_quality must be within 1..=100, got {0}")]
    InvalidJpegQuality(u8),

    #[error("cache_capacity must be greater than zero")]
    ZeroCacheCapacity,
}

// Type states for the builder
pub struct WithOutputDir;
pub struct Complete;

pub struct RewriteConfigBuilder<State = ()> {
    pub(crate) output_dir: Option<PathBuf>,
    pub(crate) url_prefix: Option<String>,
    pub(crate) filters: Vec<RewriterKind>,
    pub(crate) enable_gif: bool,
    pub(crate) jpeg_quality: u8,
    pub(crate) cache_capacity: usize,
    pub(crate) fetch_timeout_secs: u64,
    pub(crate) max_resource_size: usize,
    pub(crate) user_agent: String,
    _phantom: PhantomData<State>,
}

impl Default for RewriteConfigBuilder<()> {
    fn default() -> Self {
        Self {
            output_dir: None,
            url_prefix: None,
            filters: vec![
                RewriterKind::OutlineCss,
                RewriterKind::OutlineJavascript,
                RewriterKind::RewriteImages,
            ],
            enable_gif: false,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            max_resource_size: DEFAULT_MAX_RESOURCE_SIZE,
            user_agent: CHROME_USER_AGENT.to_string(),
            _phantom: PhantomData,
        }
    }
}

impl<State> RewriteConfigBuilder<State> {
    fn transition<Next>(self) -> RewriteConfigBuilder<Next> {
        RewriteConfigBuilder {
            output_dir: self.output_dir,
            url_prefix: self.url_prefix,
            filters: self.filters,
            enable_gif: self.enable_gif,
            jpeg_quality: self.jpeg_quality,
            cache_capacity: self.cache_capacity,
            fetch_timeout_secs: self.fetch_timeout_secs,
            max_resource_size: self.max_resource_size,
            user_agent: self.user_agent,
            _phantom: PhantomData,
        }
    }

    /// Replace the set of registered rewriters (order is preserved)
    #[must_use]
    pub fn filters(mut self, filters: impl IntoIterator<Item = RewriterKind>) -> Self {
        self.filters.clear();
        for kind in filters {
            if !self.filters.contains(&kind) {
                self.filters.push(kind);
            }
        }
        self
    }

    #[must_use]
    pub fn enable_gif(mut self, enable: bool) -> Self {
        self.enable_gif = enable;
        self
    }

    #[must_use]
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    #[must_use]
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    #[must_use]
    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.fetch_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn max_resource_size(mut self, bytes: usize) -> Self {
        self.max_resource_size = bytes;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl RewriteConfigBuilder<()> {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> RewriteConfigBuilder<WithOutputDir> {
        self.output_dir = Some(dir.into());
        self.transition()
    }
}

impl RewriteConfigBuilder<WithOutputDir> {
    pub fn url_prefix(mut self, prefix: impl Into<String>) -> RewriteConfigBuilder<Complete> {
        let mut prefix = prefix.into();
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }
        self.url_prefix = Some(prefix);
        self.transition()
    }
}

// Build method only available when all required fields are set
impl RewriteConfigBuilder<Complete> {
    pub fn build(self) -> Result<RewriteConfig, ConfigError> {
        let url_prefix = self.url_prefix.unwrap_or_default();
        if url_prefix.is_empty() {
            return Err(ConfigError::EmptyUrlPrefix);
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::InvalidJpegQuality(self.jpeg_quality));
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::ZeroCacheCapacity);
        }

        Ok(RewriteConfig {
            output_dir: self.output_dir.ok_or(ConfigError::MissingOutputDir)?,
            url_prefix,
            filters: self.filters,
            enable_gif: self.enable_gif,
            jpeg_quality: self.jpeg_quality,
            cache_capacity: self.cache_capacity,
            fetch_timeout_secs: self.fetch_timeout_secs,
            max_resource_size: self.max_resource_size,
            user_agent: self.user_agent,
        })
    }
}
