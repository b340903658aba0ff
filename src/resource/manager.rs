//! The resource store filters obtain input and output resources from

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use super::content_type::ContentType;
use super::input::{InputResource, UrlInputResource};
use super::output::{FileOutputResource, OutputResource};
use crate::cache::LruHttpCache;
use crate::config::RewriteConfig;
use crate::fetcher::{CacheUrlFetcher, ReqwestUrlFetcher, RequestHeaders, Transport, TransportSettings};
use crate::utils::is_fetchable_url;

/// Factory for the resources a filter reads and publishes
pub trait ResourceStore: Send + Sync {
    /// `None` when the URL cannot be fetched at all
    fn create_input_resource(&self, url: &str) -> Option<Box<dyn InputResource>>;

    fn create_output_resource(&self, content_type: ContentType) -> Box<dyn OutputResource>;
}

/// Reads through a `CacheUrlFetcher` and publishes files under a directory
pub struct ResourceManager {
    output_dir: PathBuf,
    url_prefix: String,
    fetcher: Arc<CacheUrlFetcher>,
    request_headers: RequestHeaders,
}

impl ResourceManager {
    pub fn new(output_dir: impl Into<PathBuf>, url_prefix: impl Into<String>, fetcher: Arc<CacheUrlFetcher>) -> Self {
        Self {
            output_dir: output_dir.into(),
            url_prefix: url_prefix.into(),
            fetcher,
            request_headers: RequestHeaders::new(),
        }
    }

    /// Store wired to an in-memory cache and the blocking `reqwest` transport
    pub fn from_config(config: &RewriteConfig) -> Result<Self> {
        let transport = ReqwestUrlFetcher::new(TransportSettings::from(config))?;
        let fetcher = CacheUrlFetcher::new(
            Arc::new(LruHttpCache::with_capacity(config.cache_capacity())),
            Transport::Sync(Arc::new(transport)),
        );
        Ok(Self::new(
            config.output_dir().clone(),
            config.url_prefix(),
            Arc::new(fetcher),
        ))
    }

    /// Headers sent with every input resource fetch
    #[must_use]
    pub fn with_request_headers(mut self, request_headers: RequestHeaders) -> Self {
        self.request_headers = request_headers;
        self
    }

    #[must_use]
    pub fn fetcher(&self) -> &Arc<CacheUrlFetcher> {
        &self.fetcher
    }

    #[must_use]
    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }
}

impl ResourceStore for ResourceManager {
    fn create_input_resource(&self, url: &str) -> Option<Box<dyn InputResource>> {
        if !is_fetchable_url(url) {
            log::debug!("Not creating input resource for unfetchable URL {url}");
            return None;
        }
        Some(Box::new(UrlInputResource::new(
            url,
            Arc::clone(&self.fetcher),
            self.request_headers.clone(),
        )))
    }

    fn create_output_resource(&self, content_type: ContentType) -> Box<dyn OutputResource> {
        Box::new(FileOutputResource::new(
            self.output_dir.clone(),
            self.url_prefix.clone(),
            content_type,
        ))
    }
}
