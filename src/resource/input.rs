//! Read-side resource handles

use std::sync::Arc;

use super::content_type::ImageType;
use super::errors::ResourceError;
use crate::fetcher::{CacheUrlFetcher, RequestHeaders, ResponseHeaders};

/// Fetched bytes for one URL
///
/// Contents are only meaningful after a successful `read`. Handles are owned
/// by the filter that created them and dropped once it is done with them.
pub trait InputResource: Send {
    fn url(&self) -> &str;

    /// Load the contents. Blocks until the bytes are available or the fetch
    /// has failed.
    fn read(&mut self) -> Result<(), ResourceError>;

    fn loaded(&self) -> bool;

    /// Loaded with a successful status
    fn contents_valid(&self) -> bool;

    /// Loaded bytes, empty before a successful `read`
    fn contents(&self) -> &[u8];

    fn response_headers(&self) -> Option<&ResponseHeaders>;

    fn image_type(&self) -> ImageType {
        ImageType::sniff(self.contents())
    }
}

/// Input resource read through the cache-composing fetcher
pub struct UrlInputResource {
    url: String,
    fetcher: Arc<CacheUrlFetcher>,
    request_headers: RequestHeaders,
    contents: Vec<u8>,
    headers: Option<ResponseHeaders>,
}

impl UrlInputResource {
    pub fn new(url: impl Into<String>, fetcher: Arc<CacheUrlFetcher>, request_headers: RequestHeaders) -> Self {
        Self {
            url: url.into(),
            fetcher,
            request_headers,
            contents: Vec::new(),
            headers: None,
        }
    }
}

impl InputResource for UrlInputResource {
    fn url(&self) -> &str {
        &self.url
    }

    fn read(&mut self) -> Result<(), ResourceError> {
        let mut contents = Vec::new();
        let headers = self
            .fetcher
            .fetch_synchronously(&self.url, &self.request_headers, &mut contents)?;
        log::debug!("Read {} bytes from {}", contents.len(), self.url);
        self.contents = contents;
        self.headers = Some(headers);
        Ok(())
    }

    fn loaded(&self) -> bool {
        self.headers.is_some()
    }

    fn contents_valid(&self) -> bool {
        self.headers
            .as_ref()
            .is_some_and(ResponseHeaders::is_success)
    }

    fn contents(&self) -> &[u8] {
        &self.contents
    }

    fn response_headers(&self) -> Option<&ResponseHeaders> {
        self.headers.as_ref()
    }
}
