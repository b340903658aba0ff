//! Transport contracts: how bytes are actually fetched from the network

use std::future::Future;
use std::io::Write;
use std::pin::Pin;
use std::sync::Arc;

use futures::Stream;

use super::errors::FetchResult;
use super::headers::{RequestHeaders, ResponseHeaders};

/// Body chunks of an in-flight response
pub type BodyStream = Pin<Box<dyn Stream<Item = FetchResult<Vec<u8>>> + Send>>;

/// A response whose headers have arrived and whose body is still streaming
pub struct FetchResponse {
    pub headers: ResponseHeaders,
    pub body: BodyStream,
}

impl FetchResponse {
    /// A response whose entire body is already in memory
    #[must_use]
    pub fn from_bytes(headers: ResponseHeaders, body: Vec<u8>) -> Self {
        Self {
            headers,
            body: Box::pin(futures::stream::iter(std::iter::once(Ok(body)))),
        }
    }
}

pub type FetchFuture = Pin<Box<dyn Future<Output = FetchResult<FetchResponse>> + Send>>;

/// Blocking transport
///
/// Writes the body into `sink` and returns the response headers. The call
/// must not be made from inside an async task.
pub trait UrlFetcher: Send + Sync {
    fn fetch(
        &self,
        url: &str,
        request_headers: &RequestHeaders,
        sink: &mut dyn Write,
    ) -> FetchResult<ResponseHeaders>;
}

/// Non-blocking transport
pub trait UrlAsyncFetcher: Send + Sync {
    fn fetch_async(&self, url: &str, request_headers: &RequestHeaders) -> FetchFuture;
}

/// The transport a `CacheUrlFetcher` falls back to on a cache miss
#[derive(Clone)]
pub enum Transport {
    Sync(Arc<dyn UrlFetcher>),
    Async {
        fetcher: Arc<dyn UrlAsyncFetcher>,
        runtime: tokio::runtime::Handle,
    },
}

impl Transport {
    #[must_use]
    pub fn is_async(&self) -> bool {
        matches!(self, Transport::Async { .. })
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Sync(_) => f.write_str("Transport::Sync"),
            Transport::Async { .. } => f.write_str("Transport::Async"),
        }
    }
}
