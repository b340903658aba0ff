//! A fetcher that answers from the HTTP cache and falls back to a transport

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tokio::sync::oneshot;

use super::async_fetch::{AsyncFetch, FetchCallback, FetchHandle, FetchedResource, PendingFetch, check_status};
use super::errors::{FetchError, FetchResult};
use super::headers::{RequestHeaders, ResponseHeaders};
use super::transport::Transport;
use crate::cache::HttpCache;

/// Composes an `HttpCache` with exactly one transport
///
/// Successful responses are written back to the cache; failures never are.
/// Concurrent fetches of the same uncached URL are not coalesced: each one
/// reaches the transport and each one writes the cache.
pub struct CacheUrlFetcher {
    cache: Arc<dyn HttpCache>,
    transport: Transport,
}

impl CacheUrlFetcher {
    pub fn new(cache: Arc<dyn HttpCache>, transport: Transport) -> Self {
        Self { cache, transport }
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<dyn HttpCache> {
        &self.cache
    }

    #[must_use]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Fetch `url`, writing the body to `writer`
    ///
    /// Blocks on a synchronous transport. With only an asynchronous transport
    /// a miss starts a background fetch that fills the cache and returns
    /// `FetchError::NotYetAvailable` immediately.
    pub fn fetch_synchronously(
        &self,
        url: &str,
        request_headers: &RequestHeaders,
        writer: &mut dyn Write,
    ) -> FetchResult<ResponseHeaders> {
        if let Some(entry) = self.cache.lookup(url) {
            log::debug!("Cache hit for {url}");
            write_body(url, writer, &entry.body)?;
            return Ok(entry.headers.clone());
        }

        match &self.transport {
            Transport::Sync(fetcher) => {
                log::debug!("Cache miss for {url}, fetching synchronously");
                let mut buffer = Vec::new();
                let headers = fetcher.fetch(url, request_headers, &mut buffer)?;
                let headers = check_status(url, headers)?;
                if let Err(e) = self.cache.store(url, &headers, &buffer) {
                    log::warn!("Failed to cache {url}: {e}");
                }
                write_body(url, writer, &buffer)?;
                Ok(headers)
            }
            Transport::Async { .. } => {
                log::debug!("Cache miss for {url}, starting background fetch");
                let _background = self.start_fetch(url, request_headers, None);
                Err(FetchError::NotYetAvailable {
                    url: url.to_string(),
                })
            }
        }
    }

    /// Fetch `url` and report the outcome to `completion`
    ///
    /// A cache hit calls `completion` before this returns. Otherwise the fetch
    /// runs on a task; `completion` sees the outcome first, and a successful
    /// response is stored in the cache afterwards.
    pub fn fetch_asynchronously<F>(
        &self,
        url: &str,
        request_headers: &RequestHeaders,
        completion: F,
    ) -> FetchHandle
    where
        F: FnOnce(FetchResult<FetchedResource>) + Send + 'static,
    {
        if let Some(entry) = self.cache.lookup(url) {
            log::debug!("Cache hit for {url}");
            completion(Ok(FetchedResource {
                headers: entry.headers.clone(),
                body: entry.body.clone(),
            }));
            return FetchHandle::completed(url);
        }
        self.start_fetch(url, request_headers, Some(Box::new(completion)))
    }

    /// Awaitable form of `fetch_asynchronously`
    pub fn fetch(&self, url: &str, request_headers: &RequestHeaders) -> PendingFetch {
        let (tx, rx) = oneshot::channel();
        let _handle = self.fetch_asynchronously(url, request_headers, move |outcome| {
            let _ = tx.send(outcome);
        });
        PendingFetch::new(url, rx)
    }

    fn start_fetch(
        &self,
        url: &str,
        request_headers: &RequestHeaders,
        completion: Option<FetchCallback>,
    ) -> FetchHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let fetch = AsyncFetch::new(url, Arc::clone(&self.cache), completion, Arc::clone(&cancelled));

        let task = match &self.transport {
            Transport::Async { fetcher, runtime } => {
                let response = fetcher.fetch_async(url, request_headers);
                Some(runtime.spawn(fetch.run(response)))
            }
            Transport::Sync(fetcher) => {
                let fetcher = Arc::clone(fetcher);
                let request_headers = request_headers.clone();
                match tokio::runtime::Handle::try_current() {
                    Ok(runtime) => Some(runtime.spawn_blocking(move || {
                        fetch.run_blocking(fetcher.as_ref(), &request_headers);
                    })),
                    Err(_) => {
                        // No runtime to hand the work to, so finish before returning
                        fetch.run_blocking(fetcher.as_ref(), &request_headers);
                        None
                    }
                }
            }
        };
        FetchHandle::new(url, cancelled, task)
    }
}

fn write_body(url: &str, writer: &mut dyn Write, body: &[u8]) -> FetchResult<()> {
    writer.write_all(body).map_err(|e| FetchError::Write {
        url: url.to_string(),
        message: e.to_string(),
    })
}
