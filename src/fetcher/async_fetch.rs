//! State of one outstanding asynchronous fetch, and the handles returned to
//! callers who started it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use futures::StreamExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::errors::{FetchError, FetchResult};
use super::headers::{RequestHeaders, ResponseHeaders};
use super::transport::{FetchFuture, UrlFetcher};
use crate::cache::HttpCache;

/// A completed response handed to completion callbacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    pub headers: ResponseHeaders,
    pub body: Vec<u8>,
}

/// Invoked exactly once with the outcome, unless the fetch is cancelled first
pub type FetchCallback = Box<dyn FnOnce(FetchResult<FetchedResource>) + Send + 'static>;

/// Accumulates the body of one fetch, reports the outcome, then updates the
/// cache. Consumed by `done`.
pub struct AsyncFetch {
    url: String,
    buffer: Vec<u8>,
    cache: Arc<dyn HttpCache>,
    completion: Option<FetchCallback>,
    cancelled: Arc<AtomicBool>,
}

impl AsyncFetch {
    pub(crate) fn new(
        url: &str,
        cache: Arc<dyn HttpCache>,
        completion: Option<FetchCallback>,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        Self {
            url: url.to_string(),
            buffer: Vec::new(),
            cache,
            completion,
            cancelled,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Drive an asynchronous transport to completion
    pub(crate) async fn run(mut self, response: FetchFuture) {
        let outcome = self.collect(response).await;
        self.done(outcome);
    }

    /// Drive a blocking transport to completion; call from a blocking thread
    pub(crate) fn run_blocking(
        mut self,
        fetcher: &dyn UrlFetcher,
        request_headers: &RequestHeaders,
    ) {
        let url = self.url.clone();
        let outcome = fetcher
            .fetch(&url, request_headers, &mut self.buffer)
            .and_then(|headers| check_status(&url, headers));
        self.done(outcome);
    }

    async fn collect(&mut self, response: FetchFuture) -> FetchResult<ResponseHeaders> {
        let mut response = response.await?;
        let headers = check_status(&self.url, response.headers)?;
        while let Some(chunk) = response.body.next().await {
            self.buffer.extend_from_slice(&chunk?);
        }
        Ok(headers)
    }

    /// Report the outcome, then on success store it in the cache
    fn done(mut self, outcome: FetchResult<ResponseHeaders>) {
        match outcome {
            Ok(headers) => {
                let body = std::mem::take(&mut self.buffer);
                self.complete(Ok(FetchedResource {
                    headers: headers.clone(),
                    body: body.clone(),
                }));
                if let Err(e) = self.cache.store(&self.url, &headers, &body) {
                    log::warn!("Failed to cache {}: {e}", self.url);
                }
            }
            Err(e) => {
                log::debug!("Async fetch of {} failed: {e}", self.url);
                self.complete(Err(e));
            }
        }
    }

    fn complete(&mut self, outcome: FetchResult<FetchedResource>) {
        let Some(completion) = self.completion.take() else {
            return;
        };
        if self.cancelled.load(Ordering::Acquire) {
            log::debug!("Fetch of {} was cancelled, dropping completion", self.url);
            return;
        }
        completion(outcome);
    }
}

pub(crate) fn check_status(url: &str, headers: ResponseHeaders) -> FetchResult<ResponseHeaders> {
    if headers.is_success() {
        Ok(headers)
    } else {
        Err(FetchError::Status {
            url: url.to_string(),
            status: headers.status(),
        })
    }
}

/// Returned by `fetch_asynchronously`
///
/// Dropping the handle does not cancel the fetch.
pub struct FetchHandle {
    url: String,
    cancelled: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl FetchHandle {
    pub(crate) fn new(url: &str, cancelled: Arc<AtomicBool>, task: Option<JoinHandle<()>>) -> Self {
        Self {
            url: url.to_string(),
            cancelled,
            task,
        }
    }

    /// A handle for a fetch that completed before it was returned
    pub(crate) fn completed(url: &str) -> Self {
        Self::new(url, Arc::new(AtomicBool::new(false)), None)
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Suppress the completion callback. The transport keeps running and a
    /// successful response is still cached.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait until the fetch, including its cache update, is over
    pub async fn finished(self) {
        if let Some(task) = self.task
            && let Err(e) = task.await
        {
            log::warn!("Fetch task for {} did not complete: {e}", self.url);
        }
    }
}

/// A pending fetch that can be awaited directly
pub struct PendingFetch {
    url: String,
    receiver: oneshot::Receiver<FetchResult<FetchedResource>>,
}

impl PendingFetch {
    pub(crate) fn new(url: &str, receiver: oneshot::Receiver<FetchResult<FetchedResource>>) -> Self {
        Self {
            url: url.to_string(),
            receiver,
        }
    }
}

impl Future for PendingFetch {
    type Output = FetchResult<FetchedResource>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(FetchError::Cancelled {
                url: self.url.clone(),
            })),
            Poll::Pending => Poll::Pending,
        }
    }
}
