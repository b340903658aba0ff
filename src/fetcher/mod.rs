//! Fetching: transports, the cache-composing fetcher and async fetch state

pub mod async_fetch;
pub mod cache_url_fetcher;
pub mod errors;
pub mod headers;
pub mod reqwest_fetcher;
pub mod transport;

pub use async_fetch::{AsyncFetch, FetchCallback, FetchHandle, FetchedResource, PendingFetch};
pub use cache_url_fetcher::CacheUrlFetcher;
pub use errors::{FetchError, FetchResult};
pub use headers::{RequestHeaders, ResponseHeaders};
pub use reqwest_fetcher::{ReqwestAsyncFetcher, ReqwestUrlFetcher, TransportSettings};
pub use transport::{BodyStream, FetchFuture, FetchResponse, Transport, UrlAsyncFetcher, UrlFetcher};
