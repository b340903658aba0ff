//! Error types for fetch operations

/// Why a fetch produced no usable response
///
/// Messages from the underlying client are flattened to strings so the error
/// can be cloned and handed to completion callbacks on any task.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Only an asynchronous transport is configured; the fetch was started in
    /// the background and the cache will serve a later request
    #[error("{url} is not yet available, fetch started in the background")]
    NotYetAvailable { url: String },

    /// The server answered with a non-2xx status
    #[error("Fetch of {url} failed with status: {status}")]
    Status { url: String, status: u16 },

    /// Connection, protocol or timeout failure
    #[error("Fetch of {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Declared or streamed body larger than the configured limit
    #[error("Resource at {url} exceeds size limit of {limit} bytes")]
    TooLarge { url: String, limit: usize },

    /// The response could not be written to the caller's sink
    #[error("Failed to write response body of {url}: {message}")]
    Write { url: String, message: String },

    /// The fetch task ended without delivering an outcome
    #[error("Fetch of {url} was cancelled")]
    Cancelled { url: String },
}

impl FetchError {
    pub(crate) fn transport(url: &str, error: impl std::fmt::Display) -> Self {
        FetchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }

    /// Flatten an `anyhow` chain (as produced by the transport helpers)
    pub(crate) fn from_anyhow(url: &str, error: &anyhow::Error) -> Self {
        if let Some(fetch_error) = error.downcast_ref::<FetchError>() {
            return fetch_error.clone();
        }
        FetchError::Transport {
            url: url.to_string(),
            message: format!("{error:#}"),
        }
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;
