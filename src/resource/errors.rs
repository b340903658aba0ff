//! Error types for resource reads and writes

use std::path::PathBuf;

use crate::fetcher::FetchError;

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// The bytes could not be fetched
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// An output resource was used out of order (write before open, etc.)
    #[error("Output resource is {state}, cannot {operation}")]
    InvalidState {
        state: &'static str,
        operation: &'static str,
    },

    /// Publishing the finished bytes failed
    #[error("Failed to write resource to {path}: {source:#}")]
    Write {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}
