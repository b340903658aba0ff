//! Write-side resource handles

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use super::content_type::ContentType;
use super::errors::ResourceError;

/// Bytes to be published under a new URL
///
/// Lifecycle: `open` → `write_chunk`* → `close`. After a successful close the
/// resource is readable, has a stable URL and never changes again. A failed
/// step leaves it unreadable.
pub trait OutputResource: Send {
    fn content_type(&self) -> ContentType;

    fn open(&mut self) -> Result<(), ResourceError>;

    fn write_chunk(&mut self, bytes: &[u8]) -> Result<(), ResourceError>;

    fn close(&mut self) -> Result<(), ResourceError>;

    fn is_readable(&self) -> bool;

    /// Published URL, once readable
    fn url(&self) -> Option<&str>;
}

#[derive(Debug)]
enum OutputState {
    Created,
    Open(Vec<u8>),
    Published {
        url: String,
        path: PathBuf,
        contents: Vec<u8>,
    },
    Failed,
}

impl OutputState {
    fn name(&self) -> &'static str {
        match self {
            OutputState::Created => "not open",
            OutputState::Open(_) => "open",
            OutputState::Published { .. } => "already published",
            OutputState::Failed => "failed",
        }
    }
}

/// Output resource published as a file under a directory
///
/// Chunks are buffered in memory. On `close` the file name is derived from the
/// content hash, so identical bytes always publish to the same URL.
#[derive(Debug)]
pub struct FileOutputResource {
    output_dir: PathBuf,
    url_prefix: String,
    content_type: ContentType,
    state: OutputState,
}

impl FileOutputResource {
    pub fn new(output_dir: impl Into<PathBuf>, url_prefix: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            output_dir: output_dir.into(),
            url_prefix: url_prefix.into(),
            content_type,
            state: OutputState::Created,
        }
    }

    /// File the resource was published to
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.state {
            OutputState::Published { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Published bytes
    #[must_use]
    pub fn contents(&self) -> Option<&[u8]> {
        match &self.state {
            OutputState::Published { contents, .. } => Some(contents),
            _ => None,
        }
    }

    fn file_name(&self, contents: &[u8]) -> String {
        let hash = xxhash_rust::xxh3::xxh3_64(contents);
        format!("{hash:016x}.{}", self.content_type.file_extension())
    }

    fn publish(&self, path: &Path, contents: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create output directory {}", self.output_dir.display())
        })?;
        let mut temp_file =
            NamedTempFile::new_in(&self.output_dir).context("Failed to create temp file")?;
        temp_file
            .write_all(contents)
            .context("Failed to write resource contents")?;
        // Atomic rename to final path
        temp_file
            .persist(path)
            .context("Failed to move resource into place")?;
        Ok(())
    }

    fn invalid(&self, operation: &'static str) -> ResourceError {
        ResourceError::InvalidState {
            state: self.state.name(),
            operation,
        }
    }
}

impl OutputResource for FileOutputResource {
    fn content_type(&self) -> ContentType {
        self.content_type
    }

    fn open(&mut self) -> Result<(), ResourceError> {
        match self.state {
            OutputState::Created => {
                self.state = OutputState::Open(Vec::new());
                Ok(())
            }
            _ => Err(self.invalid("open")),
        }
    }

    fn write_chunk(&mut self, bytes: &[u8]) -> Result<(), ResourceError> {
        match &mut self.state {
            OutputState::Open(buffer) => {
                buffer.extend_from_slice(bytes);
                Ok(())
            }
            _ => Err(self.invalid("write")),
        }
    }

    fn close(&mut self) -> Result<(), ResourceError> {
        let contents = match std::mem::replace(&mut self.state, OutputState::Failed) {
            OutputState::Open(contents) => contents,
            other => {
                self.state = other;
                return Err(self.invalid("close"));
            }
        };

        let name = self.file_name(&contents);
        let path = self.output_dir.join(&name);
        if let Err(source) = self.publish(&path, &contents) {
            return Err(ResourceError::Write { path, source });
        }

        let url = format!("{}{}", self.url_prefix, name);
        log::debug!("Published {} bytes of {} as {url}", contents.len(), self.content_type);
        self.state = OutputState::Published {
            url,
            path,
            contents,
        };
        Ok(())
    }

    fn is_readable(&self) -> bool {
        matches!(self.state, OutputState::Published { .. })
    }

    fn url(&self) -> Option<&str> {
        match &self.state {
            OutputState::Published { url, .. } => Some(url),
            _ => None,
        }
    }
}
