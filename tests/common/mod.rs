//! Test utilities and helper functions for the rewriter test suite

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use kodegen_tools_rewriter::fetcher::{
    CacheUrlFetcher, FetchError, FetchFuture, FetchResponse, FetchResult, RequestHeaders,
    ResponseHeaders, Transport, UrlAsyncFetcher, UrlFetcher,
};
use kodegen_tools_rewriter::resource::{
    ContentType, InputResource, OutputResource, ResourceError, ResourceManager, ResourceStore,
};
use kodegen_tools_rewriter::{HttpCache, LruHttpCache, RewriteConfig};
use mockito::{Mock, Server};
use tempfile::TempDir;
use tokio::sync::Semaphore;

/// Route log output through the test harness
#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Creates a temporary directory for test output
#[allow(dead_code)]
pub fn create_test_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test HTML document with specified content
#[allow(dead_code)]
pub fn create_test_html(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>",
        html_escape::encode_text(title),
        body
    )
}

/// Configuration publishing into `output_dir` under `http://cdn.example.com/r/`
#[allow(dead_code)]
pub fn test_config(output_dir: &Path) -> RewriteConfig {
    RewriteConfig::builder()
        .output_dir(output_dir)
        .url_prefix("http://cdn.example.com/r")
        .build()
        .expect("Failed to create test config")
}

/// Prefix every published URL in tests starts with
#[allow(dead_code)]
pub const CDN_PREFIX: &str = "http://cdn.example.com/r/";

// ----------------------------------------------------------------------
// Transports
// ----------------------------------------------------------------------

#[derive(Clone)]
pub struct FakeResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl FakeResponse {
    #[allow(dead_code)]
    pub fn ok(content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: content_type.to_string(),
            body,
        }
    }

    #[allow(dead_code)]
    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain".to_string(),
            body: b"Error".to_vec(),
        }
    }

    fn headers(&self) -> ResponseHeaders {
        let mut headers = ResponseHeaders::new(self.status);
        headers.add("Content-Type", self.content_type.clone());
        headers
    }
}

/// In-memory transport serving fixed responses, usable both blocking and async
///
/// URLs without a response fail with a transport error. The async side waits
/// for a permit from `gate` when one is installed.
#[derive(Default)]
pub struct FakeTransport {
    responses: HashMap<String, FakeResponse>,
    calls: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
}

impl FakeTransport {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn with(mut self, url: &str, response: FakeResponse) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    /// Hold async fetches until the returned semaphore gets permits
    #[allow(dead_code)]
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, url: &str) -> FetchResult<FakeResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Transport {
                url: url.to_string(),
                message: "connection refused".to_string(),
            })
    }
}

impl UrlFetcher for FakeTransport {
    fn fetch(
        &self,
        url: &str,
        _request_headers: &RequestHeaders,
        sink: &mut dyn Write,
    ) -> FetchResult<ResponseHeaders> {
        let response = self.lookup(url)?;
        sink.write_all(&response.body)
            .map_err(|e| FetchError::Write {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(response.headers())
    }
}

impl UrlAsyncFetcher for FakeTransport {
    fn fetch_async(&self, url: &str, _request_headers: &RequestHeaders) -> FetchFuture {
        let response = self.lookup(url);
        let gate = self.gate.clone();
        Box::pin(async move {
            if let Some(gate) = gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }
            let response = response?;
            // Deliver the body in two chunks to exercise accumulation
            let split = response.body.len() / 2;
            let (first, second) = response.body.split_at(split);
            let chunks = vec![Ok(first.to_vec()), Ok(second.to_vec())];
            Ok(FetchResponse {
                headers: response.headers(),
                body: Box::pin(futures::stream::iter(chunks)),
            })
        })
    }
}

/// A fetcher over an LRU cache and a blocking fake transport
#[allow(dead_code)]
pub fn sync_fetcher(transport: Arc<FakeTransport>) -> Arc<CacheUrlFetcher> {
    Arc::new(CacheUrlFetcher::new(
        Arc::new(LruHttpCache::with_capacity(64)),
        Transport::Sync(transport),
    ))
}

/// A fetcher over an LRU cache and an async fake transport on `runtime`
#[allow(dead_code)]
pub fn async_fetcher(
    cache: Arc<dyn HttpCache>,
    transport: Arc<FakeTransport>,
    runtime: tokio::runtime::Handle,
) -> Arc<CacheUrlFetcher> {
    Arc::new(CacheUrlFetcher::new(
        cache,
        Transport::Async {
            fetcher: transport,
            runtime,
        },
    ))
}

/// Resource store publishing under the test CDN prefix
#[allow(dead_code)]
pub fn test_store(output_dir: &Path, fetcher: Arc<CacheUrlFetcher>) -> Arc<ResourceManager> {
    Arc::new(ResourceManager::new(output_dir, CDN_PREFIX, fetcher))
}

// ----------------------------------------------------------------------
// Stores that fail
// ----------------------------------------------------------------------

/// Output resource that accepts writes but fails to publish
#[allow(dead_code)]
pub struct UnpublishableOutput {
    content_type: ContentType,
}

impl OutputResource for UnpublishableOutput {
    fn content_type(&self) -> ContentType {
        self.content_type
    }

    fn open(&mut self) -> Result<(), ResourceError> {
        Ok(())
    }

    fn write_chunk(&mut self, _bytes: &[u8]) -> Result<(), ResourceError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), ResourceError> {
        Err(ResourceError::Write {
            path: "/dev/full".into(),
            source: anyhow::anyhow!("No space left on device"),
        })
    }

    fn is_readable(&self) -> bool {
        false
    }

    fn url(&self) -> Option<&str> {
        None
    }
}

/// Store whose output resources never publish; input goes to `inner`
#[allow(dead_code)]
pub struct UnwritableStore {
    pub inner: Arc<dyn ResourceStore>,
}

impl ResourceStore for UnwritableStore {
    fn create_input_resource(&self, url: &str) -> Option<Box<dyn InputResource>> {
        self.inner.create_input_resource(url)
    }

    fn create_output_resource(&self, content_type: ContentType) -> Box<dyn OutputResource> {
        Box::new(UnpublishableOutput { content_type })
    }
}

/// Output resource that closes cleanly yet never becomes readable
///
/// `url` is what the resource reports as its address, if anything.
#[allow(dead_code)]
pub struct UnreadableOutput {
    content_type: ContentType,
    url: Option<String>,
}

impl OutputResource for UnreadableOutput {
    fn content_type(&self) -> ContentType {
        self.content_type
    }

    fn open(&mut self) -> Result<(), ResourceError> {
        Ok(())
    }

    fn write_chunk(&mut self, _bytes: &[u8]) -> Result<(), ResourceError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), ResourceError> {
        Ok(())
    }

    fn is_readable(&self) -> bool {
        false
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

/// Store whose writes succeed but whose outputs are never readable
#[allow(dead_code)]
pub struct UnreadableStore {
    pub inner: Arc<dyn ResourceStore>,
    pub url: Option<String>,
}

impl ResourceStore for UnreadableStore {
    fn create_input_resource(&self, url: &str) -> Option<Box<dyn InputResource>> {
        self.inner.create_input_resource(url)
    }

    fn create_output_resource(&self, content_type: ContentType) -> Box<dyn OutputResource> {
        Box::new(UnreadableOutput {
            content_type,
            url: self.url.clone(),
        })
    }
}

// ----------------------------------------------------------------------
// Images
// ----------------------------------------------------------------------

fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).expect("encode test image");
    out.into_inner()
}

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 3 % 256) as u8, (y * 5 % 256) as u8, ((x ^ y) % 256) as u8])
    })
}

/// A JPEG at the given encoder quality
#[allow(dead_code)]
pub fn jpeg_bytes(quality: u8) -> Vec<u8> {
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(gradient(96, 96))
        .write_with_encoder(image::codecs::jpeg::JpegEncoder::new_with_quality(
            &mut out, quality,
        ))
        .expect("encode jpeg");
    out
}

/// A small PNG padded with a large `tEXt` chunk after IHDR
#[allow(dead_code)]
pub fn png_with_text_chunk(text_len: usize) -> Vec<u8> {
    const IHDR_END: usize = 8 + 4 + 4 + 13 + 4;
    let png = encode(
        &DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([200, 40, 40, 255]))),
        ImageFormat::Png,
    );

    let mut typed = b"tEXt".to_vec();
    typed.extend_from_slice(b"Comment\0");
    typed.extend(std::iter::repeat_n(b'x', text_len));
    let data_len = (typed.len() - 4) as u32;

    let mut out = png[..IHDR_END].to_vec();
    out.extend_from_slice(&data_len.to_be_bytes());
    out.extend_from_slice(&typed);
    out.extend_from_slice(&crc32fast::hash(&typed).to_be_bytes());
    out.extend_from_slice(&png[IHDR_END..]);
    out
}

/// A small GIF padded with a comment extension before the trailer
#[allow(dead_code)]
pub fn gif_with_comment(blocks: usize) -> Vec<u8> {
    let mut gif = encode(
        &DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([0, 0, 255, 255]))),
        ImageFormat::Gif,
    );
    let trailer = gif.pop();
    assert_eq!(trailer, Some(0x3B), "GIF ends with its trailer");

    gif.extend_from_slice(&[0x21, 0xFE]);
    for _ in 0..blocks {
        gif.push(255);
        gif.extend(std::iter::repeat_n(b'c', 255));
    }
    gif.push(0);
    gif.push(0x3B);
    gif
}

// ----------------------------------------------------------------------
// HTTP mocks
// ----------------------------------------------------------------------

/// Creates a mock endpoint that returns bytes with a content type
#[allow(dead_code)]
pub fn create_bytes_mock(server: &mut Server, path: &str, content_type: &str, body: &[u8]) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", content_type)
        .with_body(body)
        .create()
}

/// Creates a mock endpoint that returns an error
#[allow(dead_code)]
pub fn create_error_mock(server: &mut Server, path: &str, status: usize) -> Mock {
    server
        .mock("GET", path)
        .with_status(status)
        .with_body("Error")
        .create()
}

/// Helper to create test URLs
#[allow(dead_code)]
pub fn test_url(server: &Server, path: &str) -> String {
    format!("{}{}", server.url(), path)
}
