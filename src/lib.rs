pub mod cache;
pub mod config;
pub mod fetcher;
pub mod html;
pub mod image_compression;
pub mod resource;
pub mod rewriter;
pub mod utils;

pub use cache::{CacheEntry, CacheError, FileHttpCache, HttpCache, LruHttpCache};
pub use config::{ConfigError, RewriteConfig, RewriterKind};
pub use fetcher::{
    CacheUrlFetcher, FetchError, FetchHandle, FetchedResource, ReqwestAsyncFetcher,
    ReqwestUrlFetcher, RequestHeaders, ResponseHeaders, Transport, UrlAsyncFetcher, UrlFetcher,
};
pub use html::{HtmlFilter, HtmlParse};
pub use resource::{
    ContentType, ImageType, InputResource, OutputResource, ResourceError, ResourceManager,
    ResourceStore,
};
pub use rewriter::{ImgRewriteFilter, OutlineFilter, RewriteDriver, rewrite_html};

/// Rewrite `html` with the filters enabled in `config`, reading resources
/// over HTTP through an in-memory cache
///
/// Blocking: must not be called from inside an async task.
pub fn rewrite(config: &RewriteConfig, base_url: &str, html: &str) -> anyhow::Result<String> {
    let store = ResourceManager::from_config(config)?;
    Ok(rewrite_html(config, std::sync::Arc::new(store), base_url, html))
}
