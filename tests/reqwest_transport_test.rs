mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use kodegen_tools_rewriter::fetcher::{
    CacheUrlFetcher, FetchError, ReqwestAsyncFetcher, ReqwestUrlFetcher, RequestHeaders,
    Transport, TransportSettings, UrlFetcher,
};
use kodegen_tools_rewriter::{HttpCache, LruHttpCache};
use mockito::Server;
use tokio::sync::oneshot;

fn settings(max_size: usize) -> TransportSettings {
    TransportSettings {
        timeout: Duration::from_secs(5),
        max_size,
        user_agent: "rewriter-test".to_string(),
    }
}

#[test]
fn blocking_fetch_returns_body_and_headers() {
    init_logging();
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/a.css")
        .match_header("user-agent", "rewriter-test")
        .match_header("accept", "text/css")
        .with_status(200)
        .with_header("content-type", "text/css")
        .with_body("a { color: blue }")
        .create();

    let fetcher = ReqwestUrlFetcher::new(settings(1024)).expect("client");
    let mut request_headers = RequestHeaders::new();
    request_headers.add("Accept", "text/css");
    let mut body = Vec::new();
    let headers = fetcher
        .fetch(&test_url(&server, "/a.css"), &request_headers, &mut body)
        .expect("fetch");

    assert_eq!(headers.status(), 200);
    assert_eq!(headers.content_type(), Some("text/css"));
    assert_eq!(body, b"a { color: blue }");
    mock.assert();
}

#[test]
fn error_status_is_a_status_error() {
    let mut server = Server::new();
    let _mock = create_error_mock(&mut server, "/gone.png", 404);

    let fetcher = ReqwestUrlFetcher::new(settings(1024)).expect("client");
    let mut body = Vec::new();
    let result = fetcher.fetch(&test_url(&server, "/gone.png"), &RequestHeaders::new(), &mut body);

    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })), "{result:?}");
    assert!(body.is_empty());
}

#[test]
fn oversized_body_is_rejected() {
    let mut server = Server::new();
    let _mock = create_bytes_mock(&mut server, "/big.jpg", "image/jpeg", &[0u8; 4096]);

    let fetcher = ReqwestUrlFetcher::new(settings(1024)).expect("client");
    let mut body = Vec::new();
    let result = fetcher.fetch(&test_url(&server, "/big.jpg"), &RequestHeaders::new(), &mut body);

    assert!(matches!(result, Err(FetchError::TooLarge { limit: 1024, .. })), "{result:?}");
    assert!(body.is_empty());
}

#[test]
fn unreachable_host_is_a_transport_error() {
    let fetcher = ReqwestUrlFetcher::new(settings(1024)).expect("client");
    let mut body = Vec::new();
    let result = fetcher.fetch("http://127.0.0.1:1/", &RequestHeaders::new(), &mut body);

    assert!(matches!(result, Err(FetchError::Transport { .. })), "{result:?}");
}

#[test]
fn cache_fetcher_hits_the_network_once() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/logo.png")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(png_with_text_chunk(16))
        .expect(1)
        .create();

    let fetcher = CacheUrlFetcher::new(
        Arc::new(LruHttpCache::with_capacity(8)),
        Transport::Sync(Arc::new(ReqwestUrlFetcher::new(settings(1 << 20)).expect("client"))),
    );
    let url = test_url(&server, "/logo.png");
    for _ in 0..3 {
        let mut body = Vec::new();
        let headers = fetcher
            .fetch_synchronously(&url, &RequestHeaders::new(), &mut body)
            .expect("fetch");
        assert_eq!(headers.content_type(), Some("image/png"));
        assert_eq!(body, png_with_text_chunk(16));
    }
    mock.assert();
}

#[tokio::test(flavor = "multi_thread")]
async fn async_transport_streams_into_cache() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/app.js")
        .with_status(200)
        .with_header("content-type", "text/javascript")
        .with_body("run()")
        .expect(1)
        .create_async()
        .await;

    let transport = ReqwestAsyncFetcher::new(settings(1024)).expect("client");
    let fetcher = CacheUrlFetcher::new(
        Arc::new(LruHttpCache::with_capacity(8)),
        Transport::Async {
            fetcher: Arc::new(transport),
            runtime: tokio::runtime::Handle::current(),
        },
    );
    let url = test_url(&server, "/app.js");

    let (tx, rx) = oneshot::channel();
    let handle = fetcher.fetch_asynchronously(&url, &RequestHeaders::new(), move |outcome| {
        let _ = tx.send(outcome);
    });
    let fetched = rx.await.expect("completion").expect("fetch");
    assert_eq!(fetched.body, b"run()");
    handle.finished().await;

    let again = fetcher.fetch(&url, &RequestHeaders::new()).await.expect("hit");
    assert_eq!(again.headers.content_type(), Some("text/javascript"));
    mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn async_transport_rejects_oversized_body() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/huge.gif")
        .with_status(200)
        .with_body(vec![7u8; 4096])
        .create_async()
        .await;

    let fetcher = CacheUrlFetcher::new(
        Arc::new(LruHttpCache::with_capacity(8)),
        Transport::Async {
            fetcher: Arc::new(ReqwestAsyncFetcher::new(settings(100)).expect("client")),
            runtime: tokio::runtime::Handle::current(),
        },
    );
    let url = test_url(&server, "/huge.gif");

    let result = fetcher.fetch(&url, &RequestHeaders::new()).await;
    assert!(matches!(result, Err(FetchError::TooLarge { limit: 100, .. })), "{result:?}");
    assert!(fetcher.cache().lookup(&url).is_none());
}
