//! `reqwest`-backed transports
//!
//! Both transports send a browser-like User-Agent, apply the configured
//! timeout, treat non-2xx statuses as failures, and enforce the size limit
//! twice: once against `Content-Length` before reading, and again while the
//! body streams in.

use std::io::{Read, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use futures::StreamExt;

use super::errors::{FetchError, FetchResult};
use super::headers::{RequestHeaders, ResponseHeaders};
use super::transport::{BodyStream, FetchFuture, FetchResponse, UrlAsyncFetcher, UrlFetcher};
use crate::config::RewriteConfig;

/// Size of the read buffer for blocking bodies
const READ_CHUNK_SIZE: usize = 16 * 1024;

/// Settings shared by the two transports
#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub timeout: Duration,
    pub max_size: usize,
    pub user_agent: String,
}

impl From<&RewriteConfig> for TransportSettings {
    fn from(config: &RewriteConfig) -> Self {
        Self {
            timeout: config.fetch_timeout(),
            max_size: config.max_resource_size(),
            user_agent: config.user_agent().to_string(),
        }
    }
}

fn convert_headers(status: reqwest::StatusCode, headers: &reqwest::header::HeaderMap) -> ResponseHeaders {
    let mut response_headers = ResponseHeaders::new(status.as_u16());
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            response_headers.add(name.as_str(), value);
        }
    }
    response_headers
}

fn check_declared_size(url: &str, content_length: Option<u64>, max_size: usize) -> FetchResult<()> {
    let expected_size = content_length.unwrap_or(0);
    if expected_size > max_size as u64 {
        log::debug!("{url}: declared size {expected_size} exceeds limit of {max_size} bytes");
        return Err(FetchError::TooLarge {
            url: url.to_string(),
            limit: max_size,
        });
    }
    Ok(())
}

/// Blocking transport over `reqwest::blocking`
///
/// The blocking client owns its own runtime; it must be created, used and
/// dropped outside of async contexts.
pub struct ReqwestUrlFetcher {
    client: reqwest::blocking::Client,
    settings: TransportSettings,
}

impl ReqwestUrlFetcher {
    pub fn new(settings: TransportSettings) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .context("Failed to build blocking HTTP client")?;
        Ok(Self { client, settings })
    }

    fn fetch_inner(
        &self,
        url: &str,
        request_headers: &RequestHeaders,
        sink: &mut dyn Write,
    ) -> Result<ResponseHeaders> {
        let mut request = self.client.get(url);
        for (name, value) in request_headers.iter() {
            request = request.header(name, value);
        }
        let mut response = request.send().context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }
        check_declared_size(url, response.content_length(), self.settings.max_size)?;
        let headers = convert_headers(status, response.headers());

        let mut chunk = vec![0u8; READ_CHUNK_SIZE];
        let mut body = Vec::new();
        loop {
            let read = response
                .read(&mut chunk)
                .context("Failed to read response body")?;
            if read == 0 {
                break;
            }
            // Check BEFORE accumulating
            if body.len() + read > self.settings.max_size {
                return Err(FetchError::TooLarge {
                    url: url.to_string(),
                    limit: self.settings.max_size,
                }
                .into());
            }
            body.extend_from_slice(&chunk[..read]);
        }

        // The sink only sees a body that passed every check
        sink.write_all(&body)
            .map_err(|e| FetchError::Write {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(headers)
    }
}

impl UrlFetcher for ReqwestUrlFetcher {
    fn fetch(
        &self,
        url: &str,
        request_headers: &RequestHeaders,
        sink: &mut dyn Write,
    ) -> FetchResult<ResponseHeaders> {
        log::debug!("GET {url}");
        self.fetch_inner(url, request_headers, sink)
            .map_err(|e| FetchError::from_anyhow(url, &e))
    }
}

/// Async transport over `reqwest::Client`
#[derive(Clone)]
pub struct ReqwestAsyncFetcher {
    client: reqwest::Client,
    settings: TransportSettings,
}

impl ReqwestAsyncFetcher {
    pub fn new(settings: TransportSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, settings })
    }
}

impl UrlAsyncFetcher for ReqwestAsyncFetcher {
    fn fetch_async(&self, url: &str, request_headers: &RequestHeaders) -> FetchFuture {
        let mut request = self.client.get(url);
        for (name, value) in request_headers.iter() {
            request = request.header(name, value);
        }
        let url = url.to_string();
        let max_size = self.settings.max_size;

        Box::pin(async move {
            log::debug!("GET {url} (async)");
            let response = request
                .send()
                .await
                .map_err(|e| FetchError::transport(&url, e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url,
                    status: status.as_u16(),
                });
            }
            check_declared_size(&url, response.content_length(), max_size)?;
            let headers = convert_headers(status, response.headers());

            // Stream with size checking (second line of defense)
            let body: BodyStream = Box::pin(response.bytes_stream().scan(
                0usize,
                move |total, chunk_result| {
                    let item = match chunk_result {
                        Ok(chunk) => {
                            *total += chunk.len();
                            if *total > max_size {
                                Err(FetchError::TooLarge {
                                    url: url.clone(),
                                    limit: max_size,
                                })
                            } else {
                                Ok(chunk.to_vec())
                            }
                        }
                        Err(e) => Err(FetchError::transport(&url, e)),
                    };
                    futures::future::ready(Some(item))
                },
            ));

            Ok(FetchResponse { headers, body })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_size_over_limit_is_rejected() {
        assert!(check_declared_size("u", Some(11), 10).is_err());
        assert!(check_declared_size("u", Some(10), 10).is_ok());
        assert!(check_declared_size("u", None, 10).is_ok());
    }
}
