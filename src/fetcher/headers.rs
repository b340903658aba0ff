//! Request and response header sets exchanged with transports and caches

use serde::{Deserialize, Serialize};

/// Headers sent along with a fetch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestHeaders {
    headers: Vec<(String, String)>,
}

impl RequestHeaders {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// First value of the named header (case-insensitive)
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// Status line and headers of a response
///
/// Stored verbatim in cache entries, so it is serializable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHeaders {
    status: u16,
    headers: Vec<(String, String)>,
}

impl Default for ResponseHeaders {
    fn default() -> Self {
        Self::new(200)
    }
}

impl ResponseHeaders {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// 2xx responses are the only ones worth caching or rewriting
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// First value of the named header (case-insensitive)
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.lookup("content-type")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut headers = ResponseHeaders::new(200);
        headers.add("Content-Type", "image/png");
        assert_eq!(headers.content_type(), Some("image/png"));
        assert_eq!(headers.lookup("CONTENT-TYPE"), Some("image/png"));
        assert_eq!(headers.lookup("etag"), None);
    }

    #[test]
    fn success_range() {
        assert!(ResponseHeaders::new(204).is_success());
        assert!(!ResponseHeaders::new(304).is_success());
        assert!(!ResponseHeaders::new(404).is_success());
    }
}
