//! Minimal HTTP response model.
//!
//! This struct represents a **fully buffered** HTTP response handed back up
//! the pipeline. It contains the final URL, the status code, the response
//! headers and the raw body bytes.
//!
//! ## Notes
//! - `headers` is an `http::HeaderMap`, which is **case-insensitive** for
//!   header names and keeps every value of repeated headers such as
//!   `Set-Cookie`.
//! - Policies read response headers but do not alter them.
//!
use http::{HeaderMap, StatusCode};
use url::Url;

/// Simple structure for HTTP responses.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Final URL of the response (after redirects, if the transport follows them).
    pub url: Url,

    /// HTTP status code.
    pub status: StatusCode,

    /// Response headers as a case-insensitive multimap.
    pub headers: HeaderMap,

    /// Raw response body bytes.
    ///
    /// Convert to text with `String::from_utf8_lossy`, or parse as binary/JSON
    /// depending on the `Content-Type`.
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(url: Url, status: StatusCode) -> Self {
        Self {
            url,
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Human-readable reason phrase (e.g., `"OK"`, `"Not Found"`).
    ///
    /// `"Unknown"` for non-standard codes.
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Unknown")
    }
}
