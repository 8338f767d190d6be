use crate::PipelineError;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use url::Url;

/// An outgoing HTTP request travelling down the pipeline.
///
/// The target is kept as the caller supplied it. It is only parsed by the
/// stages that need a URL, so an unparseable target surfaces as a failed
/// request instead of a panic at construction time.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Request method (GET, POST, ...)
    pub method: Method,

    /// Request target as supplied by the caller.
    pub url: String,

    /// Request headers. Stages are free to mutate these in place.
    pub headers: HeaderMap,

    /// Raw request body.
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Parses the target into an absolute URL with a host.
    pub fn target_url(&self) -> Result<Url, PipelineError> {
        let url = Url::parse(&self.url)
            .map_err(|e| PipelineError::InvalidRequest(format!("{}: {e}", self.url)))?;

        if url.host_str().map_or(true, str::is_empty) {
            return Err(PipelineError::InvalidRequest(format!("{}: missing host", self.url)));
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::ACCEPT;

    #[test]
    fn target_url_parses_absolute_urls() {
        let req = HttpRequest::get("https://example.com/a?b=c");
        let url = req.target_url().unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.path(), "/a");
    }

    #[test]
    fn target_url_rejects_garbage_and_hostless_urls() {
        for target in ["not a url", "/relative/path", "mailto:someone@example.com", "data:text/plain,x"] {
            let err = HttpRequest::get(target).target_url().unwrap_err();
            assert!(matches!(err, PipelineError::InvalidRequest(_)), "{target} should be rejected");
        }
    }

    #[test]
    fn builder_helpers_fill_fields() {
        let req = HttpRequest::new(Method::POST, "https://example.com/")
            .with_header(ACCEPT, HeaderValue::from_static("application/json"))
            .with_body("{}");
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.headers.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(req.body, b"{}");
    }
}
