//! Domain and path matching (RFC 6265 §5.1.3, §5.1.4).

use url::{Host, Url};

/// The parts of a request URL that decide which cookies apply to it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RequestTarget<'a> {
    pub host: &'a str,
    pub is_ip: bool,
    pub path: &'a str,
    pub secure: bool,
}

impl<'a> RequestTarget<'a> {
    /// Returns `None` for URLs without a host (`data:`, `file:///`, ...).
    pub fn from_url(url: &'a Url) -> Option<Self> {
        let is_ip = match url.host()? {
            Host::Domain(d) if d.is_empty() => return None,
            Host::Domain(_) => false,
            Host::Ipv4(_) | Host::Ipv6(_) => true,
        };

        Some(Self {
            host: url.host_str()?,
            is_ip,
            path: url.path(),
            secure: is_secure_scheme(url.scheme()),
        })
    }
}

pub(crate) fn is_secure_scheme(scheme: &str) -> bool {
    scheme.eq_ignore_ascii_case("https") || scheme.eq_ignore_ascii_case("wss")
}

/// `host` equals `domain`, or is a subdomain of it. IP hosts only match exactly.
pub(crate) fn domain_matches(host: &str, domain: &str, host_is_ip: bool) -> bool {
    if host.eq_ignore_ascii_case(domain) {
        return true;
    }
    if host_is_ip || domain.is_empty() || host.len() <= domain.len() {
        return false;
    }

    let split = host.len() - domain.len();
    host.is_char_boundary(split)
        && host[split..].eq_ignore_ascii_case(domain)
        && host[..split].ends_with('.')
}

/// Cookie path is a prefix of the request path on a `/` boundary.
pub(crate) fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }
    if !request_path.starts_with(cookie_path) {
        return false;
    }

    cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/')
}

/// Default cookie path: the request path up to, not including, its last `/`.
pub(crate) fn default_path(request_path: &str) -> String {
    if !request_path.starts_with('/') {
        return "/".to_string();
    }

    match request_path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => request_path[..idx].to_string(),
    }
}
