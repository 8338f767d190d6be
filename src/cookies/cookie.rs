//! The [`Cookie`] record kept by cookie stores.
//!
//! A cookie is identified by its `(domain, path, name)` triple. Storing a
//! cookie with the same triple replaces the value, flags and expiry but keeps
//! the original creation time and insertion sequence, so request ordering
//! stays stable across refreshes.
//!
//! The record can be (de)serialized via `serde`, which is what
//! [`CookieStore::cookies`](crate::cookies::CookieStore::cookies) snapshots are
//! meant for.
//!
//! ```rust
//! use pipeline_cookies::cookies::{CookieStore, InMemoryCookieStore};
//! use http::{HeaderMap, header::SET_COOKIE};
//! use url::Url;
//!
//! let store = InMemoryCookieStore::new();
//! let url = Url::parse("https://example.com/account/login").unwrap();
//!
//! let mut headers = HeaderMap::new();
//! headers.insert(SET_COOKIE, "session=abc123; Secure; HttpOnly".parse().unwrap());
//! store.store(&url, &headers).unwrap();
//!
//! let cookies = store.cookies().unwrap();
//! assert_eq!(cookies[0].name, "session");
//! assert_eq!(cookies[0].path, "/account");
//! assert!(cookies[0].host_only);
//! ```

use crate::cookies::matching::{domain_matches, path_matches, RequestTarget};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name (case-sensitive).
    pub name: String,

    /// Raw cookie value (not URL-decoded).
    pub value: String,

    /// Lower-cased domain without a leading dot.
    pub domain: String,

    /// `true` when the cookie was set without a `Domain` attribute and only
    /// applies to the exact host that set it.
    pub host_only: bool,

    /// Path scoping (e.g., `"/"`).
    pub path: String,

    /// If `true`, cookie is sent only over secure schemes.
    pub secure: bool,

    /// Recorded from the response; has no effect on a non-browser client.
    pub http_only: bool,

    /// Expiration timestamp. Session cookies have `None`.
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires: Option<OffsetDateTime>,

    /// When the cookie was first stored.
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,

    /// Insertion order within the store, breaks ties between equal creation times.
    pub sequence: u64,
}

impl Cookie {
    pub fn is_session(&self) -> bool {
        self.expires.is_none()
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires.is_some_and(|at| at <= now)
    }

    /// Returns the `name=value` pair as sent in a `Cookie` header.
    pub fn pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    /// Checks domain, path and secure scoping against a request target.
    pub(crate) fn matches(&self, target: &RequestTarget<'_>) -> bool {
        let domain_ok = if self.host_only {
            target.host.eq_ignore_ascii_case(&self.domain)
        } else {
            domain_matches(target.host, &self.domain, target.is_ip)
        };

        domain_ok && path_matches(target.path, &self.path) && (!self.secure || target.secure)
    }
}
