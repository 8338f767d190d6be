//! Cookie store infrastructure.
//!
//! A **cookie store** is the single source of truth for cookies inside one
//! pipeline. The cookie policy asks it which cookies apply to an outgoing
//! request and hands it every response so it can pick up `Set-Cookie` headers.
//!
//! - A store is created once per pipeline configuration and shared by every
//!   request travelling through that pipeline via a [`CookieStoreHandle`].
//! - Implementations must be `Send + Sync` and do their **own** internal
//!   synchronization; callers only ever hold `&self`.
//! - A lookup that starts after a [`CookieStore::store`] call has returned
//!   must observe that call's effects.
//!
//! This module exports one reference implementation, [`InMemoryCookieStore`],
//! which lives as long as the pipeline holding it.
mod in_memory;

use crate::cookies::{Cookie, CookieError};
use http::HeaderMap;
use std::sync::Arc;
use url::Url;

pub use in_memory::InMemoryCookieStore;

/// A handle to a cookie store trait.
///
/// This is a reference-counted pointer to a type-erased [`CookieStore`].
/// Store implementations must be **`Send + Sync` and internally synchronized**.
pub type CookieStoreHandle = Arc<dyn CookieStore + Send + Sync>;

/// Summary of what a single [`CookieStore::store`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOutcome {
    /// Cookies inserted or replaced
    pub stored: usize,
    /// Existing cookies deleted by an expired `Set-Cookie`
    pub removed: usize,
    /// `Set-Cookie` values dropped as malformed or refused
    pub rejected: usize,
}

impl StoreOutcome {
    pub fn is_empty(&self) -> bool {
        self.stored == 0 && self.removed == 0 && self.rejected == 0
    }
}

pub trait CookieStore: Send + Sync {
    /// Returns the request headers (a single `Cookie` header) to send to `url`.
    ///
    /// Only non-expired cookies whose domain, path and secure scoping match
    /// `url` are included, ordered by longer path first, then by creation.
    /// An empty map means nothing matches; this is never an error.
    fn cookies_for(&self, url: &Url) -> Result<HeaderMap, CookieError>;

    /// Applies every `Set-Cookie` header in `headers`, received from `url`.
    ///
    /// Malformed values are dropped one by one and counted in
    /// [`StoreOutcome::rejected`]. Fails only when `url` has no host or the
    /// store itself is unavailable.
    fn store(&self, url: &Url, headers: &HeaderMap) -> Result<StoreOutcome, CookieError>;

    /// Removes every cookie named `name` that would be sent to `url`.
    /// Returns how many were removed.
    fn remove(&self, url: &Url, name: &str) -> Result<usize, CookieError>;

    /// Removes all cookies from the store.
    fn clear(&self) -> Result<(), CookieError>;

    /// Snapshot of all non-expired cookies, in request order.
    ///
    /// This is primarily intended for diagnostics/inspection.
    fn cookies(&self) -> Result<Vec<Cookie>, CookieError>;
}
