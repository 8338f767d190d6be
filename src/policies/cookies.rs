//! Cookie policy: attaches stored cookies to requests and stores the cookies
//! that responses set.
//!
//! For every request the policy
//! 1. parses the target URL (an invalid target fails the request before it
//!    reaches the next stage),
//! 2. overwrites the request's `Cookie` header with what the store holds for
//!    that URL (only when the store has matches),
//! 3. awaits the next stage, and
//! 4. hands the response headers to the store **before** returning the
//!    response, so whoever receives it can rely on the store being updated.
//!
//! A failed next stage leaves the store untouched. Dropping the returned
//! future before the next stage answers does the same, since the store
//! update only runs after the await completes.
use crate::config::CookieStoreConfig;
use crate::cookies::{CookieStoreHandle, InMemoryCookieStore};
use crate::pipeline::{
    HttpRequest, PolicyFuture, RequestPolicy, RequestPolicyFactory, RequestPolicyHandle, RequestPolicyOptions,
};
use futures::FutureExt;
use log::Level;
use std::sync::Arc;

/// Pipeline stage that injects and extracts cookies around one exchange.
pub struct CookiePolicy {
    store: CookieStoreHandle,
    next: RequestPolicyHandle,
    log_cookies: bool,
}

impl CookiePolicy {
    pub fn new(store: CookieStoreHandle, next: RequestPolicyHandle, options: &RequestPolicyOptions) -> Self {
        Self {
            store,
            next,
            log_cookies: options.should_log(Level::Debug),
        }
    }
}

impl RequestPolicy for CookiePolicy {
    fn send(&self, mut request: HttpRequest) -> PolicyFuture {
        let store = self.store.clone();
        let next = self.next.clone();
        let log_cookies = self.log_cookies;

        async move {
            let url = request.target_url()?;

            let cookie_headers = store.cookies_for(&url)?;
            for name in cookie_headers.keys() {
                request.headers.remove(name);
            }
            for (name, value) in cookie_headers.iter() {
                request.headers.append(name.clone(), value.clone());
            }
            if log_cookies && !cookie_headers.is_empty() {
                log::debug!("attached stored cookies to {} {}", request.method, url);
            }

            let response = next.send(request).await?;

            let outcome = store.store(&url, &response.headers)?;
            if log_cookies && !outcome.is_empty() {
                log::debug!(
                    "cookies from {}: {} stored, {} removed, {} rejected",
                    url,
                    outcome.stored,
                    outcome.removed,
                    outcome.rejected
                );
            }

            Ok(response)
        }
        .boxed()
    }
}

/// Creates [`CookiePolicy`] stages that all share one cookie store.
///
/// The store lives as long as the factory or any policy it created.
pub struct CookiePolicyFactory {
    store: CookieStoreHandle,
}

impl CookiePolicyFactory {
    /// Factory backed by a fresh in-memory store with default settings.
    pub fn new() -> Self {
        Self::with_config(CookieStoreConfig::default())
    }

    /// Factory backed by a fresh in-memory store built from `config`.
    pub fn with_config(config: CookieStoreConfig) -> Self {
        Self::with_store(InMemoryCookieStore::with_config(config).into_handle())
    }

    /// Factory backed by an explicitly constructed store.
    pub fn with_store(store: CookieStoreHandle) -> Self {
        Self { store }
    }

    /// Returns the shared store, e.g. for inspection.
    pub fn store(&self) -> CookieStoreHandle {
        self.store.clone()
    }
}

impl Default for CookiePolicyFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestPolicyFactory for CookiePolicyFactory {
    fn create(&self, next: RequestPolicyHandle, options: &RequestPolicyOptions) -> RequestPolicyHandle {
        Arc::new(CookiePolicy::new(self.store.clone(), next, options))
    }
}
