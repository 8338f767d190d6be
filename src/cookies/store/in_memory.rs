//! In-memory cookie store.
//!
//! Cookies are bucketed by **scope** (`domain`, `path`); within a bucket a
//! cookie name appears at most once. All state sits behind one `RwLock`:
//! lookups share a read lock, and every [`CookieStore::store`] call applies
//! all of its `Set-Cookie` values under a single write lock, so no reader ever
//! sees a partially applied response.
//!
//! Parsing happens before the lock is taken. The lock is never held across an
//! `.await`; none of these methods are async.
//!
//! Limits from [`CookieStoreConfig`] are enforced on insert: expired cookies
//! are purged first, then the oldest cookie (lowest insertion sequence) of
//! the same domain, or of the whole store, is evicted.
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::CookieStoreConfig;
use crate::cookies::matching::RequestTarget;
use crate::cookies::parse::{parse_set_cookie, resolve, CookieUpdate};
use crate::cookies::store::{CookieStore, CookieStoreHandle, StoreOutcome};
use crate::cookies::{Cookie, CookieError};
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};
use time::OffsetDateTime;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CookieScope {
    domain: String,
    path: String,
}

impl CookieScope {
    fn of(cookie: &Cookie) -> Self {
        Self {
            domain: cookie.domain.clone(),
            path: cookie.path.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct CookieTable {
    scopes: HashMap<CookieScope, Vec<Cookie>>,
    /// Sequence number handed to the next newly inserted cookie
    next_sequence: u64,
    /// Number of cookies across all scopes
    len: usize,
}

impl CookieTable {
    fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.scopes.values().flatten()
    }

    fn upsert(&mut self, mut cookie: Cookie, config: &CookieStoreConfig, now: OffsetDateTime) {
        let scope = CookieScope::of(&cookie);

        // Replace existing cookie with same (domain, path, name)
        if let Some(existing) = self
            .scopes
            .get_mut(&scope)
            .and_then(|bucket| bucket.iter_mut().find(|c| c.name == cookie.name))
        {
            cookie.created = existing.created;
            cookie.sequence = existing.sequence;
            *existing = cookie;
            return;
        }

        self.make_room(&cookie.domain, config, now);

        cookie.sequence = self.next_sequence;
        self.next_sequence += 1;
        self.scopes.entry(scope).or_default().push(cookie);
        self.len += 1;
    }

    fn make_room(&mut self, domain: &str, config: &CookieStoreConfig, now: OffsetDateTime) {
        if self.domain_len(domain) >= config.max_cookies_per_domain {
            self.purge_expired(now);
            while self.domain_len(domain) >= config.max_cookies_per_domain && self.evict_oldest(Some(domain)) {}
        }

        if self.len >= config.max_cookies {
            self.purge_expired(now);
            while self.len >= config.max_cookies && self.evict_oldest(None) {}
        }
    }

    fn domain_len(&self, domain: &str) -> usize {
        self.scopes
            .iter()
            .filter(|(scope, _)| scope.domain == domain)
            .map(|(_, bucket)| bucket.len())
            .sum()
    }

    fn remove(&mut self, domain: &str, path: &str, name: &str) -> bool {
        let scope = CookieScope {
            domain: domain.to_string(),
            path: path.to_string(),
        };
        let removed = self.retain_in(&scope, |c| c.name != name);
        removed > 0
    }

    /// Keeps cookies in `scope` for which `keep` returns true; drops the bucket when emptied.
    fn retain_in(&mut self, scope: &CookieScope, keep: impl Fn(&Cookie) -> bool) -> usize {
        let Some(bucket) = self.scopes.get_mut(scope) else {
            return 0;
        };

        let before = bucket.len();
        bucket.retain(|c| keep(c));
        let removed = before - bucket.len();
        if bucket.is_empty() {
            self.scopes.remove(scope);
        }
        self.len -= removed;
        removed
    }

    /// Keeps cookies across all scopes for which `keep` returns true.
    fn retain(&mut self, keep: impl Fn(&Cookie) -> bool) -> usize {
        let before = self.len;
        self.scopes.retain(|_, bucket| {
            bucket.retain(|c| keep(c));
            !bucket.is_empty()
        });
        self.len = self.scopes.values().map(Vec::len).sum();
        before - self.len
    }

    fn purge_expired(&mut self, now: OffsetDateTime) -> usize {
        let purged = self.retain(|c| !c.is_expired(now));
        if purged > 0 {
            log::trace!("purged {purged} expired cookies");
        }
        purged
    }

    fn evict_oldest(&mut self, domain: Option<&str>) -> bool {
        let oldest = self
            .scopes
            .iter()
            .filter(|(scope, _)| domain.map_or(true, |d| scope.domain == d))
            .flat_map(|(scope, bucket)| bucket.iter().map(move |c| (scope, c)))
            .min_by_key(|(_, c)| c.sequence)
            .map(|(scope, c)| (scope.clone(), c.sequence));

        let Some((scope, sequence)) = oldest else {
            return false;
        };

        log::trace!("evicting oldest cookie for domain {}", scope.domain);
        self.retain_in(&scope, |c| c.sequence != sequence) > 0
    }
}

/// Longer path first, then earlier creation, then insertion order.
fn request_order(a: &Cookie, b: &Cookie) -> Ordering {
    b.path
        .len()
        .cmp(&a.path.len())
        .then_with(|| a.created.cmp(&b.created))
        .then_with(|| a.sequence.cmp(&b.sequence))
}

/// Cookie store which keeps its cookies in memory for the lifetime of the
/// pipeline. No persistence.
#[derive(Debug, Default)]
pub struct InMemoryCookieStore {
    config: CookieStoreConfig,
    table: RwLock<CookieTable>,
}

impl InMemoryCookieStore {
    /// Creates an empty store with the default limits and accept policy.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CookieStoreConfig) -> Self {
        Self {
            config,
            table: RwLock::new(CookieTable::default()),
        }
    }

    /// Wraps the store into a shareable [`CookieStoreHandle`].
    pub fn into_handle(self) -> CookieStoreHandle {
        Arc::new(self)
    }

    pub fn config(&self) -> &CookieStoreConfig {
        &self.config
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CookieTable>, CookieError> {
        self.table.read().map_err(|_| CookieError::StoreUnavailable)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, CookieTable>, CookieError> {
        self.table.write().map_err(|_| CookieError::StoreUnavailable)
    }
}

impl CookieStore for InMemoryCookieStore {
    fn cookies_for(&self, url: &Url) -> Result<HeaderMap, CookieError> {
        let mut headers = HeaderMap::new();
        let Some(target) = RequestTarget::from_url(url) else {
            return Ok(headers);
        };

        let now = OffsetDateTime::now_utc();
        let value = {
            let table = self.read()?;
            let mut matched: Vec<&Cookie> = table
                .iter()
                .filter(|c| !c.is_expired(now) && c.matches(&target))
                .collect();
            if matched.is_empty() {
                return Ok(headers);
            }

            matched.sort_by(|a, b| request_order(a, b));
            matched.iter().map(|c| c.pair()).collect::<Vec<_>>().join("; ")
        };

        let value = HeaderValue::from_str(&value).map_err(|e| CookieError::Malformed(e.to_string()))?;
        headers.insert(COOKIE, value);
        Ok(headers)
    }

    fn store(&self, url: &Url, headers: &HeaderMap) -> Result<StoreOutcome, CookieError> {
        let target = RequestTarget::from_url(url).ok_or_else(|| CookieError::InvalidUri(url.to_string()))?;
        let now = OffsetDateTime::now_utc();
        let mut outcome = StoreOutcome::default();

        let mut updates = Vec::new();
        for raw in headers.get_all(SET_COOKIE) {
            let update = raw
                .to_str()
                .map_err(|_| CookieError::Malformed("Set-Cookie value is not visible ASCII".into()))
                .and_then(|raw| parse_set_cookie(raw, now))
                .and_then(|parsed| resolve(parsed, &target, self.config.accept, now));

            match update {
                Ok(update) => updates.push(update),
                Err(e) => {
                    log::debug!("dropping cookie from {}: {}", target.host, e);
                    outcome.rejected += 1;
                }
            }
        }

        if updates.is_empty() {
            return Ok(outcome);
        }

        let mut table = self.write()?;
        table.purge_expired(now);
        for update in updates {
            match update {
                CookieUpdate::Upsert(cookie) => {
                    table.upsert(cookie, &self.config, now);
                    outcome.stored += 1;
                }
                CookieUpdate::Remove { domain, path, name } => {
                    if table.remove(&domain, &path, &name) {
                        outcome.removed += 1;
                    }
                }
            }
        }

        Ok(outcome)
    }

    fn remove(&self, url: &Url, name: &str) -> Result<usize, CookieError> {
        let target = RequestTarget::from_url(url).ok_or_else(|| CookieError::InvalidUri(url.to_string()))?;
        let mut table = self.write()?;
        Ok(table.retain(|c| !(c.name == name && c.matches(&target))))
    }

    fn clear(&self) -> Result<(), CookieError> {
        let mut table = self.write()?;
        *table = CookieTable {
            next_sequence: table.next_sequence,
            ..CookieTable::default()
        };
        Ok(())
    }

    fn cookies(&self) -> Result<Vec<Cookie>, CookieError> {
        let now = OffsetDateTime::now_utc();
        let table = self.read()?;
        let mut cookies: Vec<Cookie> = table.iter().filter(|c| !c.is_expired(now)).cloned().collect();
        cookies.sort_by(|a, b| a.domain.cmp(&b.domain).then_with(|| request_order(a, b)));
        Ok(cookies)
    }
}
