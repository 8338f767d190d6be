//! Pipeline and cookie store configuration.
//!
//! [`PipelineConfig`] holds the settings for a whole pipeline (transport
//! identity, timeouts) and embeds the [`CookieStoreConfig`] used when the
//! cookie policy factory has to build its own store.
//!
//! Both provide sensible defaults via [`Default`]. The cookie store config
//! also has a fluent [`CookieStoreConfig::builder()`] that validates limits.
//!
//! ```rust
//! use pipeline_cookies::config::{CookieAcceptPolicy, CookieStoreConfig};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = CookieStoreConfig::builder()
//!     .accept(CookieAcceptPolicy::OriginalServer)
//!     .max_cookies_per_domain(20)
//!     .max_cookies(500)
//!     .build()?;
//! assert_eq!(cfg.max_cookies_per_domain, 20);
//! # Ok(()) }
//! ```

use std::fmt;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = "pipeline-cookies/0.1";

/// Which cookies a store is willing to accept from responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CookieAcceptPolicy {
    /// Only cookies whose `Domain` matches the host that sent them.
    #[default]
    OriginalServer,
    /// Also cookies scoped to a domain other than the responding host.
    All,
    /// Reject every cookie.
    None,
}

/// Cookie store configuration.
#[derive(Debug, Clone)]
pub struct CookieStoreConfig {
    /// Which cookies are accepted from responses
    pub accept: CookieAcceptPolicy,
    /// Maximum number of cookies kept per domain before the oldest is evicted
    pub max_cookies_per_domain: usize,
    /// Maximum number of cookies kept in total before the oldest is evicted
    pub max_cookies: usize,
}

impl Default for CookieStoreConfig {
    fn default() -> Self {
        Self {
            accept: CookieAcceptPolicy::OriginalServer,
            max_cookies_per_domain: 50,
            max_cookies: 3000,
        }
    }
}

impl CookieStoreConfig {
    pub fn builder() -> CookieStoreConfigBuilder {
        CookieStoreConfigBuilder::default()
    }
}

/// Builder for [`CookieStoreConfig`].
#[derive(Debug, Clone, Default)]
pub struct CookieStoreConfigBuilder {
    inner: CookieStoreConfig,
}

impl CookieStoreConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut CookieStoreConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn accept(self, policy: CookieAcceptPolicy) -> Self { self.map(|c| c.accept = policy) }
    pub fn max_cookies_per_domain(self, n: usize) -> Self { self.map(|c| c.max_cookies_per_domain = n) }
    pub fn max_cookies(self, n: usize) -> Self { self.map(|c| c.max_cookies = n) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<CookieStoreConfig, ConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

/// Main pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// User agent string sent by the transport
    pub user_agent: String,
    /// Per-request timeout applied by the transport (none by default)
    pub request_timeout: Option<Duration>,
    /// Configuration for stores created by the cookie policy factory
    pub cookies: CookieStoreConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: None,
            cookies: CookieStoreConfig::default(),
        }
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroLimit(&'static str),
    DomainLimitLarger { per_domain: usize, total: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroLimit(field) =>
                write!(f, "{field} must be at least 1"),
            ConfigError::DomainLimitLarger { per_domain, total } =>
                write!(f, "max_cookies_per_domain ({per_domain}) > max_cookies ({total})"),
        }
    }
}
impl std::error::Error for ConfigError {}

fn validate(c: &CookieStoreConfig) -> Result<(), ConfigError> {
    if c.max_cookies_per_domain == 0 {
        return Err(ConfigError::ZeroLimit("max_cookies_per_domain"));
    }
    if c.max_cookies == 0 {
        return Err(ConfigError::ZeroLimit("max_cookies"));
    }
    if c.max_cookies_per_domain > c.max_cookies {
        return Err(ConfigError::DomainLimitLarger {
            per_domain: c.max_cookies_per_domain,
            total: c.max_cookies,
        });
    }
    Ok(())
}
