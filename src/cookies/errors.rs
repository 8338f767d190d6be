#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CookieError {
    /// The URL carries no host to scope cookies to.
    #[error("Invalid cookie URI: {0}")]
    InvalidUri(String),

    /// A single `Set-Cookie` value could not be used. Recovered inside the store.
    #[error("Malformed Set-Cookie: {0}")]
    Malformed(String),

    /// The store's internal state cannot be accessed (poisoned lock).
    #[error("Cookie store unavailable")]
    StoreUnavailable,
}
