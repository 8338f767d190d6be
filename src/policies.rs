//! Pipeline stages shipped with the crate.

mod cookies;
#[cfg(feature = "reqwest_transport")]
mod transport;

pub use cookies::CookiePolicy;
pub use cookies::CookiePolicyFactory;

#[cfg(feature = "reqwest_transport")]
pub use transport::ReqwestTransport;
