//! Cookies: the [`Cookie`] record, `Set-Cookie` parsing and [`CookieStore`] backends.

mod cookie;
mod errors;
mod matching;
mod parse;
mod store;

pub use cookie::Cookie;
pub use errors::CookieError;

pub use store::CookieStore;
pub use store::CookieStoreHandle;
pub use store::InMemoryCookieStore;
pub use store::StoreOutcome;
