pub mod config;
pub mod cookies;
pub mod errors;
pub mod pipeline;
pub mod policies;

pub use config::{CookieAcceptPolicy, CookieStoreConfig, PipelineConfig};
pub use errors::PipelineError;
