use crate::cookies::CookieError;

/// Errors travelling through the pipeline's failure channel.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid request target: {0}")]
    InvalidRequest(String),

    #[error("Cookie error: {0}")]
    Cookie(#[from] CookieError),

    #[cfg(feature = "reqwest_transport")]
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Transport(String),
}
