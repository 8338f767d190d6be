use crate::pipeline::{HttpRequest, HttpResponse};
use crate::PipelineError;
use futures::future::BoxFuture;
use log::{Level, LevelFilter};
use std::sync::Arc;

/// Future returned by every pipeline stage.
///
/// It is `'static`: a policy clones whatever it needs out of `self` before
/// building the future, so requests can be spawned onto a runtime freely.
pub type PolicyFuture = BoxFuture<'static, Result<HttpResponse, PipelineError>>;

/// A handle to a pipeline stage.
pub type RequestPolicyHandle = Arc<dyn RequestPolicy + Send + Sync>;

/// One stage in a request pipeline.
///
/// Implementations must be `Send + Sync`; a single instance serves every
/// request going through the pipeline concurrently.
pub trait RequestPolicy: Send + Sync {
    /// Sends `request` through this stage (and whatever follows it).
    ///
    /// Failures are reported through the returned future, never by panicking.
    fn send(&self, request: HttpRequest) -> PolicyFuture;
}

/// Creates a policy wrapping `next` when a pipeline is built.
pub trait RequestPolicyFactory: Send + Sync {
    fn create(&self, next: RequestPolicyHandle, options: &RequestPolicyOptions) -> RequestPolicyHandle;
}

/// Options handed to every factory of a pipeline.
#[derive(Debug, Clone, Copy)]
pub struct RequestPolicyOptions {
    /// Most verbose level policies may log at
    pub log_level: LevelFilter,
}

impl Default for RequestPolicyOptions {
    fn default() -> Self {
        Self {
            log_level: LevelFilter::Info,
        }
    }
}

impl RequestPolicyOptions {
    /// Returns true when policies should emit log records at `level`.
    pub fn should_log(&self, level: Level) -> bool {
        level <= self.log_level && log::log_enabled!(level)
    }
}
