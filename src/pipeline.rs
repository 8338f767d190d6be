//! Request pipeline: [`HttpRequest`], [`HttpResponse`], the [`RequestPolicy`]
//! contract and the [`HttpPipeline`] that chains policies in front of a transport.
//!
//! Every stage of a pipeline implements [`RequestPolicy`]: it receives a
//! request and returns a future resolving to a response or a
//! [`PipelineError`](crate::PipelineError). A stage usually holds the next
//! stage and decides what to do before and after calling it. The last stage
//! is the transport.
//!
//! Stages are minted by a [`RequestPolicyFactory`] when the pipeline is built,
//! so state that must be shared by every request (like a cookie store) lives
//! in the factory and is handed to each policy it creates.
//!
//! ```rust,no_run
//! use pipeline_cookies::pipeline::{HttpPipeline, HttpRequest};
//! use pipeline_cookies::policies::{CookiePolicyFactory, ReqwestTransport};
//! use pipeline_cookies::PipelineConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::default();
//! let pipeline = HttpPipeline::builder(ReqwestTransport::new(&config)?)
//!     .policy(CookiePolicyFactory::with_config(config.cookies.clone()))
//!     .build();
//!
//! let response = pipeline.send(HttpRequest::get("https://example.com/")).await?;
//! println!("{}", response.status);
//! # Ok(()) }
//! ```

mod http_pipeline;
mod policy;
mod request;
mod response;

pub use http_pipeline::HttpPipeline;
pub use http_pipeline::HttpPipelineBuilder;

pub use policy::PolicyFuture;
pub use policy::RequestPolicy;
pub use policy::RequestPolicyFactory;
pub use policy::RequestPolicyHandle;
pub use policy::RequestPolicyOptions;

pub use request::HttpRequest;
pub use response::HttpResponse;
