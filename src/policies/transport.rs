//! Last pipeline stage: performs the actual HTTP exchange with reqwest.
//!
//! Redirects are not followed and reqwest's own cookie handling stays off,
//! so every `Set-Cookie` reaches the policies above this stage.
use crate::config::PipelineConfig;
use crate::pipeline::{HttpRequest, HttpResponse, PolicyFuture, RequestPolicy};
use crate::PipelineError;
use futures::FutureExt;

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wraps an already configured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl RequestPolicy for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> PolicyFuture {
        let client = self.client.clone();

        async move {
            let url = request.target_url()?;
            let res = client
                .request(request.method, url)
                .headers(request.headers)
                .body(request.body)
                .send()
                .await
                .inspect_err(|e| log::warn!("request failed: {e}"))?;

            // Fetch results
            let final_url = res.url().clone();
            let status = res.status();
            let headers = res.headers().clone();

            // Fetch body. We don't do streaming yet
            let body = res.bytes().await?.to_vec();

            Ok(HttpResponse {
                url: final_url,
                status,
                headers,
                body,
            })
        }
        .boxed()
    }
}
