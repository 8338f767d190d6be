use crate::pipeline::{
    HttpRequest, HttpResponse, RequestPolicy, RequestPolicyFactory, RequestPolicyHandle, RequestPolicyOptions,
};
use crate::PipelineError;
use std::sync::Arc;

/// A chain of policies in front of a transport, built once and shared by all requests.
pub struct HttpPipeline {
    head: RequestPolicyHandle,
    options: RequestPolicyOptions,
}

impl HttpPipeline {
    /// Entry point to start building a pipeline ending in `transport`.
    pub fn builder(transport: impl RequestPolicy + 'static) -> HttpPipelineBuilder {
        HttpPipelineBuilder {
            transport: Arc::new(transport),
            factories: Vec::new(),
            options: RequestPolicyOptions::default(),
        }
    }

    /// Sends a request through the first policy of the chain.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, PipelineError> {
        self.head.send(request).await
    }

    pub fn options(&self) -> &RequestPolicyOptions {
        &self.options
    }
}

pub struct HttpPipelineBuilder {
    transport: RequestPolicyHandle,
    factories: Vec<Arc<dyn RequestPolicyFactory>>,
    options: RequestPolicyOptions,
}

impl HttpPipelineBuilder {
    /// Adds a policy. Policies added first sit closest to the caller.
    pub fn policy(mut self, factory: impl RequestPolicyFactory + 'static) -> Self {
        self.factories.push(Arc::new(factory));
        self
    }

    /// Adds a policy factory that the caller keeps a handle to.
    pub fn shared_policy(mut self, factory: Arc<dyn RequestPolicyFactory>) -> Self {
        self.factories.push(factory);
        self
    }

    pub fn options(mut self, options: RequestPolicyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> HttpPipeline {
        let head = self
            .factories
            .iter()
            .rev()
            .fold(self.transport, |next, factory| factory.create(next, &self.options));

        HttpPipeline {
            head,
            options: self.options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PolicyFuture;
    use futures::FutureExt;
    use http::{HeaderValue, StatusCode};
    use std::sync::Mutex;

    /// Transport stub recording the `x-trace` header it receives.
    struct Recorder {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl RequestPolicy for Recorder {
        fn send(&self, request: HttpRequest) -> PolicyFuture {
            let seen = self.seen.clone();
            async move {
                let trace = request
                    .headers
                    .get_all("x-trace")
                    .iter()
                    .map(|v| v.to_str().unwrap().to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                seen.lock().unwrap().push(trace);
                Ok(HttpResponse::new(request.target_url()?, StatusCode::OK))
            }
            .boxed()
        }
    }

    /// Appends its tag to `x-trace` and forwards.
    struct Tag {
        tag: &'static str,
        next: RequestPolicyHandle,
    }

    impl RequestPolicy for Tag {
        fn send(&self, mut request: HttpRequest) -> PolicyFuture {
            request.headers.append("x-trace", HeaderValue::from_static(self.tag));
            self.next.send(request)
        }
    }

    struct TagFactory(&'static str);

    impl RequestPolicyFactory for TagFactory {
        fn create(&self, next: RequestPolicyHandle, _options: &RequestPolicyOptions) -> RequestPolicyHandle {
            Arc::new(Tag { tag: self.0, next })
        }
    }

    /// Policies run in the order they were added.
    #[tokio::test]
    async fn first_added_policy_runs_first() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let pipeline = HttpPipeline::builder(Recorder { seen: seen.clone() })
            .policy(TagFactory("outer"))
            .policy(TagFactory("inner"))
            .build();

        let response = pipeline.send(HttpRequest::get("https://example.com/")).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(seen.lock().unwrap().as_slice(), ["outer,inner".to_string()]);
    }

    #[tokio::test]
    async fn empty_pipeline_goes_straight_to_transport() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let pipeline = HttpPipeline::builder(Recorder { seen: seen.clone() }).build();

        pipeline.send(HttpRequest::get("https://example.com/")).await.unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
