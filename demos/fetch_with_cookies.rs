use pipeline_cookies::cookies::CookieStore;
use pipeline_cookies::pipeline::{HttpPipeline, HttpRequest, RequestPolicyOptions};
use pipeline_cookies::policies::{CookiePolicyFactory, ReqwestTransport};
use pipeline_cookies::{CookieStoreConfig, PipelineConfig};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let target = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://httpbin.org/cookies/set?demo=1".to_string());

    // Configure the pipeline. The cookie config only applies to the store the
    // factory creates for us.
    let config = PipelineConfig {
        request_timeout: Some(Duration::from_secs(10)),
        cookies: CookieStoreConfig::builder().max_cookies_per_domain(20).build()?,
        ..PipelineConfig::default()
    };

    // Keep a handle to the factory so we can look into its store afterwards
    let cookies = Arc::new(CookiePolicyFactory::with_config(config.cookies.clone()));
    let pipeline = HttpPipeline::builder(ReqwestTransport::new(&config)?)
        .shared_policy(cookies.clone())
        .options(RequestPolicyOptions {
            log_level: log::LevelFilter::Debug,
        })
        .build();

    let response = pipeline.send(HttpRequest::get(target.clone())).await?;
    println!("{} {} ({} bytes)", response.status.as_u16(), response.status_text(), response.body.len());

    // Second request to the same site carries whatever the first one stored
    let response = pipeline.send(HttpRequest::get(target)).await?;
    println!("{} {}", response.status.as_u16(), response.status_text());

    for cookie in cookies.store().cookies()? {
        println!("{}\t{}\t{}={}", cookie.domain, cookie.path, cookie.name, cookie.value);
    }

    Ok(())
}
