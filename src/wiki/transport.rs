// src/wiki/transport.rs
// =============================================================================
// The one place that actually talks to the network.
//
// The fetcher only needs "GET this URL and give me the body", so that is all
// the Transport trait offers. The real implementation wraps a reqwest Client;
// tests swap in a scripted fake and never touch the network.
//
// Rust concepts:
// - Traits: Describe behavior that several types can implement
// - async-trait: Allows async methods in traits
// - thiserror: Turns our error enum into a proper std::error::Error
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

// Why a single request failed.
//
// None of these stop the crawl; the failed URL is recorded and we move on.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network problem: DNS, connection refused, timeout, TLS...
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered, but not with 2xx
    #[error("HTTP {0}")]
    Status(u16),

    /// The body was not the JSON we expected
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The wiki answered with an API error object
    #[error("API error '{code}': {info}")]
    Api { code: String, info: String },
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a GET and returns the response body as text
    async fn get(&self, url: &Url) -> Result<String, FetchError>;
}

// Transport backed by a reqwest Client
//
// One client is reused for every request (connection pooling).
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(HttpTransport { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        Ok(response.text().await?)
    }
}
