//! Shared HTTP client for the header and content probes.
//!
//! One `reqwest::Client` is built per extractor so connection pools and TLS
//! sessions are reused across probes and across websites.

use crate::config::ProbeConfig;
use crate::error::{Result, SiteLensError};
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;

/// Headers and body of a fully read HTTP response, whatever its status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub headers: HeaderMap,
    pub body: String,
}

/// Reusable HTTP client with a browser user-agent, bounded timeout and
/// redirect following. Certificate verification stays enabled.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .redirect(Policy::limited(config.max_redirects))
            .build()
            .map_err(SiteLensError::HttpClient)?;
        Ok(Self { client })
    }

    /// GET a URL and read the whole body. Non-2xx statuses are not errors.
    pub async fn get(&self, url: &str) -> std::result::Result<HttpResponse, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(HttpResponse { headers, body })
    }
}
