//! HTTP transport boundary
//!
//! The discovery client only needs `fetch(url) -> (status, body)`. Timeouts,
//! redirects, retries, and caching all belong to the transport.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use webfinger_lookup_common::{ClientConfig, DiscoveryError, Result};

/// Accept header sent with every discovery fetch
pub const XRD_ACCEPT: &str = "application/xrd+xml, application/xml;q=0.9, */*;q=0.1";

/// Status code and body of a completed fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Capability to perform a plain GET
///
/// Implementations return `Ok` for any completed exchange, whatever its
/// status, and `Err` only when no response was received.
#[cfg_attr(test, mockall::automock)]
pub trait HttpTransport: Send + Sync {
    fn fetch(&self, url: &str) -> Result<HttpResponse>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    fn fetch(&self, url: &str) -> Result<HttpResponse> {
        (**self).fetch(url)
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for Box<T> {
    fn fetch(&self, url: &str) -> Result<HttpResponse> {
        (**self).fetch(url)
    }
}

/// Blocking `reqwest` transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport using the timeout and User-Agent from `config`
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(XRD_ACCEPT));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| DiscoveryError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn fetch(&self, url: &str) -> Result<HttpResponse> {
        debug!(url, "GET");
        let transport_error = |e: reqwest::Error| DiscoveryError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(url).send().map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(transport_error)?;
        debug!(url, status, bytes = body.len(), "Fetch complete");

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}
