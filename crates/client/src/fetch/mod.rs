//! HTTP retrieval of raw file contents.
//!
//! ### Transport
//! - One GET per call, no retries.
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable)
//!
//! ### Failure collapsing
//! [`FetchClient::get`] reports rich errors (timeout, status, size). The
//! [`Fetcher`] trait used by the resolver collapses every failure, and an
//! empty body, to `None`.

pub mod url;

use bytes::Bytes;
use ghsnip_core::{AppConfig, Error};
use reqwest::Url;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};

pub use url::{UrlError, parse_target};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "ghsnip/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "ghsnip/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

/// Network retrieval as seen by the resolver.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Body of `url`, or None on any failure or an empty body.
    async fn fetch(&self, url: &str) -> Option<Bytes>;
}

/// HTTP fetch client.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Fetch a URL, returning raw bytes and metadata.
    pub async fn get(&self, url_str: &str) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let url = parse_target(url_str).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let response = self
            .http
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::HttpError(format!("status {} for {}", status.as_u16(), url)));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let final_url = response.url().clone();

        let bytes = response.bytes().await.map_err(|e| transport_error(&url, e))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!("fetched {} -> {} in {}ms ({} bytes)", url, final_url, fetch_ms, bytes.len());

        Ok(FetchResponse { url, final_url, status, bytes, fetch_ms })
    }
}

fn transport_error(url: &Url, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(format!("{url}: {err}"))
    } else {
        Error::HttpError(format!("network error for {url}: {err}"))
    }
}

#[async_trait::async_trait]
impl Fetcher for FetchClient {
    async fn fetch(&self, url: &str) -> Option<Bytes> {
        match self.get(url).await {
            Ok(response) if response.bytes.is_empty() => {
                tracing::warn!(url, "fetch returned an empty body");
                None
            }
            Ok(response) => Some(response.bytes),
            Err(e) => {
                tracing::warn!(url, error = %e, "fetch failed");
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl<F: Fetcher + ?Sized> Fetcher for std::sync::Arc<F> {
    async fn fetch(&self, url: &str) -> Option<Bytes> {
        (**self).fetch(url).await
    }
}
