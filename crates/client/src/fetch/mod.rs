//! HTTP fetch pipeline.
//!
//! The client issues one GET per call, does not follow redirects
//! (the interceptor must see 3xx statuses to classify responses), and
//! caps response bodies at a configured byte limit. Non-2xx statuses
//! are returned to the caller, not turned into errors — the
//! interceptor decides what to do with them.

pub mod url;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use cachet_core::StoredResponse;
use reqwest::{Client, Url, header};

pub use url::{UrlError, canonicalize, same_origin};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "cachet/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "cachet/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
        }
    }
}

/// Errors from the network capability.
///
/// Every variant is a network-layer failure from the interceptor's
/// point of view; the distinction exists for logs.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("response too large: {got} bytes exceeds {limit}")]
    TooLarge { got: usize, limit: usize },
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    /// The URL requested.
    pub url: Url,
    /// The final URL after any redirect handling by the transport.
    pub final_url: Url,
    /// HTTP status code.
    pub status: u16,
    /// Content-Type header.
    pub content_type: Option<String>,
    /// Response headers, in wire order.
    pub headers: Vec<(String, String)>,
    /// Response body bytes.
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds.
    pub fetch_ms: u64,
}

impl FetchedResponse {
    /// Whether the transport moved to a different URL than requested.
    pub fn redirected(&self) -> bool {
        self.final_url != self.url
    }

    /// Whether this response may be captured into the cache.
    ///
    /// Only a plain 200 that stayed on the requested URL qualifies;
    /// redirects and error statuses are returned to the caller uncached.
    /// The same-origin gate runs before the fetch is issued at all.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && !self.redirected()
    }

    /// Capture this response as an immutable store snapshot.
    pub fn into_stored(self) -> StoredResponse {
        StoredResponse {
            status: self.status,
            headers: self.headers,
            content_type: self.content_type,
            body: self.bytes.to_vec(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// The network capability the worker runs against.
#[async_trait]
pub trait Network: Send + Sync {
    /// Issue a GET for the given URL.
    ///
    /// Returns `Ok` for any HTTP response the server produced,
    /// `Err` only when no response could be obtained at all.
    async fn fetch(&self, url: &Url) -> Result<FetchedResponse, FetchError>;
}

/// reqwest-backed HTTP client.
pub struct HttpClient {
    http: Client,
    config: FetchConfig,
}

impl HttpClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Network for HttpClient {
    async fn fetch(&self, url: &Url) -> Result<FetchedResponse, FetchError> {
        let start = Instant::now();

        let response = self
            .http
            .get(url.clone())
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(e.to_string())
                } else {
                    FetchError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(FetchError::TooLarge { got: len as usize, limit: self.config.max_bytes });
        }

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(format!("failed to read response: {e}")))?;

        if bytes.len() > self.config.max_bytes {
            return Err(FetchError::TooLarge { got: bytes.len(), limit: self.config.max_bytes });
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            url = %url,
            status,
            bytes = bytes.len(),
            fetch_ms,
            "fetched"
        );

        Ok(FetchedResponse {
            url: url.clone(),
            final_url,
            status,
            content_type,
            headers,
            bytes,
            fetch_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(status: u16, url: &str, final_url: &str) -> FetchedResponse {
        FetchedResponse {
            url: Url::parse(url).unwrap(),
            final_url: Url::parse(final_url).unwrap(),
            status,
            content_type: Some("text/html".to_string()),
            headers: vec![("content-type".into(), "text/html".into())],
            bytes: Bytes::from_static(b"<html></html>"),
            fetch_ms: 12,
        }
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "cachet/0.1");
        assert_eq!(config.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_millis(20000));
    }

    #[test]
    fn test_ok_response_is_cacheable() {
        let response = make_response(200, "https://mycitynews.ca/", "https://mycitynews.ca/");
        assert!(!response.redirected());
        assert!(response.is_cacheable());
    }

    #[test]
    fn test_redirect_is_not_cacheable() {
        let moved = make_response(301, "https://mycitynews.ca/old", "https://mycitynews.ca/old");
        assert!(!moved.is_cacheable());

        let followed = make_response(200, "https://mycitynews.ca/old", "https://mycitynews.ca/new");
        assert!(followed.redirected());
        assert!(!followed.is_cacheable());
    }

    #[test]
    fn test_error_status_is_not_cacheable() {
        let response = make_response(404, "https://mycitynews.ca/gone", "https://mycitynews.ca/gone");
        assert!(!response.is_cacheable());
    }

    #[test]
    fn test_into_stored_snapshot() {
        let response = make_response(200, "https://mycitynews.ca/", "https://mycitynews.ca/");
        let stored = response.into_stored();
        assert_eq!(stored.status, 200);
        assert_eq!(stored.content_type.as_deref(), Some("text/html"));
        assert_eq!(stored.body, b"<html></html>");
        assert!(!stored.stored_at.is_empty());
    }

    #[tokio::test]
    async fn test_http_client_new() {
        let client = HttpClient::new(FetchConfig::default());
        assert!(client.is_ok());
    }
}
