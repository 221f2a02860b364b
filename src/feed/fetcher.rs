use crate::config::Config;
use crate::feed::proxy::ProxyUrlBuilder;
use crate::state::ErrorKind;
use futures::StreamExt;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

const MAX_ENVELOPE_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while retrieving a feed document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Proxy answered, but not with a JSON envelope carrying `contents`
    #[error("Invalid proxy envelope: {0}")]
    InvalidEnvelope(String),
}

impl FetchError {
    /// User-visible category of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Network(_)
            | FetchError::HttpStatus(_)
            | FetchError::Timeout
            | FetchError::ResponseTooLarge => ErrorKind::Network,
            FetchError::InvalidEnvelope(_) => ErrorKind::InvalidResource,
        }
    }
}

/// Source of raw feed documents.
///
/// The poller only depends on this trait, so tests and alternative
/// transports can stand in for [`HttpFetcher`].
pub trait FeedFetcher: Send + Sync + 'static {
    /// Returns the feed document text for `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

#[derive(Deserialize)]
struct Envelope {
    contents: Option<String>,
}

/// Fetches feeds over HTTP through the configured proxy.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    proxy: ProxyUrlBuilder,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(3))
            .pool_idle_timeout(Duration::from_secs(30))
            .user_agent(concat!("feedpulse/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(
            client,
            ProxyUrlBuilder::new(config.proxy_url.clone()),
            config.fetch_timeout(),
        ))
    }

    pub fn with_client(client: reqwest::Client, proxy: ProxyUrlBuilder, timeout: Duration) -> Self {
        Self {
            client,
            proxy,
            timeout,
        }
    }

    async fn fetch_envelope(&self, proxied: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(proxied).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        read_limited_bytes(response, MAX_ENVELOPE_SIZE).await
    }
}

impl FeedFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let proxied = self.proxy.build(url);
        tracing::debug!(feed = %url, proxied = %proxied, "Fetching feed");

        // Timeout covers the whole exchange, body included
        let bytes = tokio::time::timeout(self.timeout, self.fetch_envelope(&proxied))
            .await
            .map_err(|_| FetchError::Timeout)??;

        let envelope: Envelope = serde_json::from_slice(&bytes)
            .map_err(|e| FetchError::InvalidEnvelope(e.to_string()))?;

        envelope
            .contents
            .ok_or_else(|| FetchError::InvalidEnvelope("missing `contents` field".to_string()))
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher_for(server: &MockServer, timeout: Duration) -> HttpFetcher {
        HttpFetcher::with_client(
            reqwest::Client::new(),
            ProxyUrlBuilder::new(format!("{}/get?url={{url}}", server.uri())),
            timeout,
        )
    }

    #[tokio::test]
    async fn test_fetch_unwraps_envelope_contents() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get"))
            .and(query_param("url", "https://example.com/feed1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "contents": "<rss/>", "status": {} })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server, Duration::from_secs(5));
        let body = fetcher.fetch("https://example.com/feed1").await.unwrap();
        assert_eq!(body, "<rss/>");
    }

    #[tokio::test]
    async fn test_http_error_is_network_kind() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server, Duration::from_secs(5));
        let err = fetcher.fetch("https://example.com/feed1").await.unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus(502)));
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_slow_proxy_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "contents": "<rss/>" }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server, Duration::from_millis(50));
        let err = fetcher.fetch("https://example.com/feed1").await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout));
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_non_json_body_is_invalid_resource() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server, Duration::from_secs(5));
        let err = fetcher.fetch("https://example.com/feed1").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidEnvelope(_)));
        assert_eq!(err.kind(), ErrorKind::InvalidResource);
    }

    #[tokio::test]
    async fn test_null_contents_is_invalid_resource() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "contents": null })),
            )
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server, Duration::from_secs(5));
        let err = fetcher.fetch("https://example.com/feed1").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidEnvelope(_)));
    }
}
