use async_trait::async_trait;
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;

use crate::feed::parser::ParseError;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default response body limit
pub const DEFAULT_MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur during a single feed fetch attempt.
///
/// These cover the full lifecycle of an attempt: network issues, HTTP
/// errors, oversized or non-UTF-8 bodies and feed parsing failures. None of
/// them escape `fetch_articles`; they drive the retry/fallback policy.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body exceeded the configured size limit
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// Response body was not valid UTF-8
    #[error("Invalid UTF-8 in response")]
    InvalidUtf8,
    /// Feed XML could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    /// Feed owner id cannot be turned into a feed URL
    #[error("Invalid feed owner id: {0:?}")]
    InvalidOwner(String),
}

/// Status code and text body of an HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP GET capability used by the ingestion service.
///
/// Implementations return `Ok` for any response that arrived, whatever its
/// status; the service decides what a non-2xx status means.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// [`HttpFetch`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_body_bytes: usize,
}

impl ReqwestFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: DEFAULT_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_FEED_SIZE,
        }
    }

    /// Deadline for a whole request: connecting, headers and reading the body.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        // The deadline covers the body too, not just the response headers
        tokio::time::timeout(self.timeout, self.send_and_read(url))
            .await
            .map_err(|_| FetchError::Timeout)?
    }
}

impl ReqwestFetcher {
    async fn send_and_read(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            // Body of an error page is never parsed
            return Ok(HttpResponse {
                status,
                body: String::new(),
            });
        }

        let body = read_limited_text(response, self.max_body_bytes).await?;
        Ok(HttpResponse { status, body })
    }
}

async fn read_limited_text(
    response: reqwest::Response,
    limit: usize,
) -> Result<String, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    String::from_utf8(bytes).map_err(|_| FetchError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_success_returns_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<rss/>"))
            .mount(&mock_server)
            .await;

        let fetcher = ReqwestFetcher::new(reqwest::Client::new());
        let response = fetcher
            .get(&format!("{}/feed", mock_server.uri()))
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.body, "<rss/>");
    }

    #[tokio::test]
    async fn test_error_status_is_reported_not_raised() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&mock_server)
            .await;

        let fetcher = ReqwestFetcher::new(reqwest::Client::new());
        let response = fetcher.get(&mock_server.uri()).await.unwrap();

        assert_eq!(response.status, 503);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
            .mount(&mock_server)
            .await;

        let fetcher = ReqwestFetcher::new(reqwest::Client::new()).with_max_body_bytes(16);
        let result = fetcher.get(&mock_server.uri()).await;

        assert!(matches!(result, Err(FetchError::ResponseTooLarge(16))));
    }

    #[tokio::test]
    async fn test_invalid_utf8_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xff, 0xfe, 0xfd]))
            .mount(&mock_server)
            .await;

        let fetcher = ReqwestFetcher::new(reqwest::Client::new());
        let result = fetcher.get(&mock_server.uri()).await;

        assert!(matches!(result, Err(FetchError::InvalidUtf8)));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<rss/>")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let fetcher = ReqwestFetcher::new(reqwest::Client::new())
            .with_timeout(Duration::from_millis(50));
        let result = fetcher.get(&mock_server.uri()).await;

        assert!(matches!(result, Err(FetchError::Timeout)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Bind then drop to get a port nothing listens on
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };

        let fetcher = ReqwestFetcher::new(reqwest::Client::new());
        let result = fetcher.get(&format!("http://{addr}/feed")).await;

        assert!(matches!(result, Err(FetchError::Network(_))));
    }

    #[tokio::test]
    async fn test_stalled_body_times_out() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Sends headers and part of the body, then goes quiet
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n<rss>")
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let fetcher = ReqwestFetcher::new(reqwest::Client::new())
            .with_timeout(Duration::from_millis(200));
        let result = fetcher.get(&format!("http://{addr}/feed")).await;

        assert!(matches!(result, Err(FetchError::Timeout)));
        server.abort();
    }
}
