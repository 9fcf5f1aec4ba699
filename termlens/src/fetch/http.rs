//! reqwest-backed fetcher with browser-like request headers.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::redirect::Policy;
use std::time::Instant;
use tracing::{debug, warn};

use super::config::FetchConfig;
use super::protocols::{ContentFetcher, FetchResult};
use crate::errors::TermlensError;

/// Fetches documents over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Creates a fetcher from configuration.
    pub fn new(config: FetchConfig) -> Result<Self, TermlensError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value(&config.accept)?);
        headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);
        for (key, value) in &config.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| TermlensError::Config(format!("invalid header name '{key}': {e}")))?;
            headers.insert(name, header_value(value)?);
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .redirect(Policy::limited(config.max_redirects));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn fetch_inner(&self, url: &str) -> FetchResult {
        let mut response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return FetchResult::network_error(url, describe_transport_error(e)),
        };

        let status = response.status();
        if !status.is_success() {
            return FetchResult::http_error(
                url,
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown status"),
            );
        }

        let limit = self.config.max_response_size;
        if let Some(length) = response.content_length() {
            if usize::try_from(length).map_or(true, |len| len > limit) {
                return FetchResult::network_error(
                    url,
                    format!("Response of {length} bytes exceeds the {limit} byte limit"),
                );
            }
        }

        let mut bytes = Vec::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    if bytes.len() + chunk.len() > limit {
                        return FetchResult::network_error(
                            url,
                            format!("Response body exceeds the {limit} byte limit"),
                        );
                    }
                    bytes.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(e) => {
                    return FetchResult::network_error(
                        url,
                        format!("Failed to read response body: {}", describe_transport_error(e)),
                    )
                }
            }
        }
        let body = String::from_utf8_lossy(&bytes).into_owned();

        if body.trim().is_empty() {
            return FetchResult::empty_response(url, status.as_u16());
        }

        FetchResult::success(url, status.as_u16(), body)
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        let started = Instant::now();
        debug!(url = %url, "Fetching document");

        let result = self
            .fetch_inner(url)
            .await
            .with_duration_ms(started.elapsed().as_secs_f64() * 1000.0);

        if result.is_success() {
            debug!(
                url = %url,
                status = ?result.http_status,
                bytes = result.raw_html.as_ref().map_or(0, String::len),
                duration_ms = result.duration_ms,
                "Document fetched"
            );
        } else {
            warn!(
                url = %url,
                kind = ?result.error_kind,
                detail = result.error_detail.as_deref().unwrap_or_default(),
                "Document fetch failed"
            );
        }
        result
    }
}

fn header_value(value: &str) -> Result<HeaderValue, TermlensError> {
    HeaderValue::from_str(value)
        .map_err(|e| TermlensError::Config(format!("invalid header value '{value}': {e}")))
}

/// Flattens a transport error and its causes into one line, prefixed with
/// the failure class so message heuristics can key on it. The URL is
/// dropped: digits in a port or path must not read as a status code.
fn describe_transport_error(err: reqwest::Error) -> String {
    let err = err.without_url();
    let mut detail = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }

    if err.is_timeout() {
        format!("Request timed out: {detail}")
    } else if err.is_connect() {
        format!("Connection failed: {detail}")
    } else if err.is_redirect() {
        format!("Redirect error: {detail}")
    } else {
        detail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = "<html><body><article>Terms of use</article></body></html>";

    /// Serves one chunked response without a Content-Length header.
    async fn serve_chunked(chunks: Vec<String>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let head = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nTransfer-Encoding: chunked\r\n\r\n";
            if socket.write_all(head.as_bytes()).await.is_err() {
                return;
            }
            for chunk in chunks {
                let frame = format!("{:x}\r\n{chunk}\r\n", chunk.len());
                if socket.write_all(frame.as_bytes()).await.is_err() {
                    return;
                }
            }
            let _ = socket.write_all(b"0\r\n\r\n").await;
        });
        format!("http://{addr}/terms")
    }

    #[tokio::test]
    async fn test_fetch_success_sends_browser_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/terms"))
            .and(header_exists("user-agent"))
            .and(header("accept-language", "en-US,en;q=0.9"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(FetchConfig::default()).unwrap();
        let result = fetcher.fetch(&format!("{}/terms", server.uri())).await;

        assert!(result.is_success());
        assert_eq!(result.http_status, Some(200));
        assert_eq!(result.raw_html.as_deref(), Some(PAGE));
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(FetchConfig::default()).unwrap();
        let result = fetcher.fetch(&format!("{}/missing", server.uri())).await;

        assert_eq!(result.error_kind, Some(ErrorKind::HttpError));
        assert_eq!(result.http_status, Some(404));
        assert_eq!(result.error_detail.as_deref(), Some("HTTP 404: Not Found"));
    }

    #[tokio::test]
    async fn test_fetch_whitespace_body_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("  \n\t "))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(FetchConfig::default()).unwrap();
        let result = fetcher.fetch(&server.uri()).await;

        assert_eq!(result.error_kind, Some(ErrorKind::EmptyResponse));
        assert_eq!(result.http_status, Some(200));
    }

    #[tokio::test]
    async fn test_fetch_oversized_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(FetchConfig::default().with_max_response_size(16)).unwrap();
        let result = fetcher.fetch(&server.uri()).await;

        assert_eq!(result.error_kind, Some(ErrorKind::NetworkError));
        assert!(result.error_detail.unwrap().contains("byte limit"));
    }

    #[tokio::test]
    async fn test_fetch_chunked_body_over_limit_is_cut_off() {
        let url = serve_chunked(vec!["x".repeat(1024); 8]).await;

        let fetcher =
            HttpFetcher::new(FetchConfig::default().with_max_response_size(2048)).unwrap();
        let result = fetcher.fetch(&url).await;

        assert_eq!(result.error_kind, Some(ErrorKind::NetworkError));
        assert_eq!(
            result.error_detail.as_deref(),
            Some("Response body exceeds the 2048 byte limit")
        );
    }

    #[tokio::test]
    async fn test_fetch_chunked_body_within_limit() {
        let url = serve_chunked(vec![
            "<html><body><article>".to_string(),
            "Terms of use".to_string(),
            "</article></body></html>".to_string(),
        ])
        .await;

        let fetcher = HttpFetcher::new(FetchConfig::default()).unwrap();
        let result = fetcher.fetch(&url).await;

        assert!(result.is_success());
        assert_eq!(result.raw_html.as_deref(), Some(PAGE));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let fetcher = HttpFetcher::new(FetchConfig::default().with_timeout(5.0)).unwrap();
        let result = fetcher.fetch(&format!("http://127.0.0.1:{port}/terms")).await;

        assert!(!result.is_success());
        assert_eq!(result.error_kind, Some(ErrorKind::NetworkError));
        assert!(result.http_status.is_none());
    }

    #[test]
    fn test_invalid_header_is_config_error() {
        let config = FetchConfig::default().with_header("X-Bad", "line\nbreak");
        let err = HttpFetcher::new(config).unwrap_err();
        assert!(matches!(err, TermlensError::Config(_)));
    }
}
