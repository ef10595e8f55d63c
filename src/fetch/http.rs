// src/fetch/http.rs
// =============================================================================
// This module performs the actual HTTP requests.
//
// Key functionality:
// - One GET per resource, never retried
// - A deadline that covers connecting, headers and the whole body
// - Cancellation: the caller's token aborts the request mid-flight
// - Timeouts are reported separately from other transport failures
//
// A non-2xx answer is NOT an error here. The response comes back with its
// status and the caller decides what to do with it.
//
// Rust concepts:
// - tokio::select!: Race two futures and take whichever finishes first
// - Method chaining: reqwest's builder API
// =============================================================================

use crate::error::{Error, Result};
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

// Follow at most this many redirects for a single resource
const MAX_REDIRECTS: usize = 10;

/// What came back from a single GET
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: StatusCode,
    /// Raw body bytes, still compressed if the server sent a .gz file
    pub body: Vec<u8>,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
}

impl FetchResponse {
    /// Only a plain 200 counts as a usable sitemap response
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }
}

// Builds the HTTP client used when the caller does not supply one
//
// reqwest's Client holds a connection pool, so one client is shared by
// every request of every walk.
pub fn build_client(user_agent: &str) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
        .map_err(Error::Client)
}

/// Issues GET requests with a per-request deadline
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetches one resource
    ///
    /// `timeout` bounds this request only; `Duration::ZERO` means no deadline.
    /// A fired `cancel` token wins over everything else.
    pub async fn fetch(
        &self,
        url: &Url,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<FetchResponse> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        debug!(url = %url, ?timeout, "fetching");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            result = self.get(url, timeout) => result.map_err(|e| categorize_error(url, timeout, e)),
        }
    }

    async fn get(&self, url: &Url, timeout: Duration) -> reqwest::Result<FetchResponse> {
        let mut request = self.client.get(url.clone());
        if !timeout.is_zero() {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let content_type = header_value(&response, CONTENT_TYPE);
        let content_encoding = header_value(&response, CONTENT_ENCODING);

        // The request timeout keeps running while the body streams in
        let body = response.bytes().await?.to_vec();

        debug!(url = %url, status = status.as_u16(), bytes = body.len(), "fetched");

        Ok(FetchResponse {
            status,
            body,
            content_type,
            content_encoding,
        })
    }
}

fn header_value(response: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

// Sorts reqwest failures into our error variants
//
// Timeouts get their own variant so callers can tell a slow server apart
// from a broken one.
fn categorize_error(url: &Url, timeout: Duration, error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::Timeout {
            url: url.clone(),
            timeout,
        }
    } else {
        Error::Fetch {
            url: url.clone(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> Fetcher {
        Fetcher::new(build_client("test-agent").unwrap())
    }

    #[tokio::test]
    async fn test_non_success_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.xml"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/missing.xml", server.uri())).unwrap();
        let response = fetcher()
            .fetch(&url, Duration::from_secs(5), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert!(!response.is_ok());
    }

    #[tokio::test]
    async fn test_headers_are_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("<urlset/>", "application/xml"),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/sitemap.xml", server.uri())).unwrap();
        let response = fetcher()
            .fetch(&url, Duration::from_secs(5), &CancellationToken::new())
            .await
            .unwrap();

        assert!(response.is_ok());
        assert_eq!(response.body, b"<urlset/>");
        assert_eq!(response.content_type.as_deref(), Some("application/xml"));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/slow.xml", server.uri())).unwrap();
        let err = fetcher()
            .fetch(&url, Duration::from_millis(50), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Timeout { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_cancelled_token_short_circuits() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let url = Url::parse("http://127.0.0.1:9/never").unwrap();
        let err = fetcher()
            .fetch(&url, Duration::from_secs(5), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
    }
}
