//! HTTP poller for the share API.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sharewatch_adapter::SharePoller;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // One client (and connection pool) can back many pollers.
//!     let client = reqwest::Client::new();
//!     let poller = SharePoller::new(client.clone());
//!
//!     let payload = poller
//!         .poll(
//!             "https://api.sizzapp.com/app/location_sharing/info?shared_code=AbC123",
//!             Duration::from_secs(10),
//!         )
//!         .await?;
//!
//!     println!("{}", payload);
//!     Ok(())
//! }
//! ```

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::PollError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can fetch a raw share payload.
///
/// [`SharePoller`] is the HTTP implementation; coordinators depend on this
/// trait so that they can be driven by other transports.
#[async_trait]
pub trait Fetcher: Send + Sync + Debug {
    /// Fetch the payload at `url`, giving up after `timeout`.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Value, PollError>;
}

/// Poller for the share API.
///
/// Holds no state across calls besides the (shared) HTTP client.
#[derive(Debug, Clone)]
pub struct SharePoller {
    client: Client,
}

impl SharePoller {
    /// Create a poller on top of an existing client.
    ///
    /// `reqwest::Client` is a handle to a connection pool; cloning it shares
    /// the pool, so many pollers can use one process-wide client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a new builder for configuring the poller.
    pub fn builder() -> SharePollerBuilder {
        SharePollerBuilder::default()
    }

    /// The underlying HTTP client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Issue one GET and return the parsed JSON body.
    ///
    /// The status is classified before the body is read. A 2xx body is
    /// parsed as JSON whatever its declared content type.
    pub async fn poll(&self, url: &str, timeout: Duration) -> Result<Value, PollError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        debug!(endpoint = %without_query(url), %status, "share API responded");
        classify_status(status)?;

        let body = response.bytes().await?;
        parse_body(&body)
    }
}

#[async_trait]
impl Fetcher for SharePoller {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Value, PollError> {
        self.poll(url, timeout).await
    }
}

/// Builder for SharePoller.
#[derive(Debug, Default)]
pub struct SharePollerBuilder {
    client: Option<Client>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl SharePollerBuilder {
    /// Reuse an existing client; other builder settings are then ignored.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the connect timeout (default: 5 seconds).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the poller.
    pub fn build(self) -> Result<SharePoller, reqwest::Error> {
        if let Some(client) = self.client {
            return Ok(SharePoller::new(client));
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| concat!("sharewatch/", env!("CARGO_PKG_VERSION")).to_string());

        let client = Client::builder()
            .connect_timeout(self.connect_timeout.unwrap_or(Duration::from_secs(5)))
            .user_agent(user_agent)
            .build()?;

        Ok(SharePoller::new(client))
    }
}

/// Map an HTTP status to a poll error, or `Ok` for 2xx.
pub fn classify_status(status: StatusCode) -> Result<(), PollError> {
    match status {
        StatusCode::NOT_FOUND => Err(PollError::NotFound),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(PollError::InvalidCredential(status.as_u16()))
        }
        StatusCode::TOO_MANY_REQUESTS => Err(PollError::RateLimited),
        s if s.is_success() => Ok(()),
        s => Err(PollError::Http(s.as_u16())),
    }
}

fn parse_body(body: &[u8]) -> Result<Value, PollError> {
    serde_json::from_slice(body).map_err(|e| PollError::MalformedBody(e.to_string()))
}

// Share URLs carry the code in the query; keep it out of logs.
fn without_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharewatch_types::FailureKind;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port and return its URL.
    async fn serve_once(
        status: &'static str,
        content_type: &'static str,
        body: &'static str,
    ) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    content_type,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        format!("http://{}/info?shared_code=abc", addr)
    }

    fn poller() -> SharePoller {
        SharePoller::builder().build().unwrap()
    }

    #[test]
    fn test_classify_status() {
        assert!(classify_status(StatusCode::OK).is_ok());
        assert!(classify_status(StatusCode::NO_CONTENT).is_ok());
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND),
            Err(PollError::NotFound)
        ));
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED),
            Err(PollError::InvalidCredential(401))
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN),
            Err(PollError::InvalidCredential(403))
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            Err(PollError::RateLimited)
        ));
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR),
            Err(PollError::Http(500))
        ));
        assert!(matches!(
            classify_status(StatusCode::MOVED_PERMANENTLY),
            Err(PollError::Http(301))
        ));
    }

    #[test]
    fn test_without_query() {
        assert_eq!(without_query("https://a/b?shared_code=x"), "https://a/b");
        assert_eq!(without_query("https://a/b"), "https://a/b");
    }

    #[test]
    fn builder_reuses_client() {
        let client = Client::new();
        let poller = SharePoller::builder().client(client).build();
        assert!(poller.is_ok());
    }

    #[tokio::test]
    async fn test_poll_success() {
        let url = serve_once("200 OK", "application/json", r#"{"data":[{"unit_id":7}]}"#).await;

        let payload = poller().poll(&url, DEFAULT_TIMEOUT).await.unwrap();
        assert_eq!(payload["data"][0]["unit_id"], 7);
    }

    #[tokio::test]
    async fn mislabelled_content_type_is_still_parsed() {
        let url = serve_once("200 OK", "text/html; charset=utf-8", r#"{"data":[]}"#).await;

        let payload = poller().poll(&url, DEFAULT_TIMEOUT).await.unwrap();
        assert_eq!(payload, serde_json::json!({"data": []}));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let url = serve_once("200 OK", "application/json", "<html>oops</html>").await;

        let err = poller().poll(&url, DEFAULT_TIMEOUT).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::MalformedBody);
    }

    #[tokio::test]
    async fn status_failures_skip_body_parsing() {
        let cases = [
            ("404 Not Found", FailureKind::NotFound),
            ("401 Unauthorized", FailureKind::InvalidCredential),
            ("403 Forbidden", FailureKind::InvalidCredential),
            ("429 Too Many Requests", FailureKind::RateLimited),
            ("503 Service Unavailable", FailureKind::HttpError(503)),
        ];

        for (status, expected) in cases {
            // Body is not JSON; a parse attempt would report MalformedBody.
            let url = serve_once(status, "text/plain", "not json").await;
            let err = poller().poll(&url, DEFAULT_TIMEOUT).await.unwrap_err();
            assert_eq!(err.kind(), expected, "{status}");
        }
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((_stream, _)) = listener.accept().await {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        });

        let url = format!("http://{}/info", addr);
        let err = poller()
            .poll(&url, Duration::from_millis(100))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Timeout);
    }

    #[tokio::test]
    async fn refused_connection_is_a_connection_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{}/info", addr);
        let err = poller().poll(&url, DEFAULT_TIMEOUT).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::ConnectionFailure);
    }

    #[tokio::test]
    async fn fetcher_delegates_to_poll() {
        let url = serve_once("200 OK", "application/json", r#"{"data":null}"#).await;

        let fetcher: &dyn Fetcher = &poller();
        let payload = fetcher.fetch(&url, DEFAULT_TIMEOUT).await.unwrap();
        assert_eq!(payload, serde_json::json!({"data": null}));
    }
}
