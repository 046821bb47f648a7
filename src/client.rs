//! Pooled HTTP transport for all outbound backend calls

use std::time::Duration;

use reqwest::{Method, RequestBuilder};

use crate::error::BackendError;

/// How long the connect phase of any backend call may take
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared outbound transport. Cheap to clone; all clones reuse one
/// connection pool. Built once at startup and injected into the router
/// and aggregators.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    request_timeout: Duration,
}

impl BackendClient {
    pub fn new(request_timeout: Duration) -> Result<Self, reqwest::Error> {
        // No client-wide total timeout: streaming transfers may
        // legitimately run longer than any fixed deadline. Buffered calls
        // get their deadline per-request instead.
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            http,
            request_timeout,
        })
    }

    /// Builder for a buffered call, bounded by the configured overall timeout
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http.request(method, url).timeout(self.request_timeout)
    }

    /// Builder for a streaming call. No overall deadline is attached here;
    /// `send_streaming` bounds the response-start phase.
    pub fn streaming_request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Send a streaming request, bounding only the time until response
    /// headers arrive. Once the stream has started, the transfer runs
    /// until the backend closes it — a backend may legitimately take long
    /// to finish emitting tokens.
    pub async fn send_streaming(
        &self,
        request: RequestBuilder,
    ) -> Result<reqwest::Response, BackendError> {
        match tokio::time::timeout(self.request_timeout, request.send()).await {
            Ok(result) => result.map_err(BackendError::from),
            Err(_) => Err(BackendError::Timeout(format!(
                "no response headers within {}s",
                self.request_timeout.as_secs()
            ))),
        }
    }

    /// Short-deadline GET used by health probing
    pub async fn probe(&self, url: &str, timeout: Duration) -> Result<reqwest::Response, BackendError> {
        self.http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(BackendError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds() {
        let client = BackendClient::new(Duration::from_secs(300));
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_send_streaming_times_out_before_response_start() {
        // Accepts the connection but never sends response headers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _socket = listener.accept().await;
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let client = BackendClient::new(Duration::from_millis(200)).unwrap();
        let request = client.streaming_request(Method::POST, &format!("http://{}/v1/test", addr));
        let result = client.send_streaming(request).await;

        assert!(matches!(result, Err(BackendError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_probe_unreachable_is_classified() {
        let client = BackendClient::new(Duration::from_secs(1)).unwrap();

        // Nothing listens on this port
        let result = client
            .probe("http://127.0.0.1:1/health", Duration::from_millis(500))
            .await;

        match result {
            Err(BackendError::Unreachable(_)) | Err(BackendError::Timeout(_)) => {}
            other => panic!("expected transport error, got {:?}", other.map(|r| r.status())),
        }
    }
}
