//! HTTP transport
//!
//! The client only needs to send one form-encoded request and get the body
//! back. [`HttpTransport`] captures exactly that, so tests can swap in a
//! scripted transport while production uses [`ReqwestTransport`].

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use vk_api::{HttpMethod, TransportError, TransportResult};

use crate::config::VkClientConfig;

/// A fully resolved HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP verb
    pub method: HttpMethod,
    /// Absolute URL
    pub url: String,
    /// Parameters, sent as query string (GET) or form body (POST)
    pub params: Vec<(String, String)>,
    /// Per-request timeout overriding the client default
    pub timeout: Option<Duration>,
}

/// Sends requests and reports the raw result
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request
    ///
    /// Any HTTP reply, whatever its status, is a completed result; only
    /// failures to get a reply at all are reported as failed.
    async fn send(&self, request: HttpRequest) -> TransportResult;
}

/// [`HttpTransport`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    /// Build a transport from the client configuration
    pub fn new(config: &VkClientConfig) -> Result<Self, reqwest::Error> {
        let mut headers = reqwest::header::HeaderMap::new();
        for (key, value) in &config.default_headers {
            match (
                reqwest::header::HeaderName::from_bytes(key.as_bytes()),
                reqwest::header::HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!("Skipping invalid default header: {}", key),
            }
        }

        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }
}

fn transport_error(error: &reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> TransportResult {
        let mut req = match request.method {
            HttpMethod::Get => self.client.get(&request.url).query(&request.params),
            HttpMethod::Post => self.client.post(&request.url).form(&request.params),
        };
        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => return TransportResult::failed(transport_error(&e)),
        };

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} {} answered with HTTP {}", request.method.as_str(), request.url, status);
        }

        match response.text().await {
            Ok(body) => TransportResult::completed(body),
            Err(e) if e.is_timeout() => TransportResult::failed(TransportError::Timeout),
            Err(e) => TransportResult::failed(TransportError::Body(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vk_api::TransportStatus;

    #[test]
    fn test_build_with_headers() {
        let config = VkClientConfig::default()
            .with_header("X-Test", "1")
            .with_header("bad header", "x");
        assert!(ReqwestTransport::new(&config).is_ok());
    }

    #[tokio::test]
    async fn test_connect_failure_is_failed_result() {
        let transport = ReqwestTransport::new(&VkClientConfig::default()).unwrap();
        let result = transport
            .send(HttpRequest {
                method: HttpMethod::Get,
                url: "http://127.0.0.1:1/method/users.get".to_string(),
                params: vec![],
                timeout: Some(Duration::from_secs(2)),
            })
            .await;

        assert_eq!(result.status, TransportStatus::Failed);
        assert!(result.cause.is_some());
    }
}
