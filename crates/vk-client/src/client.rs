//! VK API client
//!
//! Executes [`RequestDescriptor`]s over HTTP and classifies the replies.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use vk_api::{classify, RequestDescriptor, ResponseOutcome, TransportError};

use crate::auth::{AccessTokenAuthenticator, Authenticator};
use crate::config::VkClientConfig;
use crate::transport::{HttpRequest, HttpTransport, ReqwestTransport};

// =============================================================================
// Error Types
// =============================================================================

/// Errors constructing a client
#[derive(Error, Debug)]
pub enum ClientError {
    /// The HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Result type for client construction
pub type Result<T> = std::result::Result<T, ClientError>;

/// Parameters whose values never reach the logs
const SENSITIVE_PARAMS: [&str; 3] = ["access_token", "password", "client_secret"];

fn redacted(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| {
            if SENSITIVE_PARAMS.contains(&key.as_str()) {
                format!("{}=***", key)
            } else {
                format!("{}={}", key, value)
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

// =============================================================================
// Client Implementation
// =============================================================================

/// Client for the VK HTTP API
///
/// Cheap to clone; clones share the connection pool and the authenticator.
///
/// # Examples
/// ```
/// use vk_client::{VkClient, VkClientConfig};
/// use vk_api::methods::messages;
///
/// async fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let client = VkClient::new(VkClientConfig::default())?.with_access_token("token");
///
///     let restored = client.execute(&messages::restore("42")).await.into_result()?;
///     println!("restored: {}", restored);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct VkClient {
    transport: Arc<dyn HttpTransport>,
    authenticator: Option<Arc<dyn Authenticator>>,
    config: VkClientConfig,
}

impl VkClient {
    /// Create a client that talks HTTP through `reqwest`
    pub fn new(config: VkClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over a custom transport
    pub fn with_transport(config: VkClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            authenticator: None,
            config,
        }
    }

    /// Authenticate session calls with a fixed access token
    pub fn with_access_token(self, token: impl Into<String>) -> Self {
        self.with_authenticator(Arc::new(AccessTokenAuthenticator::new(token)))
    }

    /// Authenticate session calls with a custom hook
    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Get the client configuration
    pub fn config(&self) -> &VkClientConfig {
        &self.config
    }

    /// Whether an authenticator is installed
    pub fn is_authenticated(&self) -> bool {
        self.authenticator.is_some()
    }

    /// Absolute URL a descriptor is sent to
    ///
    /// Descriptors aimed at the public OAuth host are redirected to the
    /// configured OAuth base URL.
    pub fn url_for<T>(&self, request: &RequestDescriptor<T>) -> String {
        let base = match request.base_url_override() {
            Some(vk_api::OAUTH_BASE_URL) => self.config.oauth_base_url.as_str(),
            Some(base) => base,
            None => self.config.api_base_url.as_str(),
        };
        let base = base.trim_end_matches('/');

        if request.resource().is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, request.resource())
        }
    }

    fn build_request<T>(&self, request: &RequestDescriptor<T>) -> HttpRequest {
        let mut params: Vec<(String, String)> = request
            .query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        if request.is_authenticated() {
            match &self.authenticator {
                Some(authenticator) => authenticator.authenticate(&mut params),
                None => tracing::warn!(
                    "Sending {} without an access token: no authenticator installed",
                    request.resource()
                ),
            }
        }

        HttpRequest {
            method: request.http_method(),
            url: self.url_for(request),
            params,
            timeout: request.timeout_override(),
        }
    }

    /// Execute a request and classify the reply
    ///
    /// Never fails: every problem is reported through the outcome.
    pub async fn execute<T>(&self, request: &RequestDescriptor<T>) -> ResponseOutcome<T> {
        let http_request = self.build_request(request);
        tracing::debug!(
            "{} {} [{:?}] {}",
            http_request.method.as_str(),
            http_request.url,
            request.priority_tag(),
            redacted(&http_request.params)
        );

        let result = self.transport.send(http_request).await;
        let outcome = classify(&result, request);

        match &outcome {
            ResponseOutcome::Success(_) => {}
            ResponseOutcome::ApiError(e) => {
                tracing::warn!("{} failed: {}", request.resource(), e)
            }
            ResponseOutcome::CaptchaRequired(q) => {
                tracing::info!("{} requires captcha {}", request.resource(), q.captcha_id)
            }
            ResponseOutcome::TransportFailure(e) => {
                tracing::warn!("Failed to send {}: {}", request.resource(), e)
            }
            ResponseOutcome::DecodeFailure { cause, .. } => {
                tracing::warn!("Failed to decode reply of {}: {}", request.resource(), cause)
            }
        }

        outcome
    }

    /// Execute a request unless `cancel` fires first
    ///
    /// Cancellation drops the in-flight request and yields
    /// [`TransportError::Cancelled`].
    pub async fn execute_cancellable<T>(
        &self,
        request: &RequestDescriptor<T>,
        cancel: &CancellationToken,
    ) -> ResponseOutcome<T> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Cancelled {}", request.resource());
                ResponseOutcome::TransportFailure(TransportError::Cancelled)
            }
            outcome = self.execute(request) => outcome,
        }
    }
}

impl fmt::Debug for VkClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VkClient")
            .field("config", &self.config)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
