//! Client configuration

use std::collections::HashMap;
use std::time::Duration;

pub use vk_api::methods::long_poll::LongPollConfig;

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for [`VkClient`](crate::VkClient)
#[derive(Debug, Clone)]
pub struct VkClientConfig {
    /// Base URL for session-scoped methods (e.g., "https://api.vk.com")
    pub api_base_url: String,
    /// Base URL for the OAuth token exchange
    pub oauth_base_url: String,
    /// Default request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Custom headers to include in all requests
    pub default_headers: HashMap<String, String>,
}

impl Default for VkClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: vk_api::API_BASE_URL.to_string(),
            oauth_base_url: vk_api::OAUTH_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("VK-Compass/{}", env!("CARGO_PKG_VERSION")),
            default_headers: HashMap::new(),
        }
    }
}

impl VkClientConfig {
    /// Create a new config with an API base URL
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Default::default()
        }
    }

    /// Set the API base URL
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the OAuth base URL
    pub fn with_oauth_base_url(mut self, url: impl Into<String>) -> Self {
        self.oauth_base_url = url.into();
        self
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a default header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = VkClientConfig::default();
        assert_eq!(config.api_base_url, "https://api.vk.com");
        assert_eq!(config.oauth_base_url, "https://oauth.vk.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("VK-Compass/"));
    }

    #[test]
    fn test_client_config_builder() {
        let config = VkClientConfig::new("http://127.0.0.1:8080")
            .with_oauth_base_url("http://127.0.0.1:8081")
            .with_timeout(Duration::from_secs(60))
            .with_user_agent("CustomAgent/1.0")
            .with_header("X-Custom", "value");

        assert_eq!(config.api_base_url, "http://127.0.0.1:8080");
        assert_eq!(config.oauth_base_url, "http://127.0.0.1:8081");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "CustomAgent/1.0");
        assert_eq!(
            config.default_headers.get("X-Custom"),
            Some(&"value".to_string())
        );

        let config = config.with_api_base_url("http://other");
        assert_eq!(config.api_base_url, "http://other");
    }
}
