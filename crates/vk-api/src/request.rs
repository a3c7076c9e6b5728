//! Request descriptors
//!
//! A [`RequestDescriptor`] is an immutable description of one API call: which
//! resource to hit, with which verb and parameters, and how to decode the
//! reply. Executing it is the transport's job.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::decode::{Decodable, DecodeError};

// =============================================================================
// Request Types
// =============================================================================

/// HTTP verb for API requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request, parameters in the query string
    Get,
    /// POST request, parameters as a form body
    Post,
}

impl HttpMethod {
    /// Verb name as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// Priority tag attached to a request
///
/// Carried for diagnostics only; no scheduler reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    /// Ordinary method call
    #[default]
    General,
    /// Long-poll related call
    LongPoll,
    /// Authentication call
    Auth,
}

/// Where the decoder finds its input in the reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// Method replies wrap the payload in `{"response": ...}`
    Response,
    /// Standalone endpoints (OAuth, long poll) return the payload as the root
    Root,
}

/// Decoder applied to the reply payload
pub type Decoder<T> = fn(&Value) -> Result<T, DecodeError>;

/// Immutable description of an API call
///
/// # Examples
/// ```
/// use vk_api::{HttpMethod, RequestDescriptor};
///
/// let request: RequestDescriptor<String> = RequestDescriptor::method("messages.restore", HttpMethod::Post)
///     .param("mid", 42)
///     .opt_param("title", None::<String>);
///
/// assert_eq!(request.resource(), "method/messages.restore");
/// assert_eq!(request.param_value("mid"), Some("42"));
/// assert_eq!(request.query_pairs().count(), 1);
/// ```
pub struct RequestDescriptor<T> {
    resource: String,
    http_method: HttpMethod,
    params: BTreeMap<String, Option<String>>,
    envelope: Envelope,
    decoder: Decoder<T>,
    priority: Priority,
    base_url: Option<String>,
    authenticated: bool,
    timeout: Option<Duration>,
}

impl<T: Decodable> RequestDescriptor<T> {
    /// Session-scoped API method, e.g. `messages.get`
    ///
    /// The payload is read from the `"response"` key and the access token is
    /// appended by the transport.
    pub fn method(name: &str, http_method: HttpMethod) -> Self {
        Self::with_decoder(
            format!("method/{}", name),
            http_method,
            Envelope::Response,
            T::decode,
        )
    }

    /// Unauthenticated call against an absolute base URL
    ///
    /// The payload is the whole reply object.
    pub fn standalone(
        base_url: impl Into<String>,
        resource: impl Into<String>,
        http_method: HttpMethod,
    ) -> Self {
        Self::with_decoder(resource.into(), http_method, Envelope::Root, T::decode)
            .base_url(base_url)
            .unauthenticated()
    }
}

impl<T> RequestDescriptor<T> {
    /// Build a descriptor with an explicit decoder
    pub fn with_decoder(
        resource: impl Into<String>,
        http_method: HttpMethod,
        envelope: Envelope,
        decoder: Decoder<T>,
    ) -> Self {
        Self {
            resource: resource.into(),
            http_method,
            params: BTreeMap::new(),
            envelope,
            decoder,
            priority: Priority::General,
            base_url: None,
            authenticated: true,
            timeout: None,
        }
    }

    /// Replace the decoder
    pub fn decoder<U>(self, decoder: Decoder<U>) -> RequestDescriptor<U> {
        RequestDescriptor {
            resource: self.resource,
            http_method: self.http_method,
            params: self.params,
            envelope: self.envelope,
            decoder,
            priority: self.priority,
            base_url: self.base_url,
            authenticated: self.authenticated,
            timeout: self.timeout,
        }
    }

    /// Add a parameter
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), Some(value.to_string()));
        self
    }

    /// Add a parameter that is left out of the request when `None`
    pub fn opt_param<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.params
            .insert(key.into(), value.map(|v| v.to_string()));
        self
    }

    /// Set the priority tag
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Send to this base URL instead of the session's API base
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Do not append the access token
    pub fn unauthenticated(mut self) -> Self {
        self.authenticated = false;
        self
    }

    /// Override the transport timeout for this request
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resource path relative to the base URL
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// HTTP verb
    pub fn http_method(&self) -> HttpMethod {
        self.http_method
    }

    /// Envelope the decoder expects
    pub fn envelope(&self) -> Envelope {
        self.envelope
    }

    /// Priority tag
    pub fn priority_tag(&self) -> Priority {
        self.priority
    }

    /// Base URL override, if any
    pub fn base_url_override(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Whether the transport should append the access token
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Timeout override, if any
    pub fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }

    /// Whether a parameter key is present, even with a `None` value
    pub fn has_param(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Value of a parameter that will be sent
    pub fn param_value(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|v| v.as_deref())
    }

    /// Parameters that will actually be sent, in key order
    pub fn query_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
    }

    /// Run the registered decoder
    pub fn decode(&self, json: &Value) -> Result<T, DecodeError> {
        (self.decoder)(json)
    }
}

impl<T> Clone for RequestDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
            http_method: self.http_method,
            params: self.params.clone(),
            envelope: self.envelope,
            decoder: self.decoder,
            priority: self.priority,
            base_url: self.base_url.clone(),
            authenticated: self.authenticated,
            timeout: self.timeout,
        }
    }
}

impl<T> fmt::Debug for RequestDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("resource", &self.resource)
            .field("http_method", &self.http_method)
            .field("params", &self.params.keys().collect::<Vec<_>>())
            .field("envelope", &self.envelope)
            .field("priority", &self.priority)
            .field("base_url", &self.base_url)
            .field("authenticated", &self.authenticated)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_request() {
        let req: RequestDescriptor<String> =
            RequestDescriptor::method("messages.get", HttpMethod::Get)
                .param("count", 5)
                .param("out", 0);

        assert_eq!(req.resource(), "method/messages.get");
        assert_eq!(req.http_method(), HttpMethod::Get);
        assert_eq!(req.envelope(), Envelope::Response);
        assert_eq!(req.priority_tag(), Priority::General);
        assert!(req.is_authenticated());
        assert!(req.base_url_override().is_none());
        assert_eq!(req.param_value("count"), Some("5"));
    }

    #[test]
    fn test_standalone_request() {
        let req: RequestDescriptor<Value> =
            RequestDescriptor::standalone("https://oauth.vk.com", "token", HttpMethod::Get);

        assert_eq!(req.envelope(), Envelope::Root);
        assert_eq!(req.base_url_override(), Some("https://oauth.vk.com"));
        assert!(!req.is_authenticated());
    }

    #[test]
    fn test_none_params_are_kept_but_not_sent() {
        let req: RequestDescriptor<String> =
            RequestDescriptor::method("messages.getDialogs", HttpMethod::Get)
                .opt_param("count", Some(10))
                .opt_param("offset", None::<i32>)
                .param("uid", "66748");

        assert!(req.has_param("offset"));
        assert_eq!(req.param_value("offset"), None);

        let sent: Vec<_> = req.query_pairs().collect();
        assert_eq!(sent, vec![("count", "10"), ("uid", "66748")]);
    }

    #[test]
    fn test_param_keys_are_unique() {
        let req: RequestDescriptor<String> = RequestDescriptor::method("x", HttpMethod::Get)
            .param("a", 1)
            .param("a", 2);
        assert_eq!(req.query_pairs().count(), 1);
        assert_eq!(req.param_value("a"), Some("2"));
    }

    #[test]
    fn test_custom_decoder() {
        fn count_items(json: &Value) -> Result<usize, DecodeError> {
            json.as_array()
                .map(Vec::len)
                .ok_or_else(|| DecodeError::UnknownFormat(json.to_string()))
        }

        let req = RequestDescriptor::with_decoder(
            "method/friends.get",
            HttpMethod::Get,
            Envelope::Response,
            count_items,
        );
        assert_eq!(req.decode(&json!([1, 2, 3])).unwrap(), 3);
        assert!(req.decode(&json!({})).is_err());
    }

    #[test]
    fn test_builder_options() {
        let req: RequestDescriptor<Value> = RequestDescriptor::method("x", HttpMethod::Post)
            .priority(Priority::Auth)
            .timeout(Duration::from_secs(30))
            .unauthenticated();

        assert_eq!(req.priority_tag(), Priority::Auth);
        assert_eq!(req.timeout_override(), Some(Duration::from_secs(30)));
        assert!(!req.is_authenticated());
    }

    #[test]
    fn test_http_method_as_str() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
    }
}
