//! Authentication hook
//!
//! Session-scoped calls carry the access token as an ordinary parameter. The
//! client hands the outgoing parameter list to an [`Authenticator`] right
//! before sending.

use std::fmt;

/// Mutates the parameters of every authenticated request
#[cfg_attr(test, mockall::automock)]
pub trait Authenticator: Send + Sync {
    /// Add credentials to an outgoing request
    fn authenticate(&self, params: &mut Vec<(String, String)>);
}

/// Parameter carrying the session token
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Appends a fixed `access_token`
#[derive(Clone)]
pub struct AccessTokenAuthenticator {
    token: String,
}

impl AccessTokenAuthenticator {
    /// Create an authenticator for a token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl Authenticator for AccessTokenAuthenticator {
    fn authenticate(&self, params: &mut Vec<(String, String)>) {
        params.retain(|(key, _)| key != ACCESS_TOKEN_PARAM);
        params.push((ACCESS_TOKEN_PARAM.to_string(), self.token.clone()));
    }
}

impl fmt::Debug for AccessTokenAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenAuthenticator")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_token() {
        let auth = AccessTokenAuthenticator::new("secret-token");
        let mut params = vec![("mid".to_string(), "42".to_string())];
        auth.authenticate(&mut params);

        assert_eq!(
            params,
            vec![
                ("mid".to_string(), "42".to_string()),
                ("access_token".to_string(), "secret-token".to_string()),
            ]
        );
    }

    #[test]
    fn test_replaces_existing_token() {
        let auth = AccessTokenAuthenticator::new("new");
        let mut params = vec![("access_token".to_string(), "old".to_string())];
        auth.authenticate(&mut params);
        assert_eq!(params, vec![("access_token".to_string(), "new".to_string())]);
    }

    #[test]
    fn test_debug_hides_token() {
        let auth = AccessTokenAuthenticator::new("secret-token");
        assert!(!format!("{:?}", auth).contains("secret-token"));
    }
}
