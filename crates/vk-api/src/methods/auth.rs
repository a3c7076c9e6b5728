//! Token exchange and phone sign-up
//!
//! None of these calls carry an access token.

use serde::Deserialize;

use super::flag;
use crate::decode::lenient;
use crate::request::{HttpMethod, Priority, RequestDescriptor};
use crate::types::AuthToken;
use crate::OAUTH_BASE_URL;

/// Permissions requested by [`get_token`]
pub const DEFAULT_SCOPE: &str = "notify,friends,messages,notifications";

/// Application credentials issued on registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// Application id
    pub client_id: String,
    /// Application secret
    pub client_secret: String,
}

impl ClientCredentials {
    /// Create client credentials
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    fn apply<T>(&self, request: RequestDescriptor<T>) -> RequestDescriptor<T> {
        request
            .param("client_id", &self.client_id)
            .param("client_secret", &self.client_secret)
    }
}

fn auth_method<T: crate::Decodable>(name: &str) -> RequestDescriptor<T> {
    RequestDescriptor::method(name, HttpMethod::Get)
        .unauthenticated()
        .priority(Priority::Auth)
}

/// OAuth password grant against `oauth.vk.com/token`
///
/// The reply is the token object itself, not wrapped in `response`.
pub fn get_token(
    username: &str,
    password: &str,
    credentials: &ClientCredentials,
) -> RequestDescriptor<AuthToken> {
    let request = RequestDescriptor::standalone(OAUTH_BASE_URL, "token", HttpMethod::Get)
        .priority(Priority::Auth)
        .param("grant_type", "password")
        .param("username", username)
        .param("password", password)
        .param("scope", DEFAULT_SCOPE);
    credentials.apply(request)
}

/// Sign-up form for `auth.signup`
#[derive(Debug, Clone, Default)]
pub struct SignUpRequest {
    /// Phone number to register
    pub phone: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// `1` female, `2` male
    pub sex: Option<String>,
    /// Account password
    pub password: Option<String>,
    /// Deliver the code by voice call
    pub voice: Option<bool>,
    /// Session id of a previous attempt, to resend the code
    pub sid: Option<String>,
    /// Test mode, no SMS is sent
    pub test_mode: bool,
}

/// Reply of `auth.signup`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignUpReply {
    /// Sign-up session id
    #[serde(deserialize_with = "lenient::string")]
    pub sid: String,
}

/// Reply of `auth.confirm`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfirmReply {
    /// Id of the new user
    #[serde(rename = "uid", deserialize_with = "lenient::string")]
    pub user_id: String,
}

crate::decodable_via_serde!(SignUpReply, ConfirmReply);

/// `auth.signup`: start registration, a code is sent to the phone
pub fn sign_up(form: &SignUpRequest, credentials: &ClientCredentials) -> RequestDescriptor<SignUpReply> {
    let request = auth_method("auth.signup")
        .param("phone", &form.phone)
        .param("first_name", &form.first_name)
        .param("last_name", &form.last_name)
        .opt_param("sex", form.sex.as_deref())
        .opt_param("password", form.password.as_deref())
        .opt_param("voice", form.voice.map(flag))
        .opt_param("sid", form.sid.as_deref())
        .param("test_mode", flag(form.test_mode));
    credentials.apply(request)
}

/// `auth.checkPhone`: whether a number can be registered
pub fn check_phone(phone: &str, credentials: &ClientCredentials) -> RequestDescriptor<String> {
    credentials.apply(auth_method("auth.checkPhone").param("phone", phone))
}

/// `auth.confirm`: finish registration with the received code
pub fn confirm(
    phone: &str,
    code: &str,
    password: Option<&str>,
    test_mode: bool,
    credentials: &ClientCredentials,
) -> RequestDescriptor<ConfirmReply> {
    let request = auth_method("auth.confirm")
        .param("phone", phone)
        .param("code", code)
        .opt_param("password", password)
        .param("test_mode", flag(test_mode));
    credentials.apply(request)
}
