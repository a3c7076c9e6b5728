//! Classified response outcomes

use std::fmt;
use thiserror::Error;

use crate::decode::DecodeError;
use crate::error_code::ErrorCode;

/// Server-side rejection of a call
///
/// Regular errors carry a numeric `code`; irregular (auth-style) errors such
/// as `{"error": "invalid_client"}` carry the string in `extended_error` and
/// leave `code` at [`ErrorCode::NoErrorCode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Numeric error code
    pub code: ErrorCode,
    /// Error string of an irregular error reply
    pub extended_error: Option<String>,
    /// `error_msg` or `error_description`, when the server sent one
    pub message: Option<String>,
}

impl ApiError {
    /// Regular coded error
    pub fn coded(code: ErrorCode) -> Self {
        Self {
            code,
            extended_error: None,
            message: None,
        }
    }

    /// Irregular error carrying only a string
    pub fn extended(error: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::NoErrorCode,
            extended_error: Some(error.into()),
            message: None,
        }
    }

    /// Attach the server's human-readable message
    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API method returned an error: {}", self.code)?;
        if let Some(extended) = &self.extended_error {
            write!(f, ", {}", extended)?;
        }
        if let Some(message) = &self.message {
            write!(f, " - {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Captcha challenge sent instead of a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptchaQuestion {
    /// `captcha_sid`
    pub captcha_id: String,
    /// `captcha_img`, the image to show to the user
    pub captcha_image_uri: String,
}

impl CaptchaQuestion {
    /// Create a captcha question
    pub fn new(captcha_id: impl Into<String>, captcha_image_uri: impl Into<String>) -> Self {
        Self {
            captcha_id: captcha_id.into(),
            captcha_image_uri: captcha_image_uri.into(),
        }
    }
}

/// Failure below the JSON layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request did not finish within its timeout
    #[error("Request timed out")]
    Timeout,

    /// Could not connect to the server
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The request could not be sent
    #[error("Request failed: {0}")]
    Request(String),

    /// The response body could not be read
    #[error("Failed to read response: {0}")]
    Body(String),

    /// The caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,

    /// The transport reported failure without a cause
    #[error("Transport failed without a reported cause")]
    Unknown,
}

/// Result of classifying one API reply
///
/// Exactly one case is populated. A captcha challenge is always reported as
/// [`ResponseOutcome::CaptchaRequired`], never as an [`ApiError`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome<T> {
    /// The call succeeded and the payload decoded
    Success(T),
    /// The server rejected the call
    ApiError(ApiError),
    /// The server wants a captcha solved before the call can succeed
    CaptchaRequired(CaptchaQuestion),
    /// The request never produced a complete reply
    TransportFailure(TransportError),
    /// The reply could not be decoded
    DecodeFailure {
        /// What went wrong
        cause: DecodeError,
        /// The body as received
        raw_json: String,
    },
}

impl<T> ResponseOutcome<T> {
    /// Whether this is [`ResponseOutcome::Success`]
    pub fn is_success(&self) -> bool {
        matches!(self, ResponseOutcome::Success(_))
    }

    /// Borrow the payload of a success
    pub fn success(&self) -> Option<&T> {
        match self {
            ResponseOutcome::Success(data) => Some(data),
            _ => None,
        }
    }

    /// The captcha challenge, if this outcome is one
    pub fn captcha_question(&self) -> Option<&CaptchaQuestion> {
        match self {
            ResponseOutcome::CaptchaRequired(question) => Some(question),
            _ => None,
        }
    }

    /// The API error, if this outcome is one
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ResponseOutcome::ApiError(error) => Some(error),
            _ => None,
        }
    }

    /// Whether the long-poll server reported expired credentials
    pub fn is_long_poll_expired(&self) -> bool {
        matches!(
            self,
            ResponseOutcome::DecodeFailure {
                cause: DecodeError::LongPollExpired,
                ..
            }
        )
    }

    /// Transform the success payload
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResponseOutcome<U> {
        match self {
            ResponseOutcome::Success(data) => ResponseOutcome::Success(f(data)),
            ResponseOutcome::ApiError(e) => ResponseOutcome::ApiError(e),
            ResponseOutcome::CaptchaRequired(q) => ResponseOutcome::CaptchaRequired(q),
            ResponseOutcome::TransportFailure(e) => ResponseOutcome::TransportFailure(e),
            ResponseOutcome::DecodeFailure { cause, raw_json } => {
                ResponseOutcome::DecodeFailure { cause, raw_json }
            }
        }
    }

    /// Convert into a `Result` for use with `?`
    pub fn into_result(self) -> Result<T, OutcomeError> {
        match self {
            ResponseOutcome::Success(data) => Ok(data),
            ResponseOutcome::ApiError(e) => Err(OutcomeError::Api(e)),
            ResponseOutcome::CaptchaRequired(q) => Err(OutcomeError::CaptchaRequired(q)),
            ResponseOutcome::TransportFailure(e) => Err(OutcomeError::Transport(e)),
            ResponseOutcome::DecodeFailure { cause, raw_json } => {
                Err(OutcomeError::Decode { cause, raw_json })
            }
        }
    }
}

/// Every non-success outcome as an error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OutcomeError {
    /// Server rejection
    #[error("{0}")]
    Api(ApiError),

    /// Captcha challenge
    #[error("API method call replied with \"need_captcha\" ({})", .0.captcha_id)]
    CaptchaRequired(CaptchaQuestion),

    /// Transport failure
    #[error("Transport error: {0}")]
    Transport(TransportError),

    /// Decode failure
    #[error("Decode error: {cause}")]
    Decode {
        /// What went wrong
        cause: DecodeError,
        /// The body as received
        raw_json: String,
    },
}
