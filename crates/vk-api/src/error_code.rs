//! VK API error codes
//!
//! The server reports regular errors as `{"error": {"error_code": N, ...}}`.
//! Codes are data: only [`ErrorCode::CaptchaRequired`] changes how a reply is
//! classified.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Numeric error code returned by the VK API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorCode {
    /// No `error_code` field was present
    #[default]
    NoErrorCode,
    /// Unknown error occurred
    UnknownError,
    /// Application is disabled
    ApplicationDisabled,
    /// Unknown method passed
    UnknownMethod,
    /// Incorrect signature
    IncorrectSignature,
    /// User authorization failed
    UserAuthorizationFailed,
    /// Too many requests per second
    TooManyRequests,
    /// Permission to perform this action is denied by user
    PermissionDenied,
    /// Flood control: message with same guid already sent
    FloodControl,
    /// Internal server error
    InternalServerError,
    /// Compilation error
    CompilationError,
    /// Runtime error
    RuntimeError,
    /// Captcha is needed
    CaptchaRequired,
    /// Access denied
    AccessDenied,
    /// Action denied for non-standalone applications
    PermissionDeniedForNonStandalone,
    /// One of the parameters specified was missing or invalid
    InvalidParameters,
    /// Invalid user ids
    InvalidUserIds,
    /// User already invited
    UserAlreadyInvited,
    /// Phone number is used by another user
    PhoneUsedByAnotherUser,
    /// Request is still being processed, try later
    ProcessingTryLater,
    /// A code outside the known table
    Unrecognized(i64),
}

impl ErrorCode {
    /// Map a numeric code to its error kind
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::NoErrorCode,
            1 => Self::UnknownError,
            2 => Self::ApplicationDisabled,
            3 => Self::UnknownMethod,
            4 => Self::IncorrectSignature,
            5 => Self::UserAuthorizationFailed,
            6 => Self::TooManyRequests,
            7 => Self::PermissionDenied,
            9 => Self::FloodControl,
            10 => Self::InternalServerError,
            12 => Self::CompilationError,
            13 => Self::RuntimeError,
            14 => Self::CaptchaRequired,
            15 => Self::AccessDenied,
            20 => Self::PermissionDeniedForNonStandalone,
            100 => Self::InvalidParameters,
            113 => Self::InvalidUserIds,
            1003 => Self::UserAlreadyInvited,
            1004 => Self::PhoneUsedByAnotherUser,
            1112 => Self::ProcessingTryLater,
            other => Self::Unrecognized(other),
        }
    }

    /// Numeric value as sent by the server
    pub fn code(&self) -> i64 {
        match self {
            Self::NoErrorCode => 0,
            Self::UnknownError => 1,
            Self::ApplicationDisabled => 2,
            Self::UnknownMethod => 3,
            Self::IncorrectSignature => 4,
            Self::UserAuthorizationFailed => 5,
            Self::TooManyRequests => 6,
            Self::PermissionDenied => 7,
            Self::FloodControl => 9,
            Self::InternalServerError => 10,
            Self::CompilationError => 12,
            Self::RuntimeError => 13,
            Self::CaptchaRequired => 14,
            Self::AccessDenied => 15,
            Self::PermissionDeniedForNonStandalone => 20,
            Self::InvalidParameters => 100,
            Self::InvalidUserIds => 113,
            Self::UserAlreadyInvited => 1003,
            Self::PhoneUsedByAnotherUser => 1004,
            Self::ProcessingTryLater => 1112,
            Self::Unrecognized(code) => *code,
        }
    }

    /// Short human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::NoErrorCode => "no error code",
            Self::UnknownError => "unknown error occurred",
            Self::ApplicationDisabled => "application is disabled",
            Self::UnknownMethod => "unknown method passed",
            Self::IncorrectSignature => "incorrect signature",
            Self::UserAuthorizationFailed => "user authorization failed",
            Self::TooManyRequests => "too many requests per second",
            Self::PermissionDenied => "permission to perform this action is denied by user",
            Self::FloodControl => "flood control",
            Self::InternalServerError => "internal server error",
            Self::CompilationError => "compilation error",
            Self::RuntimeError => "runtime error",
            Self::CaptchaRequired => "captcha is needed",
            Self::AccessDenied => "access denied",
            Self::PermissionDeniedForNonStandalone => {
                "permission denied for non-standalone applications"
            }
            Self::InvalidParameters => "one of the parameters specified was missing or invalid",
            Self::InvalidUserIds => "invalid user ids",
            Self::UserAlreadyInvited => "user already invited",
            Self::PhoneUsedByAnotherUser => "phone is used by another user",
            Self::ProcessingTryLater => "processing, try later",
            Self::Unrecognized(_) => "unrecognized error code",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.description())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Self::from_code)
    }
}
