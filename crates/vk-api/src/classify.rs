//! Response classification
//!
//! Turns a raw transport result into exactly one [`ResponseOutcome`]. The VK
//! API reports errors in three shapes, all with HTTP 200:
//!
//! ```text
//! {"error": {"error_code": 5, "error_msg": "User authorization failed", ...}}
//! {"error": "invalid_client", "error_description": "client_secret is incorrect"}
//! {"error": "need_captcha", "captcha_sid": "854844498568", "captcha_img": "http://..."}
//! ```
//!
//! A coded error with `error_code == 14` is a captcha challenge too, with the
//! captcha fields inside the error object.

use serde_json::{Map, Value};

use crate::decode::{scalar_to_string, DecodeError};
use crate::error_code::ErrorCode;
use crate::outcome::{ApiError, CaptchaQuestion, ResponseOutcome, TransportError};
use crate::request::{Envelope, RequestDescriptor};

/// Whether the transport produced a complete reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStatus {
    /// A reply body was received
    Completed,
    /// No usable reply
    Failed,
}

/// What the transport hands to the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResult {
    /// Completion status
    pub status: TransportStatus,
    /// Failure cause, for failed results
    pub cause: Option<TransportError>,
    /// Raw reply body
    pub body: String,
}

impl TransportResult {
    /// A completed exchange with a body
    pub fn completed(body: impl Into<String>) -> Self {
        Self {
            status: TransportStatus::Completed,
            cause: None,
            body: body.into(),
        }
    }

    /// A failed exchange
    pub fn failed(cause: TransportError) -> Self {
        Self {
            status: TransportStatus::Failed,
            cause: Some(cause),
            body: String::new(),
        }
    }
}

const NEED_CAPTCHA: &str = "need_captcha";

/// Classify a transport result using the descriptor's envelope and decoder
///
/// Pure and total: the same input always yields the same outcome, and every
/// failure is reported as an outcome value.
pub fn classify<T>(result: &TransportResult, request: &RequestDescriptor<T>) -> ResponseOutcome<T> {
    if result.status != TransportStatus::Completed {
        return ResponseOutcome::TransportFailure(
            result.cause.clone().unwrap_or(TransportError::Unknown),
        );
    }

    let decode_failure = |cause: DecodeError| ResponseOutcome::DecodeFailure {
        cause,
        raw_json: result.body.clone(),
    };

    let root: Value = match serde_json::from_str(&result.body) {
        Ok(root) => root,
        Err(e) => return decode_failure(DecodeError::InvalidJson(e.to_string())),
    };
    let Some(object) = root.as_object() else {
        return decode_failure(DecodeError::UnknownFormat(format!(
            "expected a JSON object, got {}",
            root
        )));
    };

    if let Some(error) = object.get("error") {
        return match classify_error(object, error) {
            Ok(outcome) => outcome,
            Err(cause) => decode_failure(cause),
        };
    }

    let payload = match request.envelope() {
        Envelope::Response => match object.get("response") {
            Some(payload) => payload,
            None => return decode_failure(DecodeError::UnknownFormat(root.to_string())),
        },
        Envelope::Root => &root,
    };

    match request.decode(payload) {
        Ok(data) => ResponseOutcome::Success(data),
        Err(cause) => decode_failure(cause),
    }
}

fn classify_error<T>(
    root: &Map<String, Value>,
    error: &Value,
) -> Result<ResponseOutcome<T>, DecodeError> {
    match error {
        Value::Object(fields) => {
            let code = match fields.get("error_code") {
                None | Some(Value::Null) => ErrorCode::NoErrorCode,
                Some(value) => ErrorCode::from_code(read_code(value)?),
            };

            if code == ErrorCode::CaptchaRequired {
                return Ok(ResponseOutcome::CaptchaRequired(read_captcha(fields)?));
            }

            let message = fields.get("error_msg").and_then(scalar_to_string);
            Ok(ResponseOutcome::ApiError(
                ApiError::coded(code).with_message(message),
            ))
        }
        Value::String(kind) if kind == NEED_CAPTCHA => {
            Ok(ResponseOutcome::CaptchaRequired(read_captcha(root)?))
        }
        Value::String(kind) => {
            let message = root.get("error_description").and_then(scalar_to_string);
            Ok(ResponseOutcome::ApiError(
                ApiError::extended(kind.clone()).with_message(message),
            ))
        }
        other => Err(DecodeError::UnknownFormat(format!(
            "unexpected error value {}",
            other
        ))),
    }
}

fn read_code(value: &Value) -> Result<i64, DecodeError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| DecodeError::invalid_field("error_code", n.to_string())),
        Value::String(s) => s
            .parse()
            .map_err(|_| DecodeError::invalid_field("error_code", s.clone())),
        other => Err(DecodeError::invalid_field("error_code", other.to_string())),
    }
}

fn read_captcha(fields: &Map<String, Value>) -> Result<CaptchaQuestion, DecodeError> {
    let read = |key: &str| {
        fields
            .get(key)
            .and_then(scalar_to_string)
            .ok_or_else(|| DecodeError::MissingField(key.to_string()))
    };

    Ok(CaptchaQuestion::new(read("captcha_sid")?, read("captcha_img")?))
}

// =============================================================================
// Tests
// =============================================================================
