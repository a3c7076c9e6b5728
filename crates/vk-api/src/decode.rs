//! JSON decoding capability
//!
//! Every payload type that a [`RequestDescriptor`](crate::RequestDescriptor)
//! can produce implements [`Decodable`]. Types that also want the raw JSON
//! they were built from are wrapped in [`Raw`].

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Errors produced while turning JSON into typed data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The body was not valid JSON
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// Valid JSON in a shape we do not understand
    #[error("Unknown JSON data format: {0}")]
    UnknownFormat(String),

    /// A required key or position was absent
    #[error("Missing field: {0}")]
    MissingField(String),

    /// A field was present but had the wrong type or value
    #[error("Invalid field {field}: {reason}")]
    InvalidField {
        /// Field name or position
        field: String,
        /// What was wrong with it
        reason: String,
    },

    /// Structured deserialization failed
    #[error("Could not read JSON data: {0}")]
    Deserialize(String),

    /// Long-poll discriminant outside the known set
    #[error("Unknown long poll event type: {0}")]
    UnknownEventKind(i64),

    /// An `attach{N}` entry could not be split into owner and media ids
    #[error("Malformed attachment: {0}")]
    MalformedAttachment(String),

    /// The long-poll server rejected the key or timestamp
    #[error("Long poll server credentials have expired")]
    LongPollExpired,
}

impl DecodeError {
    /// Shorthand for [`DecodeError::InvalidField`]
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Deserialize(err.to_string())
    }
}

/// A type that can be built from a JSON tree
pub trait Decodable: Sized {
    /// Decode `json` into `Self`
    fn decode(json: &Value) -> Result<Self, DecodeError>;
}

/// Decode any serde type, mapping serde errors into [`DecodeError`]
pub fn from_serde<T: DeserializeOwned>(json: &Value) -> Result<T, DecodeError> {
    Ok(T::deserialize(json)?)
}

/// Implement [`Decodable`] for types that derive `Deserialize`
#[macro_export]
macro_rules! decodable_via_serde {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::decode::Decodable for $ty {
                fn decode(json: &::serde_json::Value) -> Result<Self, $crate::decode::DecodeError> {
                    $crate::decode::from_serde(json)
                }
            }
        )+
    };
}

impl Decodable for Value {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        Ok(json.clone())
    }
}

/// Scalars become their textual form; structures are rejected.
impl Decodable for String {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        scalar_to_string(json).ok_or_else(|| {
            DecodeError::UnknownFormat(format!("expected a scalar, got {}", json))
        })
    }
}

impl<T: Decodable> Decodable for Vec<T> {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        json.as_array()
            .ok_or_else(|| DecodeError::UnknownFormat(format!("expected an array, got {}", json)))?
            .iter()
            .map(T::decode)
            .collect()
    }
}

/// Decoded data together with the JSON it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Raw<T> {
    data: T,
    raw: Value,
}

impl<T> Raw<T> {
    /// Attach the raw payload to already decoded data
    pub fn new(data: T, raw: Value) -> Self {
        Self { data, raw }
    }

    /// The decoded data
    pub fn data(&self) -> &T {
        &self.data
    }

    /// The JSON the data was decoded from
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Drop the raw payload
    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T: Decodable> Decodable for Raw<T> {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        Ok(Raw::new(T::decode(json)?, json.clone()))
    }
}

/// Render a JSON scalar the way the server wrote it
///
/// Strings are returned verbatim, numbers and booleans in their JSON text.
/// Objects, arrays and `null` yield `None`.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Serde adapters for fields the server sends either as numbers or strings
pub mod lenient {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::scalar_to_string;

    /// `123` or `"123"` into `String`
    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let value = Value::deserialize(deserializer)?;
        scalar_to_string(&value)
            .ok_or_else(|| D::Error::custom(format!("expected a scalar, got {}", value)))
    }

    /// Like [`string`], with `null` or absence mapped to `None`
    pub fn option_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => scalar_to_string(&value)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("expected a scalar, got {}", value))),
        }
    }

    /// `true`, `1` or `"1"` into `Some(true)`
    pub fn option_bool<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<bool>, D::Error> {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(b)),
            Some(Value::Number(n)) => Ok(Some(n.as_i64().unwrap_or(0) != 0)),
            Some(Value::String(s)) => Ok(Some(s != "0" && !s.is_empty())),
            Some(other) => Err(D::Error::custom(format!("expected a flag, got {}", other))),
        }
    }

    /// An array of scalars into `Vec<String>`; absence is an empty list
    pub fn string_vec<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<String>, D::Error> {
        match Option::<Vec<Value>>::deserialize(deserializer)? {
            None => Ok(Vec::new()),
            Some(values) => values
                .iter()
                .map(|v| {
                    scalar_to_string(v)
                        .ok_or_else(|| D::Error::custom(format!("expected a scalar, got {}", v)))
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        #[serde(deserialize_with = "lenient::string")]
        id: String,
        #[serde(default, deserialize_with = "lenient::option_bool")]
        deleted: Option<bool>,
    }

    decodable_via_serde!(Sample);

    #[test]
    fn test_string_from_number_and_string() {
        assert_eq!(String::decode(&json!(16929)).unwrap(), "16929");
        assert_eq!(String::decode(&json!("abc")).unwrap(), "abc");
        assert!(matches!(
            String::decode(&json!({"a": 1})),
            Err(DecodeError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_vec_decoding() {
        let ids: Vec<String> = Vec::decode(&json!([1, "2", 3])).unwrap();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert!(Vec::<String>::decode(&json!("nope")).is_err());
    }

    #[test]
    fn test_lenient_fields() {
        let sample = Sample::decode(&json!({"id": 42, "deleted": 1})).unwrap();
        assert_eq!(sample, Sample { id: "42".into(), deleted: Some(true) });

        let sample = Sample::decode(&json!({"id": "7"})).unwrap();
        assert_eq!(sample.deleted, None);
    }

    #[test]
    fn test_serde_failure_is_decode_error() {
        let err = Sample::decode(&json!({"deleted": 1})).unwrap_err();
        assert!(matches!(err, DecodeError::Deserialize(_)));
    }

    #[test]
    fn test_raw_keeps_payload() {
        let json = json!({"id": 1});
        let raw: Raw<Sample> = Raw::decode(&json).unwrap();
        assert_eq!(raw.data().id, "1");
        assert_eq!(raw.raw(), &json);
        assert_eq!(raw.into_data().id, "1");
    }
}
