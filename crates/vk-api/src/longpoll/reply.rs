//! A whole `a_check` reply

use serde_json::Value;

use super::update::{decode_update, LongPollUpdate};
use crate::decode::{scalar_to_string, Decodable, DecodeError};

/// Decoded reply of one long-poll cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongPollReply {
    timestamp: String,
    updates: Vec<LongPollUpdate>,
}

impl LongPollReply {
    /// Timestamp to send with the next poll
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Updates in the order the server sent them
    ///
    /// Undocumented events are already filtered out. The iterator can be
    /// cloned or requested again to walk the batch from the start.
    pub fn updates(&self) -> std::slice::Iter<'_, LongPollUpdate> {
        self.updates.iter()
    }

    /// Number of delivered updates
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Whether the cycle delivered nothing
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Take ownership of the updates
    pub fn into_updates(self) -> Vec<LongPollUpdate> {
        self.updates
    }
}

impl IntoIterator for LongPollReply {
    type Item = LongPollUpdate;
    type IntoIter = std::vec::IntoIter<LongPollUpdate>;

    fn into_iter(self) -> Self::IntoIter {
        self.updates.into_iter()
    }
}

impl Decodable for LongPollReply {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        let object = json
            .as_object()
            .ok_or_else(|| DecodeError::UnknownFormat(json.to_string()))?;

        if object.contains_key("failed") {
            return Err(DecodeError::LongPollExpired);
        }

        let timestamp = object
            .get("ts")
            .and_then(scalar_to_string)
            .ok_or_else(|| DecodeError::UnknownFormat(format!("no ts in {}", json)))?;
        let raw_updates = object
            .get("updates")
            .and_then(Value::as_array)
            .ok_or_else(|| DecodeError::UnknownFormat(format!("no updates in {}", json)))?;

        let mut updates = Vec::with_capacity(raw_updates.len());
        for event in raw_updates {
            let fields = event.as_array().ok_or_else(|| {
                DecodeError::UnknownFormat(format!("update is not an array: {}", event))
            })?;
            if let Some(update) = decode_update(fields)? {
                updates.push(update);
            }
        }

        Ok(Self { timestamp, updates })
    }
}
