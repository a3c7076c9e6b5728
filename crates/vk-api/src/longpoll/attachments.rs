//! Attachment references embedded in `MessageAdded` events

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::decode::{scalar_to_string, DecodeError};

const KEY_PREFIX: &str = "attach";
const TYPE_SUFFIX: &str = "_type";

/// Media attached to a new message, as referenced by the long-poll stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    /// `photo`, `video`, `audio`, `doc`, ...
    pub kind: String,
    /// Owner of the media object
    pub owner_id: String,
    /// Id of the media object
    pub media_id: String,
}

impl AttachmentRef {
    /// Create an attachment reference
    pub fn new(
        kind: impl Into<String>,
        owner_id: impl Into<String>,
        media_id: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            owner_id: owner_id.into(),
            media_id: media_id.into(),
        }
    }
}

/// Extract the `attach{N}_type` / `attach{N}` pairs of an event's extra map
///
/// References come out in ascending `N`. Other keys (`fwd`, `from`, `emoji`)
/// are ignored.
pub fn decode_attachments(extra: &Map<String, Value>) -> Result<Vec<AttachmentRef>, DecodeError> {
    let mut by_index = BTreeMap::new();

    for (key, kind) in extra {
        let Some((raw_index, index)) = type_key_index(key) else {
            continue;
        };

        let value_key = format!("{}{}", KEY_PREFIX, raw_index);
        let value = extra
            .get(&value_key)
            .and_then(scalar_to_string)
            .ok_or_else(|| DecodeError::MalformedAttachment(format!("{} has no value", key)))?;
        let (owner_id, media_id) = value
            .split_once('_')
            .ok_or_else(|| DecodeError::MalformedAttachment(format!("{} = {}", value_key, value)))?;
        let kind = scalar_to_string(kind)
            .ok_or_else(|| DecodeError::MalformedAttachment(format!("{} = {}", key, kind)))?;

        by_index.insert((index, raw_index), AttachmentRef::new(kind, owner_id, media_id));
    }

    Ok(by_index.into_values().collect())
}

/// `attach012_type` -> `Some(("012", 12))`
///
/// The index must be plain ASCII digits. The digits are kept as written
/// because the sibling value key repeats them verbatim.
fn type_key_index(key: &str) -> Option<(&str, u64)> {
    let raw = key.strip_prefix(KEY_PREFIX)?.strip_suffix(TYPE_SUFFIX)?;
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((raw, raw.parse().ok()?))
}
