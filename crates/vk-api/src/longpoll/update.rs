//! Positional decoding of a single long-poll update

use serde_json::Value;

use super::attachments::{decode_attachments, AttachmentRef};
use super::{EventType, MessageFlags};
use crate::decode::{scalar_to_string, DecodeError};

/// One event from the long-poll stream
///
/// Ids and timestamps are kept as the server wrote them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LongPollUpdate {
    /// A message was deleted
    MessageRemoved {
        /// Message id
        message_id: String,
    },

    /// Message flags were replaced
    MessageFlagsUpdated {
        /// Message id
        message_id: String,
        /// New flags
        flags: MessageFlags,
    },

    /// Message flags were set
    MessageFlagsSet {
        /// Message id
        message_id: String,
        /// Flags that were set
        flags: MessageFlags,
        /// Peer of the message, when sent
        user_id: Option<String>,
    },

    /// Message flags were cleared
    MessageFlagsReset {
        /// Message id
        message_id: String,
        /// Flags that were cleared
        flags: MessageFlags,
        /// Peer of the message, when sent
        user_id: Option<String>,
    },

    /// A new message arrived
    MessageAdded {
        /// Message id
        message_id: String,
        /// Message flags
        flags: MessageFlags,
        /// Sender, or `2000000000 + chat_id` for chats
        from_id: String,
        /// Unix time
        timestamp: String,
        /// Subject line, often empty
        subject: String,
        /// Message text
        text: String,
        /// Media references, present only when the event carried extras
        attachments: Option<Vec<AttachmentRef>>,
    },

    /// A friend came online
    FriendStatusOnline {
        /// Friend id
        user_id: String,
    },

    /// A friend went offline
    FriendStatusOffline {
        /// Friend id
        user_id: String,
        /// Left because of a timeout rather than by logging out
        user_timed_out: bool,
    },

    /// Chat settings changed
    ChatSettingsChanged {
        /// Chat id
        chat_id: String,
        /// The change was made by the current user
        changed_by_current_user: bool,
    },

    /// A user is typing in a private conversation
    UserTypingInConversation {
        /// Typing user
        user_id: String,
    },

    /// A user is typing in a chat
    UserTypingInChat {
        /// Typing user
        user_id: String,
        /// Chat id
        chat_id: String,
    },

    /// A user placed a call
    UserPerformedCall {
        /// Calling user
        user_id: String,
    },
}

impl LongPollUpdate {
    /// Event kind of this update
    pub fn event_type(&self) -> EventType {
        match self {
            Self::MessageRemoved { .. } => EventType::MessageRemoved,
            Self::MessageFlagsUpdated { .. } => EventType::MessageFlagsUpdated,
            Self::MessageFlagsSet { .. } => EventType::MessageFlagsSet,
            Self::MessageFlagsReset { .. } => EventType::MessageFlagsReset,
            Self::MessageAdded { .. } => EventType::MessageAdded,
            Self::FriendStatusOnline { .. } => EventType::FriendStatusOnline,
            Self::FriendStatusOffline { .. } => EventType::FriendStatusOffline,
            Self::ChatSettingsChanged { .. } => EventType::ChatSettingsChanged,
            Self::UserTypingInConversation { .. } => EventType::UserTypingInConversation,
            Self::UserTypingInChat { .. } => EventType::UserTypingInChat,
            Self::UserPerformedCall { .. } => EventType::UserPerformedCall,
        }
    }
}

/// Decode one update array
///
/// Returns `Ok(None)` for the undocumented event `101`, which callers drop.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use vk_api::longpoll::{decode_update, LongPollUpdate};
///
/// let event = json!([9, -835293, 1]);
/// let update = decode_update(event.as_array().unwrap()).unwrap();
/// assert_eq!(
///     update,
///     Some(LongPollUpdate::FriendStatusOffline {
///         user_id: "835293".to_string(),
///         user_timed_out: true,
///     })
/// );
/// ```
pub fn decode_update(event: &[Value]) -> Result<Option<LongPollUpdate>, DecodeError> {
    let discriminant = event
        .first()
        .ok_or_else(|| DecodeError::MissingField("event type".to_string()))?;
    let code = discriminant.as_i64().ok_or_else(|| {
        DecodeError::UnknownFormat(format!("event type is not an integer: {}", discriminant))
    })?;
    let kind = EventType::from_code(code).ok_or(DecodeError::UnknownEventKind(code))?;

    let args = Args { event, kind };

    let update = match kind {
        EventType::Undocumented => return Ok(None),
        EventType::MessageRemoved => LongPollUpdate::MessageRemoved {
            message_id: args.required(1)?,
        },
        EventType::MessageFlagsUpdated => LongPollUpdate::MessageFlagsUpdated {
            message_id: args.required(1)?,
            flags: args.flags(2)?,
        },
        EventType::MessageFlagsSet => LongPollUpdate::MessageFlagsSet {
            message_id: args.required(1)?,
            flags: args.flags(2)?,
            user_id: args.optional(3)?,
        },
        EventType::MessageFlagsReset => LongPollUpdate::MessageFlagsReset {
            message_id: args.required(1)?,
            flags: args.flags(2)?,
            user_id: args.optional(3)?,
        },
        EventType::MessageAdded => LongPollUpdate::MessageAdded {
            message_id: args.required(1)?,
            flags: args.flags(2)?,
            from_id: args.required(3)?,
            timestamp: args.required(4)?,
            subject: args.required(5)?,
            text: args.required(6)?,
            attachments: args.attachments(7)?,
        },
        EventType::FriendStatusOnline => LongPollUpdate::FriendStatusOnline {
            user_id: strip_minus(args.required(1)?),
        },
        EventType::FriendStatusOffline => LongPollUpdate::FriendStatusOffline {
            user_id: strip_minus(args.required(1)?),
            user_timed_out: args.required(2)? == "1",
        },
        EventType::ChatSettingsChanged => LongPollUpdate::ChatSettingsChanged {
            chat_id: args.required(1)?,
            changed_by_current_user: !args.required(2)?.is_empty(),
        },
        EventType::UserTypingInConversation => LongPollUpdate::UserTypingInConversation {
            user_id: args.required(1)?,
        },
        EventType::UserTypingInChat => LongPollUpdate::UserTypingInChat {
            user_id: args.required(1)?,
            chat_id: args.required(2)?,
        },
        EventType::UserPerformedCall => {
            args.required(2)?;
            LongPollUpdate::UserPerformedCall {
                user_id: args.required(1)?,
            }
        }
    };

    Ok(Some(update))
}

/// Friend status events carry the user id negated; drop one leading `-`.
fn strip_minus(id: String) -> String {
    match id.strip_prefix('-') {
        Some(stripped) => stripped.to_string(),
        None => id,
    }
}

struct Args<'a> {
    event: &'a [Value],
    kind: EventType,
}

impl Args<'_> {
    fn field_name(&self, position: usize) -> String {
        format!("{:?}[{}]", self.kind, position)
    }

    fn scalar(&self, position: usize, value: &Value) -> Result<String, DecodeError> {
        scalar_to_string(value).ok_or_else(|| {
            DecodeError::invalid_field(self.field_name(position), format!("not a scalar: {}", value))
        })
    }

    fn required(&self, position: usize) -> Result<String, DecodeError> {
        let value = self
            .event
            .get(position)
            .ok_or_else(|| DecodeError::MissingField(self.field_name(position)))?;
        self.scalar(position, value)
    }

    fn optional(&self, position: usize) -> Result<Option<String>, DecodeError> {
        match self.event.get(position) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => self.scalar(position, value).map(Some),
        }
    }

    fn flags(&self, position: usize) -> Result<MessageFlags, DecodeError> {
        let text = self.required(position)?;
        text.parse::<u32>()
            .map(MessageFlags::from_bits)
            .map_err(|_| {
                DecodeError::invalid_field(self.field_name(position), format!("not a flag set: {}", text))
            })
    }

    fn attachments(&self, position: usize) -> Result<Option<Vec<AttachmentRef>>, DecodeError> {
        match self.event.get(position) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(extra)) => decode_attachments(extra).map(Some),
            Some(other) => Err(DecodeError::invalid_field(
                self.field_name(position),
                format!("expected an object, got {}", other),
            )),
        }
    }
}
