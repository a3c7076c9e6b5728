//! Long-poll event stream
//!
//! The long-poll server answers `a_check` requests with
//!
//! ```text
//! {"ts": 196851367, "updates": [[4, 16929, 1, 85635407, 1280307577, "", "hello", {...}], [9, -835293, 1]]}
//! ```
//!
//! or `{"failed": 2}` once the key has expired. Each update is a positional
//! array whose first element selects the event kind.

mod attachments;
mod reply;
mod update;

pub use attachments::{decode_attachments, AttachmentRef};
pub use reply::LongPollReply;
pub use update::{decode_update, LongPollUpdate};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::decode::lenient;

/// Connection data returned by `messages.getLongPollServer`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongPollServerInfo {
    /// Secret session key
    pub key: String,
    /// Server address, e.g. `im0.vkontakte.ru/im748`
    pub server: String,
    /// Timestamp to start polling from
    #[serde(deserialize_with = "lenient::string")]
    pub ts: String,
}

crate::decodable_via_serde!(LongPollServerInfo);

impl LongPollServerInfo {
    /// Absolute URL of the long-poll endpoint
    ///
    /// The server address usually comes without a scheme; `https://` is
    /// assumed in that case.
    pub fn url(&self) -> String {
        if self.server.starts_with("http://") || self.server.starts_with("https://") {
            self.server.clone()
        } else {
            format!("https://{}", self.server)
        }
    }
}

/// Discriminant of a long-poll update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// `0,$message_id,0`
    MessageRemoved,
    /// `1,$message_id,$flags`
    MessageFlagsUpdated,
    /// `2,$message_id,$mask[,$user_id]`
    MessageFlagsSet,
    /// `3,$message_id,$mask[,$user_id]`
    MessageFlagsReset,
    /// `4,$message_id,$flags,$from_id,$timestamp,$subject,$text[,$attachments]`
    MessageAdded,
    /// `8,-$user_id,0`
    FriendStatusOnline,
    /// `9,-$user_id,$flags`
    FriendStatusOffline,
    /// `51,$chat_id,$self`
    ChatSettingsChanged,
    /// `61,$user_id,$flags`
    UserTypingInConversation,
    /// `62,$user_id,$chat_id`
    UserTypingInChat,
    /// `70,$user_id,$call_id`
    UserPerformedCall,
    /// `101,...`, sent by the server but not documented
    Undocumented,
}

impl EventType {
    /// Map a discriminant to its event kind
    pub fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => Self::MessageRemoved,
            1 => Self::MessageFlagsUpdated,
            2 => Self::MessageFlagsSet,
            3 => Self::MessageFlagsReset,
            4 => Self::MessageAdded,
            8 => Self::FriendStatusOnline,
            9 => Self::FriendStatusOffline,
            51 => Self::ChatSettingsChanged,
            61 => Self::UserTypingInConversation,
            62 => Self::UserTypingInChat,
            70 => Self::UserPerformedCall,
            101 => Self::Undocumented,
            _ => return None,
        })
    }

    /// Discriminant as sent by the server
    pub fn code(&self) -> i64 {
        match self {
            Self::MessageRemoved => 0,
            Self::MessageFlagsUpdated => 1,
            Self::MessageFlagsSet => 2,
            Self::MessageFlagsReset => 3,
            Self::MessageAdded => 4,
            Self::FriendStatusOnline => 8,
            Self::FriendStatusOffline => 9,
            Self::ChatSettingsChanged => 51,
            Self::UserTypingInConversation => 61,
            Self::UserTypingInChat => 62,
            Self::UserPerformedCall => 70,
            Self::Undocumented => 101,
        }
    }
}

/// Message flag bits carried by long-poll message events
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MessageFlags(u32);

impl MessageFlags {
    /// Message is unread
    pub const UNREAD: Self = Self(1);
    /// Outgoing message
    pub const OUTBOX: Self = Self(2);
    /// Message was replied to
    pub const REPLIED: Self = Self(4);
    /// Marked as important
    pub const IMPORTANT: Self = Self(8);
    /// Sent through a chat
    pub const CHAT: Self = Self(16);
    /// Sent by a friend
    pub const FRIENDS: Self = Self(32);
    /// Marked as spam
    pub const SPAM: Self = Self(64);
    /// Deleted (in the trash)
    pub const DELETED: Self = Self(128);
    /// Checked by the user for spam
    pub const FIXED: Self = Self(256);
    /// Contains media
    pub const MEDIA: Self = Self(512);

    const NAMES: [(Self, &'static str); 10] = [
        (Self::UNREAD, "UNREAD"),
        (Self::OUTBOX, "OUTBOX"),
        (Self::REPLIED, "REPLIED"),
        (Self::IMPORTANT, "IMPORTANT"),
        (Self::CHAT, "CHAT"),
        (Self::FRIENDS, "FRIENDS"),
        (Self::SPAM, "SPAM"),
        (Self::DELETED, "DELETED"),
        (Self::FIXED, "FIXED"),
        (Self::MEDIA, "MEDIA"),
    ];

    /// No flags
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Flags from raw bits; unknown bits are kept
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is set
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no bit is set
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for MessageFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for MessageFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "MessageFlags({:#x}: {})", self.0, names.join(" | "))
    }
}
