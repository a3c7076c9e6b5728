//! API entity types
//!
//! Plain field-for-field mappings of the objects the API returns. Ids come
//! back as numbers from some methods and as strings from others, so they are
//! read leniently and kept as strings.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::decode::{from_serde, lenient, Decodable, DecodeError};
use crate::longpoll::AttachmentRef;

// =============================================================================
// Auth
// =============================================================================

/// Access token issued by the OAuth endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    /// Token value, appended to every session call
    pub access_token: String,
    /// Lifetime in seconds; `0` means the token does not expire
    #[serde(default)]
    pub expires_in: i64,
    /// Owner of the token
    #[serde(default, deserialize_with = "lenient::option_string")]
    pub user_id: Option<String>,
    /// When the token was received
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl AuthToken {
    /// Expiry time, if the token expires at all
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        if self.expires_in > 0 {
            Some(self.created_at + Duration::seconds(self.expires_in))
        } else {
            None
        }
    }

    /// Whether the token has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| now >= at)
    }
}

/// The token exchange reply must carry `access_token`; anything else is a
/// format we do not understand.
impl Decodable for AuthToken {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        if json.get("access_token").is_none() {
            return Err(DecodeError::MissingField("access_token".to_string()));
        }
        from_serde(json)
    }
}

// =============================================================================
// Users
// =============================================================================

/// Fields requested from `users.get` when the caller does not choose
pub const ALL_PROFILE_FIELDS: &str =
    "uid,first_name,last_name,nickname,screen_name,sex,photo,photo_medium,photo_big,online";

/// Gender as reported in a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sex {
    /// Not specified
    #[default]
    NotSpecified,
    /// Female (`1`)
    Female,
    /// Male (`2`)
    Male,
}

impl<'de> Deserialize<'de> for Sex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = lenient::option_string(deserializer)?;
        Ok(match value.as_deref() {
            Some("1") => Sex::Female,
            Some("2") => Sex::Male,
            _ => Sex::NotSpecified,
        })
    }
}

/// User profile from `users.get` or `friends.get`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    /// User id
    #[serde(rename = "uid", deserialize_with = "lenient::string")]
    pub id: String,
    /// First name
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name
    #[serde(default)]
    pub last_name: Option<String>,
    /// Nickname
    #[serde(default)]
    pub nickname: Option<String>,
    /// Short address
    #[serde(default)]
    pub screen_name: Option<String>,
    /// Gender
    #[serde(default)]
    pub sex: Sex,
    /// Rating
    #[serde(default, deserialize_with = "lenient::option_string")]
    pub rate: Option<String>,
    /// City id
    #[serde(default, rename = "city", deserialize_with = "lenient::option_string")]
    pub city_id: Option<String>,
    /// Birth date, `D.M.YYYY` or `D.M`
    #[serde(default, rename = "bdate")]
    pub birth_date: Option<String>,
    /// 50px photo
    #[serde(default)]
    pub photo: Option<String>,
    /// 100px photo
    #[serde(default)]
    pub photo_medium: Option<String>,
    /// Large photo
    #[serde(default)]
    pub photo_big: Option<String>,
    /// Square photo
    #[serde(default)]
    pub photo_rec: Option<String>,
    /// Online status
    #[serde(default, deserialize_with = "lenient::option_bool")]
    pub online: Option<bool>,
    /// Friend lists the user belongs to
    #[serde(default, rename = "lists", deserialize_with = "lenient::string_vec")]
    pub friend_lists: Vec<String>,
}

/// Chat member from `messages.getChatUsers`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatUserProfile {
    /// The member's profile
    #[serde(flatten)]
    pub profile: UserProfile,
    /// Who invited the member
    #[serde(default, deserialize_with = "lenient::option_string")]
    pub invited_by: Option<String>,
}

// =============================================================================
// Messages
// =============================================================================

/// Private message or chat message
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    /// Message id
    #[serde(default, rename = "mid", deserialize_with = "lenient::option_string")]
    pub id: Option<String>,
    /// Peer (sender of incoming, recipient of outgoing messages)
    #[serde(rename = "uid", deserialize_with = "lenient::string")]
    pub user_id: String,
    /// Unix time
    #[serde(deserialize_with = "lenient::string")]
    pub date: String,
    /// Whether the message was read
    #[serde(default, rename = "read_state", deserialize_with = "lenient::option_bool")]
    pub is_read: Option<bool>,
    /// Whether the message was sent by the current user
    #[serde(default, rename = "out", deserialize_with = "lenient::option_bool")]
    pub is_outgoing: Option<bool>,
    /// Subject
    #[serde(default)]
    pub title: Option<String>,
    /// Text
    #[serde(default)]
    pub body: String,
    /// Media attachments
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Forwarded messages
    #[serde(default)]
    pub fwd_messages: Vec<Message>,
    /// Whether the message is in the trash
    #[serde(default, rename = "deleted", deserialize_with = "lenient::option_bool")]
    pub is_deleted: Option<bool>,
    /// Chat id, for chat messages
    #[serde(default, deserialize_with = "lenient::option_string")]
    pub chat_id: Option<String>,
    /// Recently active chat members
    #[serde(default, deserialize_with = "lenient::option_string")]
    pub chat_active: Option<String>,
    /// Chat member count
    #[serde(default)]
    pub users_count: Option<u32>,
    /// Chat creator
    #[serde(default, deserialize_with = "lenient::option_string")]
    pub admin_id: Option<String>,
}

impl Message {
    /// Deleted flag with absence read as `false`
    pub fn deleted(&self) -> bool {
        self.is_deleted.unwrap_or(false)
    }
}

/// Multi-user chat
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Chat {
    /// Chat id
    #[serde(deserialize_with = "lenient::string")]
    pub chat_id: String,
    /// Chat type, `chat`
    #[serde(default, rename = "type")]
    pub chat_type: Option<String>,
    /// Title
    #[serde(default)]
    pub title: Option<String>,
    /// Creator
    #[serde(default, deserialize_with = "lenient::option_string")]
    pub admin_id: Option<String>,
    /// Member ids
    #[serde(default, rename = "users", deserialize_with = "lenient::string_vec")]
    pub user_ids: Vec<String>,
}

// =============================================================================
// Attachments
// =============================================================================

/// Media attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Attachment {
    /// `photo`, `audio`, `video` or `doc`
    #[serde(rename = "type")]
    pub kind: String,
    /// Photo payload
    #[serde(default)]
    pub photo: Option<PhotoAttachment>,
    /// Audio payload
    #[serde(default)]
    pub audio: Option<AudioAttachment>,
    /// Video payload
    #[serde(default)]
    pub video: Option<VideoAttachment>,
    /// Document payload
    #[serde(default, alias = "document")]
    pub doc: Option<DocumentAttachment>,
}

impl Attachment {
    fn ids(&self) -> Option<(&str, &str)> {
        match self.kind.as_str() {
            "photo" => self.photo.as_ref().map(|p| (p.owner_id.as_str(), p.id.as_str())),
            "audio" => self.audio.as_ref().map(|a| (a.owner_id.as_str(), a.id.as_str())),
            "video" => self.video.as_ref().map(|v| (v.owner_id.as_str(), v.id.as_str())),
            "doc" | "document" => self.doc.as_ref().map(|d| (d.owner_id.as_str(), d.id.as_str())),
            _ => None,
        }
    }

    /// Owner of the attached media
    pub fn owner_id(&self) -> Option<&str> {
        self.ids().map(|(owner, _)| owner)
    }

    /// Id of the attached media
    pub fn media_id(&self) -> Option<&str> {
        self.ids().map(|(_, media)| media)
    }

    /// Reference usable with `messages.send`
    pub fn to_ref(&self) -> Option<AttachmentRef> {
        self.ids()
            .map(|(owner, media)| AttachmentRef::new(self.kind.clone(), owner, media))
    }
}

/// Photo attachment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhotoAttachment {
    /// Photo id
    #[serde(rename = "pid", deserialize_with = "lenient::string")]
    pub id: String,
    /// Owner id
    #[serde(deserialize_with = "lenient::string")]
    pub owner_id: String,
    /// Small image URL
    #[serde(default)]
    pub src: Option<String>,
    /// Large image URL
    #[serde(default)]
    pub src_big: Option<String>,
}

/// Audio attachment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AudioAttachment {
    /// Audio id
    #[serde(rename = "aid", deserialize_with = "lenient::string")]
    pub id: String,
    /// Owner id
    #[serde(deserialize_with = "lenient::string")]
    pub owner_id: String,
    /// Performer
    #[serde(default)]
    pub performer: Option<String>,
    /// Track title
    #[serde(default)]
    pub title: Option<String>,
    /// Length in seconds
    #[serde(default)]
    pub duration: Option<u32>,
}

/// Video attachment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VideoAttachment {
    /// Video id
    #[serde(rename = "vid", deserialize_with = "lenient::string")]
    pub id: String,
    /// Owner id
    #[serde(deserialize_with = "lenient::string")]
    pub owner_id: String,
    /// Title
    #[serde(default)]
    pub title: Option<String>,
    /// Length in seconds
    #[serde(default)]
    pub duration: Option<u32>,
}

/// Document attachment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentAttachment {
    /// Document id
    #[serde(rename = "did", deserialize_with = "lenient::string")]
    pub id: String,
    /// Owner id
    #[serde(deserialize_with = "lenient::string")]
    pub owner_id: String,
    /// File extension
    #[serde(default)]
    pub ext: Option<String>,
    /// Download URL
    #[serde(default)]
    pub url: Option<String>,
    /// Title
    #[serde(default)]
    pub title: Option<String>,
    /// Size in bytes
    #[serde(default)]
    pub size: Option<u64>,
}

crate::decodable_via_serde!(UserProfile, ChatUserProfile, Message, Chat, Attachment);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auth_token_decoding() {
        let before = Utc::now();
        let token = AuthToken::decode(&json!({
            "access_token": "533bacf01e11f55b536a565b57531ac114461ae8736d6506a3",
            "expires_in": 43200,
            "user_id": 6492
        }))
        .unwrap();

        assert_eq!(token.user_id.as_deref(), Some("6492"));
        assert!(token.created_at >= before);
        assert_eq!(
            token.expires_at(),
            Some(token.created_at + Duration::seconds(43200))
        );
        assert!(!token.is_expired_at(token.created_at));
        assert!(token.is_expired_at(token.created_at + Duration::days(1)));
    }

    #[test]
    fn test_auth_token_requires_access_token() {
        assert_eq!(
            AuthToken::decode(&json!({"expires_in": 0})).unwrap_err(),
            DecodeError::MissingField("access_token".to_string())
        );
    }

    #[test]
    fn test_non_expiring_token() {
        let token = AuthToken::decode(&json!({"access_token": "t", "expires_in": 0})).unwrap();
        assert_eq!(token.expires_at(), None);
        assert!(!token.is_expired_at(Utc::now() + Duration::days(3650)));
    }

    #[test]
    fn test_user_profile_decoding() {
        let profile = UserProfile::decode(&json!({
            "uid": 1,
            "first_name": "Pavel",
            "last_name": "Durov",
            "sex": 2,
            "online": 1,
            "lists": [1, 4]
        }))
        .unwrap();

        assert_eq!(profile.id, "1");
        assert_eq!(profile.sex, Sex::Male);
        assert_eq!(profile.online, Some(true));
        assert_eq!(profile.friend_lists, vec!["1", "4"]);
        assert_eq!(profile.photo, None);
    }

    #[test]
    fn test_chat_user_profile() {
        let member = ChatUserProfile::decode(&json!({
            "uid": "5",
            "first_name": "A",
            "invited_by": 1
        }))
        .unwrap();
        assert_eq!(member.profile.id, "5");
        assert_eq!(member.invited_by.as_deref(), Some("1"));
    }

    #[test]
    fn test_message_decoding() {
        let message = Message::decode(&json!({
            "mid": 16929,
            "uid": 85635407,
            "date": 1280307577,
            "read_state": 0,
            "out": 1,
            "title": " ... ",
            "body": "hello",
            "attachments": [
                {"type": "photo", "photo": {"pid": 456, "owner_id": 123, "src": "http://cs/x.jpg"}},
                {"type": "doc", "doc": {"did": 7, "owner_id": 8, "ext": "pdf", "size": 1024}}
            ],
            "deleted": 1
        }))
        .unwrap();

        assert_eq!(message.id.as_deref(), Some("16929"));
        assert_eq!(message.is_read, Some(false));
        assert_eq!(message.is_outgoing, Some(true));
        assert!(message.deleted());
        assert_eq!(
            message.attachments[0].to_ref(),
            Some(AttachmentRef::new("photo", "123", "456"))
        );
        assert_eq!(message.attachments[1].media_id(), Some("7"));
        assert_eq!(message.attachments[1].owner_id(), Some("8"));
    }

    #[test]
    fn test_message_requires_peer_and_date() {
        assert!(Message::decode(&json!({"mid": 1, "body": "x"})).is_err());
    }

    #[test]
    fn test_message_deleted_defaults_to_false() {
        let message = Message::decode(&json!({"uid": 1, "date": 2})).unwrap();
        assert_eq!(message.is_deleted, None);
        assert!(!message.deleted());
    }

    #[test]
    fn test_chat_decoding() {
        let chat = Chat::decode(&json!({
            "type": "chat",
            "chat_id": 3,
            "title": "team",
            "admin_id": 10,
            "users": [10, 11, "12"]
        }))
        .unwrap();

        assert_eq!(chat.chat_id, "3");
        assert_eq!(chat.chat_type.as_deref(), Some("chat"));
        assert_eq!(chat.user_ids, vec!["10", "11", "12"]);
    }

    #[test]
    fn test_unknown_attachment_kind() {
        let attachment = Attachment::decode(&json!({"type": "graffiti"})).unwrap();
        assert_eq!(attachment.to_ref(), None);
    }
}
