//! `messages.*` methods

use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{flag, join_ids};
use crate::decode::{scalar_to_string, Decodable, DecodeError};
use crate::longpoll::AttachmentRef;
use crate::request::{HttpMethod, RequestDescriptor};
use crate::types::{Chat, ChatUserProfile, Message};

// =============================================================================
// Replies
// =============================================================================

/// Reply of the message listing methods: `[total, message, message, ...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetMessagesReply {
    /// Total number of matching messages on the server
    pub total_count: u64,
    /// The requested page
    pub messages: Vec<Message>,
}

impl Decodable for GetMessagesReply {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        let items = json
            .as_array()
            .ok_or_else(|| DecodeError::UnknownFormat(format!("expected a list, got {}", json)))?;
        let (total, rest) = items
            .split_first()
            .ok_or_else(|| DecodeError::MissingField("total count".to_string()))?;

        let total_count = scalar_to_string(total)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| DecodeError::invalid_field("total count", total.to_string()))?;
        let messages = rest.iter().map(Message::decode).collect::<Result<_, _>>()?;

        Ok(Self {
            total_count,
            messages,
        })
    }
}

/// Reply of `messages.delete`: per-id success
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeleteReply {
    /// Whether each message id was deleted
    pub results: BTreeMap<String, bool>,
}

impl DeleteReply {
    /// Whether every requested message was deleted
    pub fn all_deleted(&self) -> bool {
        self.results.values().all(|deleted| *deleted)
    }
}

impl Decodable for DeleteReply {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        let object = json
            .as_object()
            .ok_or_else(|| DecodeError::UnknownFormat(format!("expected a map, got {}", json)))?;

        let results = object
            .iter()
            .map(|(id, value)| {
                let deleted = match value {
                    Value::Bool(b) => *b,
                    Value::Number(n) => n.as_i64() != Some(0),
                    Value::String(s) => s == "1",
                    other => return Err(DecodeError::invalid_field(id.clone(), other.to_string())),
                };
                Ok((id.clone(), deleted))
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { results })
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// Conversation a message belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Peer {
    /// Private conversation with a user
    User(String),
    /// Multi-user chat
    Chat(String),
}

impl Peer {
    fn param(&self) -> (&'static str, &str) {
        match self {
            Peer::User(id) => ("uid", id),
            Peer::Chat(id) => ("chat_id", id),
        }
    }
}

/// Paging options for `messages.get`
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    /// Skip this many messages
    pub offset: Option<u32>,
    /// Only messages newer than this many seconds
    pub time_offset: Option<u32>,
    /// Truncate bodies to this many characters (`0` for full text)
    pub preview_length: Option<u32>,
    /// Outgoing (`true`) or incoming (`false`) messages
    pub outgoing: Option<bool>,
    /// Filter bit mask (`1` unread, `2` not from chats, `4` from friends)
    pub filters: Option<u32>,
}

/// Paging options for the dialog list and history
#[derive(Debug, Clone, Default)]
pub struct PageOptions {
    /// Page size
    pub count: Option<u32>,
    /// Skip this many entries
    pub offset: Option<u32>,
    /// Truncate bodies to this many characters (dialogs only)
    pub preview_length: Option<u32>,
    /// Start from this message id (history only)
    pub start_message_id: Option<String>,
    /// Oldest first (history only)
    pub chronological: Option<bool>,
}

/// Message to send with [`send`]
///
/// # Examples
/// ```
/// use vk_api::methods::messages::{self, OutgoingMessage, Peer};
/// use vk_api::AttachmentRef;
///
/// let message = OutgoingMessage::text("hello")
///     .with_attachment(AttachmentRef::new("photo", "100172", "166443618"));
/// let request = messages::send(&Peer::User("85635407".into()), &message);
///
/// assert_eq!(request.param_value("attachment"), Some("photo100172_166443618"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct OutgoingMessage {
    text: Option<String>,
    title: Option<String>,
    attachments: Vec<AttachmentRef>,
    forwarded: Vec<String>,
    chat_style: bool,
    location: Option<(f64, f64)>,
}

impl OutgoingMessage {
    /// Message with a text body
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Set the subject line
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Attach a media object
    pub fn with_attachment(mut self, attachment: AttachmentRef) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Forward an existing message
    pub fn with_forwarded(mut self, message_id: impl Into<String>) -> Self {
        self.forwarded.push(message_id.into());
        self
    }

    /// Send as a chat-style message rather than a letter
    pub fn as_chat_message(mut self) -> Self {
        self.chat_style = true;
        self
    }

    /// Attach a geographic location
    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.location = Some((latitude, longitude));
        self
    }
}

fn attachment_param(attachment: &AttachmentRef) -> String {
    format!(
        "{}{}_{}",
        attachment.kind, attachment.owner_id, attachment.media_id
    )
}

/// The server drops repeated sends that carry the same `guid`.
fn next_guid() -> String {
    Uuid::new_v4().simple().to_string()
}

// =============================================================================
// Methods
// =============================================================================

fn list_request(name: &str) -> RequestDescriptor<GetMessagesReply> {
    RequestDescriptor::method(name, HttpMethod::Get)
}

/// `messages.get`: latest incoming or outgoing messages
pub fn get(count: u32, options: &GetOptions) -> RequestDescriptor<GetMessagesReply> {
    list_request("messages.get")
        .param("count", count)
        .opt_param("offset", options.offset)
        .opt_param("time_offset", options.time_offset)
        .opt_param("out", options.outgoing.map(flag))
        .opt_param("filters", options.filters)
        .opt_param("preview_length", options.preview_length)
}

/// `messages.getById`
pub fn get_by_ids<I, S>(message_ids: I, preview_length: Option<u32>) -> RequestDescriptor<GetMessagesReply>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    list_request("messages.getById")
        .param("mids", join_ids(message_ids))
        .opt_param("preview_length", preview_length)
}

/// `messages.getById` for a single message
pub fn get_by_id(message_id: &str, preview_length: Option<u32>) -> RequestDescriptor<GetMessagesReply> {
    get_by_ids([message_id], preview_length)
}

/// `messages.getDialogs`: conversation list, optionally around one peer
pub fn get_dialogs(peer: Option<&Peer>, options: &PageOptions) -> RequestDescriptor<GetMessagesReply> {
    let request = list_request("messages.getDialogs")
        .opt_param("count", options.count)
        .opt_param("offset", options.offset)
        .opt_param("preview_length", options.preview_length);

    match peer.map(Peer::param) {
        Some((key, id)) => request.param(key, id),
        None => request,
    }
}

/// `messages.getHistory`: messages of one conversation
pub fn get_history(peer: &Peer, options: &PageOptions) -> RequestDescriptor<GetMessagesReply> {
    let (key, id) = peer.param();
    list_request("messages.getHistory")
        .param(key, id)
        .opt_param("count", options.count)
        .opt_param("offset", options.offset)
        .opt_param("start_mid", options.start_message_id.as_deref())
        .opt_param("rev", options.chronological.map(flag))
}

/// `messages.send`: replies with the new message id
///
/// Every call generates a fresh `guid`, so two descriptors built for the same
/// text are two distinct messages, while resubmitting one descriptor (for
/// example after a captcha) is not.
pub fn send(peer: &Peer, message: &OutgoingMessage) -> RequestDescriptor<String> {
    let (key, id) = peer.param();
    let attachments = (!message.attachments.is_empty())
        .then(|| message.attachments.iter().map(attachment_param).collect::<Vec<_>>().join(","));
    let forwarded = (!message.forwarded.is_empty()).then(|| join_ids(&message.forwarded));

    RequestDescriptor::method("messages.send", HttpMethod::Post)
        .param(key, id)
        .opt_param("message", message.text.as_deref())
        .opt_param("title", message.title.as_deref())
        .opt_param("attachment", attachments)
        .opt_param("forward_messages", forwarded)
        .opt_param("type", message.chat_style.then_some(1))
        .opt_param("lat", message.location.map(|(lat, _)| lat))
        .opt_param("long", message.location.map(|(_, long)| long))
        .param("guid", next_guid())
}

/// `messages.delete`
pub fn delete<I, S>(message_ids: I) -> RequestDescriptor<DeleteReply>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    RequestDescriptor::method("messages.delete", HttpMethod::Post).param("mids", join_ids(message_ids))
}

/// `messages.restore`: undo a recent delete
pub fn restore(message_id: &str) -> RequestDescriptor<String> {
    RequestDescriptor::method("messages.restore", HttpMethod::Post).param("mid", message_id)
}

/// `messages.createChat`: replies with the new chat id
pub fn create_chat<I, S>(user_ids: I, title: Option<&str>) -> RequestDescriptor<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    RequestDescriptor::method("messages.createChat", HttpMethod::Post)
        .param("uids", join_ids(user_ids))
        .opt_param("title", title)
}

/// `messages.editChat`: rename a chat
pub fn edit_chat(chat_id: &str, title: &str) -> RequestDescriptor<String> {
    RequestDescriptor::method("messages.editChat", HttpMethod::Post)
        .param("chat_id", chat_id)
        .param("title", title)
}

/// Profile fields requested for chat members
pub const CHAT_USER_FIELDS: &str = "uid,first_name,last_name,nickname,photo";

/// `messages.getChatUsers`
pub fn get_chat_users(chat_id: &str) -> RequestDescriptor<Vec<ChatUserProfile>> {
    RequestDescriptor::method("messages.getChatUsers", HttpMethod::Get)
        .param("chat_id", chat_id)
        .param("fields", CHAT_USER_FIELDS)
}

/// `messages.addChatUser`
pub fn add_chat_user(chat_id: &str, user_id: &str) -> RequestDescriptor<String> {
    RequestDescriptor::method("messages.addChatUser", HttpMethod::Post)
        .param("chat_id", chat_id)
        .param("uid", user_id)
}

/// `messages.removeChatUser`
pub fn remove_chat_user(chat_id: &str, user_id: &str) -> RequestDescriptor<String> {
    RequestDescriptor::method("messages.removeChatUser", HttpMethod::Post)
        .param("chat_id", chat_id)
        .param("uid", user_id)
}

/// `messages.getChat`
pub fn get_chat(chat_id: &str) -> RequestDescriptor<Chat> {
    RequestDescriptor::method("messages.getChat", HttpMethod::Get).param("chat_id", chat_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, TransportResult};
    use crate::outcome::ResponseOutcome;
    use serde_json::json;

    #[test]
    fn test_get_messages_reply() {
        let reply = GetMessagesReply::decode(&json!([
            4680,
            {"body": "thank you", "title": "Re:  ...", "date": 1268213453, "uid": 28672529, "mid": 10836, "read_state": 0},
            {"body": "nothing", "title": "Re:  ...", "date": 1268213443, "uid": 58416643, "mid": 10835, "read_state": 0}
        ]))
        .unwrap();

        assert_eq!(reply.total_count, 4680);
        assert_eq!(reply.messages.len(), 2);
        assert_eq!(reply.messages[0].id.as_deref(), Some("10836"));
        assert_eq!(reply.messages[1].body, "nothing");
    }

    #[test]
    fn test_get_messages_reply_shapes() {
        let empty = GetMessagesReply::decode(&json!([0])).unwrap();
        assert_eq!(empty.total_count, 0);
        assert!(empty.messages.is_empty());

        assert!(matches!(
            GetMessagesReply::decode(&json!([])).unwrap_err(),
            DecodeError::MissingField(_)
        ));
        assert!(matches!(
            GetMessagesReply::decode(&json!({"count": 1})).unwrap_err(),
            DecodeError::UnknownFormat(_)
        ));
    }

    #[test]
    fn test_delete_reply() {
        let reply = DeleteReply::decode(&json!({"16929": 1, "16930": true})).unwrap();
        assert!(reply.all_deleted());

        let partial = DeleteReply::decode(&json!({"1": 1, "2": 0})).unwrap();
        assert!(!partial.all_deleted());
        assert_eq!(partial.results.get("2"), Some(&false));

        assert!(DeleteReply::decode(&json!({"1": [1]})).is_err());
    }

    #[test]
    fn test_get_params() {
        let request = get(
            1,
            &GetOptions {
                outgoing: Some(true),
                preview_length: Some(0),
                ..Default::default()
            },
        );

        assert_eq!(request.resource(), "method/messages.get");
        assert_eq!(request.http_method(), HttpMethod::Get);
        let sent: Vec<_> = request.query_pairs().collect();
        assert_eq!(sent, vec![("count", "1"), ("out", "1"), ("preview_length", "0")]);
    }

    #[test]
    fn test_get_by_ids() {
        let request = get_by_ids(["1", "2"], None);
        assert_eq!(request.param_value("mids"), Some("1,2"));
        assert_eq!(get_by_id("7", Some(20)).param_value("preview_length"), Some("20"));
    }

    #[test]
    fn test_peer_params() {
        let history = get_history(&Peer::Chat("3".into()), &PageOptions::default());
        assert_eq!(history.param_value("chat_id"), Some("3"));
        assert!(!history.has_param("uid"));

        let dialogs = get_dialogs(None, &PageOptions { count: Some(20), ..Default::default() });
        assert_eq!(dialogs.query_pairs().count(), 1);
    }

    #[test]
    fn test_send_params() {
        let message = OutgoingMessage::text("hello")
            .with_title("hi")
            .with_attachment(AttachmentRef::new("photo", "100172", "166443618"))
            .with_attachment(AttachmentRef::new("doc", "-1", "2"))
            .with_forwarded("10")
            .as_chat_message()
            .with_location(55.75, 37.61);
        let request = send(&Peer::User("85635407".into()), &message);

        assert_eq!(request.http_method(), HttpMethod::Post);
        assert_eq!(request.param_value("uid"), Some("85635407"));
        assert_eq!(request.param_value("message"), Some("hello"));
        assert_eq!(
            request.param_value("attachment"),
            Some("photo100172_166443618,doc-1_2")
        );
        assert_eq!(request.param_value("forward_messages"), Some("10"));
        assert_eq!(request.param_value("type"), Some("1"));
        assert_eq!(request.param_value("lat"), Some("55.75"));
        assert_eq!(request.param_value("long"), Some("37.61"));
    }

    #[test]
    fn test_send_guid_is_unique() {
        let message = OutgoingMessage::text("same");
        let peer = Peer::User("1".into());
        let first = send(&peer, &message);
        let second = send(&peer, &message);

        let guid = first.param_value("guid").unwrap();
        assert_eq!(guid.len(), 32);
        assert!(guid.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_ne!(first.param_value("guid"), second.param_value("guid"));

        let minimal = send(&peer, &OutgoingMessage::text("x"));
        assert_eq!(minimal.param_value("attachment"), None);
        assert_eq!(minimal.param_value("type"), None);
    }

    #[test]
    fn test_chat_methods() {
        let create = create_chat(["1", "2"], Some("team"));
        assert_eq!(create.param_value("uids"), Some("1,2"));
        assert_eq!(create.param_value("title"), Some("team"));

        let users = get_chat_users("3");
        assert_eq!(users.param_value("fields"), Some(CHAT_USER_FIELDS));

        assert_eq!(add_chat_user("3", "4").resource(), "method/messages.addChatUser");
        assert_eq!(remove_chat_user("3", "4").param_value("uid"), Some("4"));
        assert_eq!(edit_chat("3", "t").param_value("title"), Some("t"));
    }

    #[test]
    fn test_get_chat_classified() {
        let body = r#"{"response":{"type":"chat","chat_id":149,"title":"test","admin_id":"66748","users":[66748,85635407,4766,-2000000001]}}"#;
        let outcome = classify(&TransportResult::completed(body), &get_chat("149"));

        match outcome {
            ResponseOutcome::Success(chat) => {
                assert_eq!(chat.chat_id, "149");
                assert_eq!(chat.user_ids.len(), 4);
                assert_eq!(chat.user_ids[3], "-2000000001");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_restore_classified() {
        let outcome = classify(&TransportResult::completed(r#"{"response":1}"#), &restore("42"));
        assert_eq!(outcome, ResponseOutcome::Success("1".to_string()));
    }
}
