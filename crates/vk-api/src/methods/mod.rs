//! Request builders for the API methods the client uses
//!
//! Each function returns a ready [`RequestDescriptor`](crate::RequestDescriptor)
//! with its decoder registered; nothing is sent until a transport executes it.

pub mod auth;
pub mod friends;
pub mod long_poll;
pub mod messages;
pub mod users;

pub use messages::{DeleteReply, GetMessagesReply, OutgoingMessage, Peer};
pub use users::NameCase;

/// Comma-separated id list as the API expects it
pub(crate) fn join_ids<I, S>(ids: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ids.into_iter()
        .map(|id| id.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Boolean parameters travel as `1` / `0`
pub(crate) fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_ids() {
        assert_eq!(join_ids(["1", "2", "3"]), "1,2,3");
        assert_eq!(join_ids(Vec::<String>::new()), "");
        assert_eq!(join_ids(vec!["42".to_string()]), "42");
    }

    #[test]
    fn test_flag() {
        assert_eq!(flag(true), "1");
        assert_eq!(flag(false), "0");
    }
}
