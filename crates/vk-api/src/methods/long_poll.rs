//! Long-poll connection and polling requests

use std::time::Duration;

use crate::longpoll::{LongPollReply, LongPollServerInfo};
use crate::request::{HttpMethod, Priority, RequestDescriptor};

/// How long the server holds a poll open by default
pub const DEFAULT_WAIT: Duration = Duration::from_secs(25);

/// Added to the wait time to get the transport timeout of a poll
pub const TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Long-poll timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongPollConfig {
    /// How long the server may hold a poll open
    pub wait: Duration,
    /// Extra time granted to the transport on top of `wait`
    pub timeout_margin: Duration,
}

impl Default for LongPollConfig {
    fn default() -> Self {
        Self {
            wait: DEFAULT_WAIT,
            timeout_margin: TIMEOUT_MARGIN,
        }
    }
}

impl LongPollConfig {
    /// Set the wait time
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    /// Set the timeout margin
    pub fn with_timeout_margin(mut self, margin: Duration) -> Self {
        self.timeout_margin = margin;
        self
    }

    /// Transport timeout of a single poll
    pub fn poll_timeout(&self) -> Duration {
        self.wait + self.timeout_margin
    }
}

/// `messages.getLongPollServer`
pub fn get_server() -> RequestDescriptor<LongPollServerInfo> {
    RequestDescriptor::method("messages.getLongPollServer", HttpMethod::Get)
        .priority(Priority::LongPoll)
}

/// One `a_check` cycle against the long-poll server
///
/// `ts` defaults to the timestamp the server info was issued with. Attachment
/// data is always requested (`mode=2`). The transport timeout is
/// [`LongPollConfig::poll_timeout`].
pub fn poll(
    server: &LongPollServerInfo,
    ts: Option<&str>,
    config: &LongPollConfig,
) -> RequestDescriptor<LongPollReply> {
    RequestDescriptor::standalone(server.url(), "", HttpMethod::Get)
        .priority(Priority::LongPoll)
        .timeout(config.poll_timeout())
        .param("act", "a_check")
        .param("ts", ts.unwrap_or(server.ts.as_str()))
        .param("key", &server.key)
        .param("wait", config.wait.as_secs())
        .param("mode", 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, TransportResult};
    use crate::request::Envelope;
    use crate::LongPollUpdate;

    fn server() -> LongPollServerInfo {
        LongPollServerInfo {
            key: "4521b167a954cad338c28ea29dc4985fc81c36af".into(),
            server: "im0.vkontakte.ru/im748".into(),
            ts: "1063177508".into(),
        }
    }

    #[test]
    fn test_get_server_request() {
        let request = get_server();
        assert_eq!(request.resource(), "method/messages.getLongPollServer");
        assert_eq!(request.priority_tag(), Priority::LongPoll);
        assert!(request.is_authenticated());
    }

    #[test]
    fn test_poll_request() {
        let request = poll(&server(), None, &LongPollConfig::default());

        assert_eq!(request.base_url_override(), Some("https://im0.vkontakte.ru/im748"));
        assert_eq!(request.resource(), "");
        assert_eq!(request.envelope(), Envelope::Root);
        assert!(!request.is_authenticated());
        assert_eq!(request.timeout_override(), Some(Duration::from_secs(30)));

        let sent: Vec<_> = request.query_pairs().collect();
        assert_eq!(
            sent,
            vec![
                ("act", "a_check"),
                ("key", "4521b167a954cad338c28ea29dc4985fc81c36af"),
                ("mode", "2"),
                ("ts", "1063177508"),
                ("wait", "25"),
            ]
        );
    }

    #[test]
    fn test_poll_with_newer_ts() {
        let config = LongPollConfig::default().with_wait(Duration::from_secs(10));
        let request = poll(&server(), Some("1063177600"), &config);
        assert_eq!(request.param_value("ts"), Some("1063177600"));
        assert_eq!(request.param_value("wait"), Some("10"));
        assert_eq!(request.timeout_override(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_poll_timeout_follows_config_margin() {
        let config = LongPollConfig::default()
            .with_wait(Duration::from_secs(1))
            .with_timeout_margin(Duration::from_millis(500));
        let request = poll(&server(), None, &config);
        assert_eq!(request.param_value("wait"), Some("1"));
        assert_eq!(request.timeout_override(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_long_poll_config() {
        let config = LongPollConfig::default();
        assert_eq!(config.wait, Duration::from_secs(25));
        assert_eq!(config.timeout_margin, Duration::from_secs(5));
        assert_eq!(config.poll_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_poll_reply_classified() {
        let body = r#"{"ts":196851352,"updates":[[9,-835293,1],[9,-23498,1]]}"#;
        let reply = classify(&TransportResult::completed(body), &poll(&server(), None, &LongPollConfig::default()))
            .into_result()
            .unwrap();

        assert_eq!(reply.timestamp(), "196851352");
        let ids: Vec<_> = reply
            .updates()
            .map(|u| match u {
                LongPollUpdate::FriendStatusOffline { user_id, .. } => user_id.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(ids, vec!["835293", "23498"]);
    }

    #[test]
    fn test_poll_expired_classified() {
        let outcome = classify(
            &TransportResult::completed(r#"{"failed":2}"#),
            &poll(&server(), None, &LongPollConfig::default()),
        );
        assert!(outcome.is_long_poll_expired());
    }
}
