//! Long-poll lifecycle
//!
//! ```text
//! AwaitingServer --connect--> Polling{server, ts} --poll--> Polling{server, ts'}
//!                                                  \--poll--> Expired
//! ```
//!
//! `Expired` is terminal for the current server binding; `connect` fetches a
//! fresh one.

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use vk_api::methods::long_poll;
use vk_api::{
    ApiError, CaptchaQuestion, DecodeError, LongPollReply, LongPollServerInfo, ResponseOutcome,
    TransportError,
};

use crate::client::VkClient;
use crate::config::LongPollConfig;

/// Errors from the long-poll lifecycle
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PollError {
    /// No server binding; call `connect` first
    #[error("Long poller is not connected")]
    NotConnected,

    /// The server rejected the key; reconnect
    #[error("Long poll server credentials have expired")]
    Expired,

    /// The caller cancelled the poll
    #[error("Long poll cancelled")]
    Cancelled,

    /// `messages.getLongPollServer` was rejected
    #[error("{0}")]
    Api(ApiError),

    /// `messages.getLongPollServer` wants a captcha solved
    #[error("Captcha required ({})", .0.captcha_id)]
    Captcha(CaptchaQuestion),

    /// The request did not complete
    #[error("Transport error: {0}")]
    Transport(TransportError),

    /// The reply could not be decoded
    #[error("Decode error: {cause}")]
    Decode {
        /// What went wrong
        cause: DecodeError,
        /// The body as received
        raw_json: String,
    },
}

/// Result type for long-poll operations
pub type Result<T> = std::result::Result<T, PollError>;

impl PollError {
    fn from_outcome<T>(outcome: ResponseOutcome<T>) -> Option<Self> {
        Some(match outcome {
            ResponseOutcome::Success(_) => return None,
            ResponseOutcome::ApiError(e) => PollError::Api(e),
            ResponseOutcome::CaptchaRequired(q) => PollError::Captcha(q),
            ResponseOutcome::TransportFailure(TransportError::Cancelled) => PollError::Cancelled,
            ResponseOutcome::TransportFailure(e) => PollError::Transport(e),
            ResponseOutcome::DecodeFailure {
                cause: DecodeError::LongPollExpired,
                ..
            } => PollError::Expired,
            ResponseOutcome::DecodeFailure { cause, raw_json } => {
                PollError::Decode { cause, raw_json }
            }
        })
    }
}

/// Where a [`LongPoller`] is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollerState {
    /// No server binding yet
    AwaitingServer,
    /// Bound to a server, ready for the next cycle
    Polling {
        /// Server binding
        server: LongPollServerInfo,
        /// Timestamp for the next cycle
        ts: String,
    },
    /// The binding expired; reconnect to continue
    Expired,
}

/// Drives the long-poll protocol for one session
///
/// Polling takes `&mut self`, so a poller never has two cycles in flight.
///
/// # Examples
/// ```
/// use tokio_util::sync::CancellationToken;
/// use vk_client::{LongPoller, PollError, VkClient, VkClientConfig};
///
/// async fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let client = VkClient::new(VkClientConfig::default())?.with_access_token("token");
///     let mut poller = LongPoller::new(client);
///     let cancel = CancellationToken::new();
///
///     poller.connect().await?;
///     loop {
///         match poller.poll(&cancel).await {
///             Ok(reply) => {
///                 for update in reply.updates() {
///                     println!("{:?}", update);
///                 }
///             }
///             Err(PollError::Expired) => {
///                 poller.connect().await?;
///             }
///             Err(PollError::Cancelled) => break,
///             Err(e) => return Err(e.into()),
///         }
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct LongPoller {
    client: VkClient,
    config: LongPollConfig,
    state: PollerState,
}

impl LongPoller {
    /// Create a poller with the default timing
    pub fn new(client: VkClient) -> Self {
        Self::with_config(client, LongPollConfig::default())
    }

    /// Create a poller with custom timing
    pub fn with_config(client: VkClient, config: LongPollConfig) -> Self {
        Self {
            client,
            config,
            state: PollerState::AwaitingServer,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> &PollerState {
        &self.state
    }

    /// Fetch a server binding and start polling from its timestamp
    ///
    /// Valid from any state. On failure the state is left unchanged.
    pub async fn connect(&mut self) -> Result<&LongPollServerInfo> {
        let outcome = self.client.execute(&long_poll::get_server()).await;
        let server = match outcome {
            ResponseOutcome::Success(server) => server,
            other => return Err(PollError::from_outcome(other).unwrap_or(PollError::NotConnected)),
        };

        tracing::info!("Connected to long poll server {}", server.server);
        self.state = PollerState::Polling {
            ts: server.ts.clone(),
            server,
        };

        match &self.state {
            PollerState::Polling { server, .. } => Ok(server),
            _ => Err(PollError::NotConnected),
        }
    }

    /// Run one poll cycle
    ///
    /// On success the next cycle continues from the returned timestamp. An
    /// expired binding moves the poller to [`PollerState::Expired`]; every
    /// other failure, cancellation included, keeps the current binding.
    pub async fn poll(&mut self, cancel: &CancellationToken) -> Result<LongPollReply> {
        let PollerState::Polling { server, ts } = &self.state else {
            return Err(PollError::NotConnected);
        };

        let request = long_poll::poll(server, Some(ts.as_str()), &self.config);
        let outcome = self.client.execute_cancellable(&request, cancel).await;

        let reply = match outcome {
            ResponseOutcome::Success(reply) => reply,
            other => {
                let error = PollError::from_outcome(other).unwrap_or(PollError::NotConnected);
                if error == PollError::Expired {
                    tracing::info!("Long poll server binding expired");
                    self.state = PollerState::Expired;
                }
                return Err(error);
            }
        };

        if let PollerState::Polling { ts, .. } = &mut self.state {
            *ts = reply.timestamp().to_string();
        }
        tracing::debug!("Long poll delivered {} updates", reply.len());

        Ok(reply)
    }
}
