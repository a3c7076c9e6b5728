//! VK API HTTP client
//!
//! Executes request descriptors from [`vk_api`] over HTTP, hands the replies
//! to the classification pipeline and drives the long-poll lifecycle.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod client;
pub mod config;
pub mod poller;
pub mod transport;

pub use auth::{AccessTokenAuthenticator, Authenticator};
pub use client::{ClientError, VkClient};
pub use config::{LongPollConfig, VkClientConfig};
pub use poller::{LongPoller, PollError, PollerState};
pub use transport::{HttpRequest, HttpTransport, ReqwestTransport};

pub use tokio_util::sync::CancellationToken;
