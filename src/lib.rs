//! VK Compass
//!
//! Client SDK for the VK social network API. The work is split in two crates:
//!
//! - [`vk_api`]: request descriptors, the response classification pipeline,
//!   the error taxonomy, the captcha retry protocol and the long-poll decoder.
//!   Pure and synchronous.
//! - [`vk_client`]: executes descriptors over HTTP and drives the long-poll
//!   lifecycle.
//!
//! # Examples
//! ```no_run
//! use vk_compass::messages::{self, OutgoingMessage, Peer};
//! use vk_compass::{VkClient, VkClientConfig};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     vk_compass::init_logging();
//!
//!     let client = VkClient::new(VkClientConfig::default())?.with_access_token("token");
//!     let peer = Peer::User("85635407".to_string());
//!     let id = client
//!         .execute(&messages::send(&peer, &OutgoingMessage::text("hello")))
//!         .await
//!         .into_result()?;
//!     println!("sent message {}", id);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use vk_api;
pub use vk_client;

pub use vk_api::methods::{auth, friends, long_poll, messages, users};
pub use vk_api::{
    ApiError, CaptchaAnswer, CaptchaQuestion, DecodeError, ErrorCode, LongPollReply,
    LongPollUpdate, OutcomeError, RequestDescriptor, ResponseOutcome, TransportError,
};
pub use vk_client::{
    CancellationToken, LongPollConfig, LongPoller, PollError, VkClient, VkClientConfig,
};

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Install a `tracing` subscriber that logs to stderr
///
/// The filter comes from `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`].
/// Calling this again, or after another subscriber was installed, does
/// nothing.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global subscriber already installed");
    }
}
