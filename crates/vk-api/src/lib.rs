//! VK API core
//!
//! This crate holds the transport-independent half of the VK client: request
//! descriptors, the response classifier that turns a raw reply into a
//! [`ResponseOutcome`], the captcha retry protocol, and the long-poll event
//! decoder. Nothing in here performs I/O.
//!
//! # Example
//!
//! ```
//! use vk_api::{classify, methods::messages, ResponseOutcome, TransportResult};
//!
//! let request = messages::restore("42");
//! let reply = TransportResult::completed(r#"{"response": 1}"#);
//!
//! match classify(&reply, &request) {
//!     ResponseOutcome::Success(value) => assert_eq!(value, "1"),
//!     other => panic!("unexpected outcome: {:?}", other),
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod captcha;
pub mod classify;
pub mod decode;
pub mod error_code;
pub mod longpoll;
pub mod methods;
pub mod outcome;
pub mod request;
pub mod types;

pub use captcha::{CaptchaAnswer, CaptchaError};
pub use classify::{classify, TransportResult, TransportStatus};
pub use decode::{Decodable, DecodeError, Raw};
pub use error_code::ErrorCode;
pub use longpoll::{
    AttachmentRef, EventType, LongPollReply, LongPollServerInfo, LongPollUpdate, MessageFlags,
};
pub use outcome::{ApiError, CaptchaQuestion, OutcomeError, ResponseOutcome, TransportError};
pub use request::{Envelope, HttpMethod, Priority, RequestDescriptor};

/// Base URL for session-scoped API methods
pub const API_BASE_URL: &str = "https://api.vk.com";

/// Base URL for the OAuth token exchange
pub const OAUTH_BASE_URL: &str = "https://oauth.vk.com";
