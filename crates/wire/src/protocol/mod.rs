//! Message model and error types.
//!
//! A message is a [`MessageHead`] (status line, [`HeaderMap`], declared body
//! length) followed by a [`Body`] that yields exactly the declared number of
//! bytes. Parsed messages borrow their body from the connection; messages built
//! with [`MessageBuilder`] own it.
//!
//! The status line is kept verbatim. [`RequestLine`] and [`StatusLine`] give
//! typed views for callers that need a request or response shape, and report a
//! mismatch as a [`ValidationError`] rather than a framing failure.
//!
//! # Content-Length
//!
//! The declared length has three distinct states: present and valid, absent,
//! and present but invalid. The last one never produces a head; it fails
//! framing with [`ParseError::InvalidContentLength`]. An absent length frames
//! a zero-length body while [`MessageHead::content_length`] still reports
//! `None`.

mod body;
mod error;
pub mod head;
mod header_map;
mod line;
mod message;

pub use body::Body;
pub use error::{BodyError, BuildError, ErrorClass, HeaderError, ParseError, SendError, ValidationError, WireError};
pub use head::MessageHead;
pub use header_map::{HeaderMap, canonical_name};
pub use line::{DEFAULT_PROTOCOL, RequestLine, StatusLine};
pub use message::{Message, MessageBuilder, OutgoingMessage};
