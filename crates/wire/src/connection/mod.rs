//! Connection halves that read and write framed messages.
//!
//! A connection is exclusively owned by the task that handles it. The read
//! half ([`MessageReader`]) and the write half ([`MessageWriter`]) are plain
//! owned values, and [`WireConnection`] pairs them under one absolute deadline.
//! Every suspension point (reading the head, reading or copying the body,
//! writing a message) is bounded by that deadline.

mod message_reader;
mod message_writer;
mod wire_connection;

pub use message_reader::{IncomingMessage, MessageReader};
pub use message_writer::MessageWriter;
pub use wire_connection::WireConnection;
