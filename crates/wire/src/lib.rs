//! Length-delimited text message framing over async byte streams.
//!
//! A message on the wire is a status line, a block of `Name: Value` headers,
//! a blank line, and exactly `Content-Length` body bytes:
//!
//! ```text
//! GET / HTTP/1.0\r\n
//! User-Agent: x\r\n
//! Content-Length: 5\r\n
//! \r\n
//! Hello
//! ```
//!
//! This crate frames such messages from an untrusted, partially buffered
//! stream and serializes them back. The body is never read eagerly: a parsed
//! message hands out a [`protocol::Body`] limited to the declared length, so
//! bytes that follow the message on the stream are left alone.
//!
//! # Example
//!
//! ```no_run
//! use micro_wire::WireConfig;
//! use micro_wire::connection::WireConnection;
//! use micro_wire::protocol::{OutgoingMessage, RequestLine};
//! use tokio::net::TcpListener;
//! use tracing::{info, warn};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let (stream, _remote_addr) = listener.accept().await?;
//!
//!     let mut connection = WireConnection::from_tcp(stream, &WireConfig::default());
//!     let (reader, writer) = connection.split();
//!
//!     let Some(mut request) = reader.read_message().await? else {
//!         return Ok(());
//!     };
//!     let line: RequestLine = request.head().request_line()?;
//!     let body = request.body_mut().read_to_bytes().await?;
//!     info!(path = line.path(), len = body.len(), "received request");
//!
//!     let mut response = OutgoingMessage::builder("HTTP/1.1 200 OK").body(body)?;
//!     if let Err(e) = writer.write_message(&mut response).await {
//!         warn!(cause = %e, "failed to answer");
//!     }
//!     writer.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`codec`]: line, header and head decoders, and the head encoder
//! - [`protocol`]: the message model ([`protocol::MessageHead`],
//!   [`protocol::Body`], [`protocol::Message`]) and error types
//! - [`connection`]: read and write halves bound to a connection deadline
//!
//! # Errors
//!
//! Every error exposes an [`protocol::ErrorClass`]. Framing, body-length and
//! timeout failures leave the stream position unknown and the connection
//! should be closed. Validation failures concern a well framed message and
//! may still be answered.
//!
//! # Limitations
//!
//! - no chunked transfer encoding, keep-alive or pipelining
//! - maximum head size 8 KiB and 64 headers by default, see [`WireConfig`]

pub mod codec;
pub mod config;
pub mod connection;
pub mod protocol;

pub use config::WireConfig;

mod utils;
pub(crate) use utils::ensure;
