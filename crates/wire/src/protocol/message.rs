use std::io::Cursor;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use tracing::trace;

use crate::codec::HeadEncoder;
use crate::protocol::head::CONTENT_LENGTH;
use crate::protocol::{Body, BodyError, BuildError, HeaderMap, MessageHead, SendError};

/// A message built in memory, ready to be written to a connection.
pub type OutgoingMessage = Message<Cursor<Bytes>>;

/// A parsed or constructed message: an immutable head plus a bounded body.
///
/// For parsed messages `B` borrows the connection reader, so the message
/// cannot outlive the read half it came from and nothing else can read from
/// that half while the body is pending.
#[derive(Debug)]
pub struct Message<B> {
    head: MessageHead,
    body: Body<B>,
}

impl<B> Message<B>
where
    B: AsyncRead + Unpin,
{
    /// Pairs a head with a body.
    ///
    /// The two are not checked against each other here; a body whose length
    /// differs from the declared one is refused by [`Message::write_to`].
    pub fn new(head: MessageHead, body: Body<B>) -> Self {
        Self { head, body }
    }

    pub fn head(&self) -> &MessageHead {
        &self.head
    }

    pub fn status_line(&self) -> &str {
        self.head.status_line()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.head.headers()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.head.content_length()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.head.content_type()
    }

    pub fn head_len(&self) -> usize {
        self.head.head_len()
    }

    pub fn total_len(&self) -> u64 {
        self.head.total_len()
    }

    pub fn body_mut(&mut self) -> &mut Body<B> {
        &mut self.body
    }

    pub fn is_body_consumed(&self) -> bool {
        self.body.is_consumed()
    }

    pub fn into_parts(self) -> (MessageHead, Body<B>) {
        (self.head, self.body)
    }

    /// Serializes the message into `sink` and flushes it.
    ///
    /// Writes the status line, the headers sorted by name, the blank line, and
    /// then exactly `Content-Length` body bytes. A message without a declared
    /// length is written head-only. Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// - [`BodyError::AlreadyConsumed`] on a second call, before anything is written
    /// - [`SendError::LengthMismatch`] if the body length differs from the
    ///   declared one, or a body is present without a declared length; nothing
    ///   is written
    /// - [`BodyError::Incomplete`] if the body source runs dry early
    /// - any I/O error from `sink`
    pub async fn write_to<W>(&mut self, sink: &mut W) -> Result<u64, SendError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        if self.body.is_consumed() {
            return Err(BodyError::AlreadyConsumed.into());
        }

        let declared = self.head.content_length();
        let actual = self.body.len();
        if declared.unwrap_or(0) != actual {
            return Err(SendError::length_mismatch(declared, actual));
        }

        let mut buf = BytesMut::with_capacity(self.head.head_len());
        HeadEncoder.encode(&self.head, &mut buf)?;
        sink.write_all(&buf).await?;

        let body_written = self.body.copy_to(sink).await?;
        sink.flush().await?;

        let written = buf.len() as u64 + body_written;
        trace!(head = buf.len(), body = body_written, "message written");
        Ok(written)
    }
}

impl OutgoingMessage {
    pub fn builder(status_line: impl Into<String>) -> MessageBuilder {
        MessageBuilder::new(status_line)
    }
}

/// Assembles an [`OutgoingMessage`] or a streaming message.
///
/// Errors are deferred until the final call so the builder chains cleanly:
///
/// ```
/// use micro_wire::protocol::OutgoingMessage;
///
/// let message = OutgoingMessage::builder("HTTP/1.1 200 OK")
///     .header("Content-Type", "text/plain")
///     .body("Hello")
///     .unwrap();
///
/// assert_eq!(message.content_length(), Some(5));
/// ```
#[derive(Debug)]
pub struct MessageBuilder {
    inner: Result<(String, HeaderMap), BuildError>,
}

impl MessageBuilder {
    pub fn new(status_line: impl Into<String>) -> Self {
        let status_line = status_line.into();
        let inner = if status_line.bytes().any(|b| b == b'\r' || b == b'\n') {
            Err(BuildError::InvalidStatusLine { line: status_line })
        } else {
            Ok((status_line, HeaderMap::new()))
        };
        Self { inner }
    }

    /// Appends a header; repeated names keep every value.
    #[must_use]
    pub fn header(self, name: &str, value: &str) -> Self {
        let inner = self.inner.and_then(|(status_line, mut headers)| {
            headers.append(name, value)?;
            Ok((status_line, headers))
        });
        Self { inner }
    }

    /// Finishes with an in-memory body and sets `Content-Length` to its size.
    pub fn body(self, body: impl Into<Bytes>) -> Result<OutgoingMessage, BuildError> {
        let body = body.into();
        let length = body.len() as u64;
        self.streaming_body(Cursor::new(body), length)
    }

    /// Finishes with a body read from `reader`, declaring `length` bytes.
    ///
    /// `length` must fit a signed 64-bit integer, the range a `Content-Length`
    /// is parsed in.
    pub fn streaming_body<B>(self, reader: B, length: u64) -> Result<Message<B>, BuildError>
    where
        B: AsyncRead + Unpin,
    {
        let (status_line, mut headers) = self.inner?;
        if i64::try_from(length).is_err() {
            return Err(BuildError::LengthOutOfRange { length });
        }
        headers.insert(CONTENT_LENGTH, &length.to_string())?;
        Ok(Message::new(build_head(status_line, headers, Some(length)), Body::new(reader, length)))
    }

    /// Finishes without a body and without a `Content-Length` header.
    pub fn empty(self) -> Result<OutgoingMessage, BuildError> {
        let (status_line, mut headers) = self.inner?;
        headers.remove(CONTENT_LENGTH);
        Ok(Message::new(build_head(status_line, headers, None), Body::new(Cursor::new(Bytes::new()), 0)))
    }
}

fn build_head(status_line: String, headers: HeaderMap, content_length: Option<u64>) -> MessageHead {
    let head_len = status_line.len() + 2 + headers.encoded_len() + 2;
    MessageHead::from_trusted_parts(status_line, headers, content_length, head_len)
}
