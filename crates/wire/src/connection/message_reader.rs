use bytes::BytesMut;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::time::Instant;
use tokio_util::codec::Decoder;
use tracing::{debug, trace};

use crate::codec::HeadDecoder;
use crate::config::WireConfig;
use crate::protocol::{Body, Message, MessageHead, ParseError};
use crate::utils::within;

/// A message whose body is still on the connection.
pub type IncomingMessage<'conn, R> = Message<&'conn mut BufReader<R>>;

/// Reads framed messages from the read half of a connection.
///
/// The head is pulled one line at a time through the buffered reader, so when
/// [`MessageReader::read_message`] returns, the reader sits exactly on the
/// first body byte. The returned message borrows the reader mutably: nothing
/// else can read from this half until the message is dropped.
#[derive(Debug)]
pub struct MessageReader<R> {
    reader: BufReader<R>,
    decoder: HeadDecoder,
    deadline: Option<Instant>,
    line: Vec<u8>,
    buf: BytesMut,
}

impl<R> MessageReader<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, &WireConfig::default())
    }

    /// Creates a reader whose deadline starts counting now.
    pub fn with_config(reader: R, config: &WireConfig) -> Self {
        Self {
            reader: BufReader::new(reader),
            decoder: HeadDecoder::new(config),
            deadline: config.deadline_from_now(),
            line: Vec::new(),
            buf: BytesMut::new(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn set_deadline(&mut self, deadline: Option<Instant>) {
        self.deadline = deadline;
    }

    /// Reads the next head, leaving its body unread on the stream.
    ///
    /// Returns `Ok(None)` when the peer closed the stream before sending a
    /// single byte.
    ///
    /// # Errors
    ///
    /// - [`ParseError::IncompleteHead`] if the stream ends inside the head
    /// - [`ParseError::Timeout`] if the deadline passes first
    /// - any framing error of [`HeadDecoder`]
    pub async fn read_head(&mut self) -> Result<Option<MessageHead>, ParseError> {
        let deadline = self.deadline;
        let result = within(deadline, self.read_head_lines(), || ParseError::Timeout).await;
        if result.is_err() {
            self.decoder.reset();
            self.buf.clear();
        }
        result
    }

    /// Reads the next message. Its body stays on the stream until it is read
    /// through [`Message::body_mut`].
    pub async fn read_message(&mut self) -> Result<Option<IncomingMessage<'_, R>>, ParseError> {
        let Some(head) = self.read_head().await? else {
            debug!("stream closed before any message");
            return Ok(None);
        };

        let body = Body::new(&mut self.reader, head.body_len()).with_deadline(self.deadline);
        Ok(Some(Message::new(head, body)))
    }

    pub fn get_ref(&self) -> &R {
        self.reader.get_ref()
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    async fn read_head_lines(&mut self) -> Result<Option<MessageHead>, ParseError> {
        loop {
            // one byte past the limit so an oversized line is noticed
            let limit = self.decoder.remaining() as u64 + 1;
            self.line.clear();
            let read = (&mut self.reader).take(limit).read_until(b'\n', &mut self.line).await?;
            trace!(read, "read head bytes");

            if read == 0 {
                return self.decoder.decode_eof(&mut self.buf);
            }

            self.buf.extend_from_slice(&self.line);
            if let Some(head) = self.decoder.decode(&mut self.buf)? {
                return Ok(Some(head));
            }
        }
    }
}
