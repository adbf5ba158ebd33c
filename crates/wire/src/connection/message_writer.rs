use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::time::Instant;
use tracing::debug;

use crate::config::WireConfig;
use crate::protocol::{Message, SendError};
use crate::utils::within;

/// Writes messages to the write half of a connection.
#[derive(Debug)]
pub struct MessageWriter<W> {
    writer: BufWriter<W>,
    deadline: Option<Instant>,
}

impl<W> MessageWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, &WireConfig::default())
    }

    pub fn with_config(writer: W, config: &WireConfig) -> Self {
        Self { writer: BufWriter::new(writer), deadline: config.deadline_from_now() }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn set_deadline(&mut self, deadline: Option<Instant>) {
        self.deadline = deadline;
    }

    /// Serializes `message` and flushes it to the peer.
    ///
    /// # Errors
    ///
    /// Everything [`Message::write_to`] reports, and [`SendError::Timeout`]
    /// when the connection deadline passes mid-write.
    pub async fn write_message<B>(&mut self, message: &mut Message<B>) -> Result<u64, SendError>
    where
        B: AsyncRead + Unpin,
    {
        let deadline = self.deadline;
        let written = within(deadline, message.write_to(&mut self.writer), || SendError::Timeout).await?;
        debug!(written, status_line = message.status_line(), "sent message");
        Ok(written)
    }

    /// Flushes anything buffered and closes the write direction.
    pub async fn shutdown(&mut self) -> Result<(), SendError> {
        let deadline = self.deadline;
        within(deadline, async { Ok::<_, SendError>(self.writer.shutdown().await?) }, || SendError::Timeout).await
    }

    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::OutgoingMessage;

    #[tokio::test]
    async fn writes_and_flushes() {
        let mut writer = MessageWriter::new(Vec::new());
        let mut message = OutgoingMessage::builder("HTTP/1.1 200 OK").body("done").unwrap();

        let written = writer.write_message(&mut message).await.unwrap();

        let expected = b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\ndone";
        assert_eq!(written, expected.len() as u64);
        assert_eq!(writer.get_ref(), expected);
    }

    #[tokio::test]
    async fn stalled_peer_hits_deadline() {
        let (_peer, local) = tokio::io::duplex(4);
        let config = WireConfig::default().with_timeout(Some(std::time::Duration::from_millis(50)));
        let mut writer = MessageWriter::with_config(local, &config);
        let mut message = OutgoingMessage::builder("HTTP/1.1 200 OK").body(vec![b'x'; 64 * 1024]).unwrap();

        assert!(matches!(writer.write_message(&mut message).await, Err(SendError::Timeout)));
    }
}
