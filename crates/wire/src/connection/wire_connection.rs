use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::Instant;

use crate::config::WireConfig;
use crate::connection::{MessageReader, MessageWriter};

/// The two halves of one connection, sharing a single absolute deadline.
///
/// Reading and writing go through [`WireConnection::split`], which hands out
/// disjoint mutable borrows. A parsed message keeps the read half borrowed
/// until it is dropped, so its body can be copied straight into the write half
/// while no other read can move the stream cursor.
#[derive(Debug)]
pub struct WireConnection<R, W> {
    reader: MessageReader<R>,
    writer: MessageWriter<W>,
}

impl<R, W> WireConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, &WireConfig::default())
    }

    pub fn with_config(reader: R, writer: W, config: &WireConfig) -> Self {
        let mut connection =
            Self { reader: MessageReader::with_config(reader, config), writer: MessageWriter::with_config(writer, config) };
        connection.set_deadline(config.deadline_from_now());
        connection
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.reader.deadline()
    }

    /// Replaces the deadline of both halves. `None` removes it.
    pub fn set_deadline(&mut self, deadline: Option<Instant>) {
        self.reader.set_deadline(deadline);
        self.writer.set_deadline(deadline);
    }

    pub fn split(&mut self) -> (&mut MessageReader<R>, &mut MessageWriter<W>) {
        (&mut self.reader, &mut self.writer)
    }

    pub fn reader(&mut self) -> &mut MessageReader<R> {
        &mut self.reader
    }

    pub fn writer(&mut self) -> &mut MessageWriter<W> {
        &mut self.writer
    }

    pub fn into_parts(self) -> (MessageReader<R>, MessageWriter<W>) {
        (self.reader, self.writer)
    }
}

impl WireConnection<OwnedReadHalf, OwnedWriteHalf> {
    pub fn from_tcp(stream: TcpStream, config: &WireConfig) -> Self {
        let (reader, writer) = stream.into_split();
        Self::with_config(reader, writer, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn relays_body_between_halves() {
        let input: &[u8] = b"POST /echo HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcNEXT";
        let mut connection = WireConnection::new(input, Vec::new());

        let (reader, writer) = connection.split();
        let mut message = reader.read_message().await.unwrap().unwrap();
        writer.write_message(&mut message).await.unwrap();
        drop(message);

        let (_, writer) = connection.into_parts();
        assert_eq!(writer.into_inner(), b"POST /echo HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc");
    }

    #[tokio::test]
    async fn deadline_is_shared() {
        let config = WireConfig::default().with_timeout(Some(Duration::from_secs(1)));
        let mut connection = WireConnection::with_config(&b""[..], Vec::new(), &config);
        assert!(connection.deadline().is_some());

        connection.set_deadline(None);
        let (reader, writer) = connection.split();
        assert_eq!(reader.deadline(), None);
        assert_eq!(writer.deadline(), None);
    }
}
