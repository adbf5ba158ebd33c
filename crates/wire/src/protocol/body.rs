//! Bounded, lazily read message bodies.
//!
//! A [`Body`] wraps a reader limited to exactly the declared length, so reading
//! it can never run into bytes that belong to whatever follows on the stream.
//! The underlying reader is usually borrowed from the connection and is not
//! seekable, hence a body can be read or copied once: the second attempt fails
//! with [`BodyError::AlreadyConsumed`] instead of yielding nothing.

use std::cmp;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, Take};
use tokio::time::Instant;
use tracing::{trace, warn};

use crate::protocol::BodyError;
use crate::utils::within;

/// Upper bound on the buffer reserved up front by [`Body::read_to_bytes`];
/// a peer's declared length alone never drives a large allocation.
const MAX_PREALLOCATE: u64 = 64 * 1024;

#[derive(Debug)]
pub struct Body<B> {
    reader: Option<Take<B>>,
    length: u64,
    deadline: Option<Instant>,
}

impl<B> Body<B>
where
    B: AsyncRead + Unpin,
{
    /// Creates a body yielding exactly `length` bytes from `reader`.
    pub fn new(reader: B, length: u64) -> Self {
        Self { reader: Some(reader.take(length)), length, deadline: None }
    }

    /// Bounds every transfer of this body by an absolute deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// The declared number of body bytes.
    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn is_consumed(&self) -> bool {
        self.reader.is_none()
    }

    /// Reads the whole body into memory.
    ///
    /// # Errors
    ///
    /// - [`BodyError::Incomplete`] if the stream ends before `len()` bytes
    /// - [`BodyError::AlreadyConsumed`] if the body was read or copied before
    /// - [`BodyError::Timeout`] if the deadline passes first
    pub async fn read_to_bytes(&mut self) -> Result<Bytes, BodyError> {
        let mut reader = self.take_reader()?;
        let expected = self.length;

        let read = async move {
            let capacity = usize::try_from(cmp::min(expected, MAX_PREALLOCATE)).unwrap_or_default();
            let mut data = Vec::with_capacity(capacity);
            reader.read_to_end(&mut data).await?;
            Ok::<_, BodyError>(data)
        };
        let data = within(self.deadline, read, || BodyError::Timeout).await?;

        check_complete(expected, data.len() as u64)?;
        trace!(len = data.len(), "read body");
        Ok(Bytes::from(data))
    }

    /// Copies exactly `len()` bytes into `sink` and returns that count.
    ///
    /// The copy is bounded by the declared length, so trailing bytes on the
    /// underlying stream are left untouched. The sink is not flushed.
    ///
    /// # Errors
    ///
    /// Same as [`Body::read_to_bytes`], plus any write failure of `sink`.
    pub async fn copy_to<W>(&mut self, sink: &mut W) -> Result<u64, BodyError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut reader = self.take_reader()?;
        let expected = self.length;
        if expected == 0 {
            return Ok(0);
        }

        let copy = async move { Ok::<_, BodyError>(tokio::io::copy(&mut reader, sink).await?) };
        let copied = within(self.deadline, copy, || BodyError::Timeout).await?;

        check_complete(expected, copied)?;
        trace!(len = copied, "copied body");
        Ok(copied)
    }

    fn take_reader(&mut self) -> Result<Take<B>, BodyError> {
        self.reader.take().ok_or_else(|| {
            warn!("body consumed twice");
            BodyError::AlreadyConsumed
        })
    }
}

fn check_complete(expected: u64, actual: u64) -> Result<(), BodyError> {
    if actual < expected {
        warn!(expected, actual, "peer sent fewer body bytes than declared");
        return Err(BodyError::incomplete(expected, actual));
    }
    Ok(())
}
