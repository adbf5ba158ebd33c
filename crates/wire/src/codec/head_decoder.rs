//! Message framing up to the first body byte.
//!
//! [`HeadDecoder`] reads the status line, hands the following lines to a
//! [`HeaderDecoder`] and, at the blank line, derives the declared body length.
//! It never consumes a byte past the blank line: whatever remains in the
//! buffer belongs to the body.
//!
//! # Limits
//!
//! - the whole head may not exceed `max_head_bytes` (default 8 KiB)
//! - no more than `max_headers` header lines (default 64)
//!
//! Both limits are checked while bytes arrive, so an oversized head is
//! rejected before it is buffered completely.

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::{HeaderBlock, HeaderDecoder, LineDecoder};
use crate::config::WireConfig;
use crate::ensure;
use crate::protocol::{MessageHead, ParseError};

#[derive(Debug)]
pub struct HeadDecoder {
    max_head_bytes: usize,
    status_line: Option<String>,
    header_decoder: HeaderDecoder,
    received: usize,
}

impl HeadDecoder {
    pub fn new(config: &WireConfig) -> Self {
        Self {
            max_head_bytes: config.max_head_bytes(),
            status_line: None,
            header_decoder: HeaderDecoder::new(config.max_headers()),
            received: 0,
        }
    }

    /// Head bytes decoded so far for the message in progress.
    pub fn received(&self) -> usize {
        self.received
    }

    /// How many more head bytes fit under the limit.
    pub fn remaining(&self) -> usize {
        self.max_head_bytes.saturating_sub(self.received)
    }

    /// Drops the partially decoded head.
    pub fn reset(&mut self) {
        self.status_line = None;
        self.header_decoder.reset();
        self.received = 0;
    }

    fn decode_lines(&mut self, src: &mut BytesMut) -> Result<Option<MessageHead>, ParseError> {
        loop {
            let Some(line) = LineDecoder.decode(src)? else {
                let pending = self.received + src.len();
                ensure!(pending <= self.max_head_bytes, ParseError::too_large_head(pending, self.max_head_bytes));
                return Ok(None);
            };

            self.received += line.raw_len();
            ensure!(self.received <= self.max_head_bytes, ParseError::too_large_head(self.received, self.max_head_bytes));

            if self.status_line.is_none() {
                trace!(status_line = line.text(), "decoded status line");
                self.status_line = Some(line.into_text());
                continue;
            }

            if let Some(block) = self.header_decoder.push_line(line)? {
                return self.finish(block).map(Some);
            }
        }
    }

    fn finish(&mut self, block: HeaderBlock) -> Result<MessageHead, ParseError> {
        let status_line = self.status_line.take().unwrap_or_default();
        let head_len = self.received;
        self.received = 0;

        let (headers, _) = block.into_parts();
        let head = MessageHead::new(status_line, headers, head_len)?;
        trace!(head_len, content_length = ?head.content_length(), "decoded head");
        Ok(head)
    }
}

impl Default for HeadDecoder {
    fn default() -> Self {
        Self::new(&WireConfig::default())
    }
}

impl Decoder for HeadDecoder {
    type Item = MessageHead;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.decode_lines(src).inspect_err(|_| self.reset())
    }

    /// At end of stream an untouched decoder reports no message, while a head
    /// cut short is an [`ParseError::IncompleteHead`].
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(head) = self.decode(src)? {
            return Ok(Some(head));
        }

        let received = self.received + src.len();
        self.reset();
        src.clear();
        ensure!(received == 0, ParseError::incomplete_head(received));
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn decodes_request_head() {
        let input = "GET / HTTP/1.0\r\nUser-Agent: x\r\nAccept: */*\r\nContent-Length: 5\r\n\r\nHello";
        let mut src = BytesMut::from(input);

        let head = HeadDecoder::default().decode(&mut src).unwrap().unwrap();

        assert_eq!(head.status_line(), "GET / HTTP/1.0");
        assert_eq!(head.headers().len(), 3);
        assert_eq!(head.content_length(), Some(5));
        assert_eq!(head.head_len(), input.len() - 5);
        assert_eq!(&src[..], b"Hello");
    }

    #[test]
    fn decodes_bare_newline_head() {
        let input = indoc! {"
            HTTP/1.1 200 OK
            Content-Type: text/plain

        "};
        let mut src = BytesMut::from(input);

        let head = HeadDecoder::default().decode(&mut src).unwrap().unwrap();

        assert_eq!(head.status_line(), "HTTP/1.1 200 OK");
        assert_eq!(head.content_type(), Some("text/plain"));
        assert_eq!(head.content_length(), None);
        assert_eq!(head.head_len(), input.len());
    }

    #[test]
    fn needs_more_bytes_without_blank_line() {
        let mut decoder = HeadDecoder::default();
        let mut src = BytesMut::from(&b"PING\r\nHost: a\r\n"[..]);

        assert_eq!(decoder.decode(&mut src).unwrap(), None);
        assert_eq!(decoder.received(), 15);

        src.extend_from_slice(b"\r\n");
        let head = decoder.decode(&mut src).unwrap().unwrap();
        assert_eq!(head.head_len(), 17);
        assert_eq!(decoder.received(), 0);
    }

    #[test]
    fn rejects_oversized_head() {
        let config = WireConfig::default().with_max_head_bytes(16);
        let mut decoder = HeadDecoder::new(&config);
        let mut src = BytesMut::from(&b"GET / HTTP/1.1\r\nAccept: */*\r\n\r\n"[..]);

        let err = decoder.decode(&mut src).unwrap_err();
        assert!(matches!(err, ParseError::TooLargeHead { max_size: 16, .. }));
        assert_eq!(decoder.received(), 0);
    }

    #[test]
    fn rejects_oversized_partial_line() {
        let config = WireConfig::default().with_max_head_bytes(8);
        let mut src = BytesMut::from(&b"GET /very/long/path"[..]);

        let err = HeadDecoder::new(&config).decode(&mut src).unwrap_err();
        assert!(matches!(err, ParseError::TooLargeHead { current_size: 19, max_size: 8 }));
    }

    #[test]
    fn invalid_content_length_fails_head() {
        let mut src = BytesMut::from(&b"POST / HTTP/1.1\r\nContent-Length: five\r\n\r\n"[..]);
        let err = HeadDecoder::default().decode(&mut src).unwrap_err();

        assert!(matches!(err, ParseError::InvalidContentLength { .. }));
    }

    #[test]
    fn eof_before_any_byte_is_no_data() {
        let mut src = BytesMut::new();
        assert_eq!(HeadDecoder::default().decode_eof(&mut src).unwrap(), None);
    }

    #[test]
    fn eof_mid_head_is_incomplete() {
        let mut src = BytesMut::from(&b"GET / HTTP/1.1\r\nAccept: */*\r\n"[..]);
        let err = HeadDecoder::default().decode_eof(&mut src).unwrap_err();
        assert!(matches!(err, ParseError::IncompleteHead { received: 29 }));

        let mut src = BytesMut::from(&b"GET / HT"[..]);
        let err = HeadDecoder::default().decode_eof(&mut src).unwrap_err();
        assert!(matches!(err, ParseError::IncompleteHead { received: 8 }));
    }
}
