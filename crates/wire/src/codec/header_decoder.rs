//! Decoder for the header block that follows the status line.
//!
//! Header lines are `Name: Value`, split on the first colon, with both parts
//! trimmed. The block ends at the first blank line. Every line is checked as it
//! arrives, so a malformed line aborts decoding instead of being skipped.

use std::mem;

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::{Line, LineDecoder};
use crate::config::DEFAULT_MAX_HEADERS;
use crate::ensure;
use crate::protocol::{HeaderMap, ParseError};

/// The headers of one message and the bytes they took, blank line included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBlock {
    headers: HeaderMap,
    consumed: usize,
}

impl HeaderBlock {
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn into_parts(self) -> (HeaderMap, usize) {
        (self.headers, self.consumed)
    }
}

/// Accumulates header lines until the terminating blank line.
///
/// The decoder keeps its partial state between calls and starts over after
/// each completed block.
#[derive(Debug)]
pub struct HeaderDecoder {
    max_headers: usize,
    headers: HeaderMap,
    lines: usize,
    consumed: usize,
}

impl HeaderDecoder {
    pub fn new(max_headers: usize) -> Self {
        Self { max_headers, headers: HeaderMap::new(), lines: 0, consumed: 0 }
    }

    /// Feeds one already split line; returns the block once `line` is blank.
    pub fn push_line(&mut self, line: Line) -> Result<Option<HeaderBlock>, ParseError> {
        self.consumed += line.raw_len();
        if line.is_blank() {
            trace!(headers = self.lines, consumed = self.consumed, "decoded header block");
            return Ok(Some(self.finish()));
        }

        self.lines += 1;
        ensure!(self.lines <= self.max_headers, ParseError::too_many_headers(self.max_headers));

        let text = line.text();
        let Some((name, value)) = text.split_once(':') else {
            return Err(ParseError::malformed_header(text));
        };
        if let Err(e) = self.headers.append(name, value) {
            trace!(cause = %e, "rejected header line");
            return Err(ParseError::malformed_header(text));
        }
        Ok(None)
    }

    /// Discards any partially decoded block.
    pub fn reset(&mut self) {
        self.finish();
    }

    fn finish(&mut self) -> HeaderBlock {
        self.lines = 0;
        HeaderBlock { headers: mem::take(&mut self.headers), consumed: mem::take(&mut self.consumed) }
    }
}

impl Default for HeaderDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HEADERS)
    }
}

impl Decoder for HeaderDecoder {
    type Item = HeaderBlock;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while let Some(line) = LineDecoder.decode(src)? {
            if let Some(block) = self.push_line(line)? {
                return Ok(Some(block));
            }
        }
        Ok(None)
    }
}
