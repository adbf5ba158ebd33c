//! Splits a byte buffer into terminated lines.

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::ParseError;

/// One line with its terminator stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    text: String,
    raw_len: usize,
}

impl Line {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Bytes the line occupied on the wire, terminator included.
    pub fn raw_len(&self) -> usize {
        self.raw_len
    }

    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Decodes lines ended by `\n` or `\r\n`.
///
/// A CR anywhere but right before the LF, or bytes that are not UTF-8, make
/// the line unusable and are reported as [`ParseError::InvalidLine`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LineDecoder;

impl Decoder for LineDecoder {
    type Item = Line;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(end) = src.iter().position(|&b| b == b'\n') else {
            return Ok(None);
        };

        let raw = src.split_to(end + 1);
        let content = &raw[..end];
        let content = content.strip_suffix(b"\r").unwrap_or(content);
        ensure!(!content.contains(&b'\r'), ParseError::invalid_line("bare carriage return"));

        let text = std::str::from_utf8(content).map_err(ParseError::invalid_line)?;
        trace!(raw_len = raw.len(), "decoded line");
        Ok(Some(Line { text: text.to_string(), raw_len: raw.len() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(input: &[u8]) -> Result<Vec<Line>, ParseError> {
        let mut src = BytesMut::from(input);
        let mut lines = Vec::new();
        while let Some(line) = LineDecoder.decode(&mut src)? {
            lines.push(line);
        }
        Ok(lines)
    }

    #[test]
    fn accepts_both_terminators() {
        let lines = decode_all(b"GET / HTTP/1.0\r\nAccept: */*\n\r\n").unwrap();

        let texts: Vec<_> = lines.iter().map(Line::text).collect();
        assert_eq!(texts, vec!["GET / HTTP/1.0", "Accept: */*", ""]);
        assert_eq!(lines.iter().map(Line::raw_len).collect::<Vec<_>>(), vec![16, 12, 2]);
        assert!(lines[2].is_blank());
    }

    #[test]
    fn waits_for_terminator() {
        let mut src = BytesMut::from(&b"GET / HTTP"[..]);
        assert_eq!(LineDecoder.decode(&mut src).unwrap(), None);
        assert_eq!(src.len(), 10);
    }

    #[test]
    fn leaves_following_bytes() {
        let mut src = BytesMut::from(&b"PING\r\nbody"[..]);
        let line = LineDecoder.decode(&mut src).unwrap().unwrap();

        assert_eq!(line.text(), "PING");
        assert_eq!(&src[..], b"body");
    }

    #[test]
    fn empty_first_line_is_accepted() {
        let lines = decode_all(b"\r\n").unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].is_blank());
    }

    #[test]
    fn rejects_bare_carriage_return() {
        let err = decode_all(b"GET /\r HTTP/1.0\r\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidLine { .. }));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = decode_all(b"GET /\xff HTTP/1.0\r\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidLine { .. }));
    }
}
