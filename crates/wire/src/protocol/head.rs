//! The parsed head of a message: status line, headers and the framing facts
//! derived from them.

use mime::Mime;

use crate::protocol::{HeaderMap, ParseError, RequestLine, StatusLine, ValidationError};

pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_TYPE: &str = "Content-Type";

/// Status line, headers, and the declared body length of one message.
///
/// A head is immutable once built. `content_length` is `None` when the header
/// was absent, which is distinct from a declared length of zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHead {
    status_line: String,
    headers: HeaderMap,
    content_length: Option<u64>,
    head_len: usize,
}

impl MessageHead {
    /// Builds a head from already-validated parts.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidContentLength`] if a `Content-Length`
    /// header is present but unusable.
    pub fn new(status_line: String, headers: HeaderMap, head_len: usize) -> Result<Self, ParseError> {
        let content_length = content_length(&headers)?;
        Ok(Self { status_line, headers, content_length, head_len })
    }

    pub(crate) fn from_trusted_parts(
        status_line: String,
        headers: HeaderMap,
        content_length: Option<u64>,
        head_len: usize,
    ) -> Self {
        Self { status_line, headers, content_length, head_len }
    }

    /// The first line, without its terminator.
    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Declared body length; `None` when no `Content-Length` was sent.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn has_content_length(&self) -> bool {
        self.content_length.is_some()
    }

    /// Number of body bytes that frame with this head. Absent counts as zero.
    pub fn body_len(&self) -> u64 {
        self.content_length.unwrap_or(0)
    }

    /// Bytes taken by the status line, the headers and the blank line.
    pub fn head_len(&self) -> usize {
        self.head_len
    }

    /// Size of the whole message on the wire.
    pub fn total_len(&self) -> u64 {
        self.head_len as u64 + self.body_len()
    }

    /// The raw `Content-Type` value. Absence is not an error here.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE)
    }

    /// Returns the declared body length, or a validation error for callers
    /// that cannot work without one.
    pub fn require_content_length(&self) -> Result<u64, ValidationError> {
        self.content_length.ok_or(ValidationError::MissingContentLength)
    }

    pub fn require_header(&self, name: &str) -> Result<&str, ValidationError> {
        self.headers.get(name).ok_or_else(|| ValidationError::MissingHeader { name: name.to_string() })
    }

    /// Parses the `Content-Type` header as a media type.
    pub fn mime(&self) -> Result<Mime, ValidationError> {
        let value = self.content_type().ok_or(ValidationError::MissingContentType)?;
        value
            .parse::<Mime>()
            .map_err(|e| ValidationError::InvalidContentType { value: value.to_string(), reason: e.to_string() })
    }

    /// Interprets the status line as `METHOD SP PATH SP PROTOCOL`.
    pub fn request_line(&self) -> Result<RequestLine, ValidationError> {
        self.status_line.parse()
    }

    /// Interprets the status line as `PROTOCOL SP CODE SP REASON`.
    pub fn response_line(&self) -> Result<StatusLine, ValidationError> {
        self.status_line.parse()
    }

    pub fn into_parts(self) -> (String, HeaderMap) {
        (self.status_line, self.headers)
    }
}

/// Reads the declared body length from `headers`.
///
/// The result is three-way: `Ok(Some(n))` for a valid length, `Ok(None)` when
/// the header is absent, and an error when it is present but not a plain
/// base-10 integer within the signed 64-bit range. Repeated headers must agree.
pub fn content_length(headers: &HeaderMap) -> Result<Option<u64>, ParseError> {
    let mut length = None;
    for value in headers.get_all(CONTENT_LENGTH) {
        let parsed = parse_length(value)?;
        match length {
            Some(previous) if previous != parsed => {
                return Err(ParseError::invalid_content_length(format!("conflicting values {previous} and {parsed}")));
            }
            _ => length = Some(parsed),
        }
    }
    Ok(length)
}

fn parse_length(value: &str) -> Result<u64, ParseError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::invalid_content_length(format!("value {value:?} is not a decimal integer")));
    }

    value
        .parse::<i64>()
        .ok()
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| ParseError::invalid_content_length(format!("value {value} is out of range")))
}
