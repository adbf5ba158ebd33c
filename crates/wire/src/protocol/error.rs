use std::io;
use thiserror::Error;

/// Coarse classification of every error this crate produces.
///
/// The connection loop uses it to decide what to do with a connection and to
/// keep diagnostics separated: framing, body-length and timeout failures close
/// the connection, validation failures may still be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// malformed status line, malformed header, premature end of head
    Framing,
    /// the peer sent fewer body bytes than it declared
    BodyLength,
    /// well framed but semantically unusable message
    Validation,
    /// the connection deadline elapsed
    Timeout,
    /// a body was read or serialized twice
    Reuse,
    /// the underlying stream failed
    Io,
}

#[derive(Debug, Error)]
pub enum WireError {
    #[error("receive error: {source}")]
    Receive {
        #[from]
        source: ParseError,
    },

    #[error("send error: {source}")]
    Send {
        #[from]
        source: SendError,
    },
}

impl WireError {
    pub fn class(&self) -> ErrorClass {
        match self {
            WireError::Receive { source } => source.class(),
            WireError::Send { source } => source.class(),
        }
    }
}

impl From<BodyError> for WireError {
    fn from(e: BodyError) -> Self {
        WireError::Receive { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("head size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHead { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("invalid line: {reason}")]
    InvalidLine { reason: String },

    #[error("malformed header line: {line:?}")]
    MalformedHeader { line: String },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("stream ended after {received} bytes before the head was complete")]
    IncompleteHead { received: usize },

    #[error("body error: {source}")]
    Body {
        #[from]
        source: BodyError,
    },

    #[error("deadline elapsed while reading the head")]
    Timeout,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large_head(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHead { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_line<S: ToString>(str: S) -> Self {
        Self::InvalidLine { reason: str.to_string() }
    }

    pub fn malformed_header<S: ToString>(line: S) -> Self {
        Self::MalformedHeader { line: line.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn incomplete_head(received: usize) -> Self {
        Self::IncompleteHead { received }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            ParseError::TooLargeHead { .. }
            | ParseError::TooManyHeaders { .. }
            | ParseError::InvalidLine { .. }
            | ParseError::MalformedHeader { .. }
            | ParseError::InvalidContentLength { .. }
            | ParseError::IncompleteHead { .. } => ErrorClass::Framing,
            ParseError::Body { source } => source.class(),
            ParseError::Timeout => ErrorClass::Timeout,
            ParseError::Io { .. } => ErrorClass::Io,
        }
    }
}

/// Errors raised while reading or copying a bounded body.
#[derive(Error, Debug)]
pub enum BodyError {
    #[error("incomplete body, expected {expected} bytes but got {actual}")]
    Incomplete { expected: u64, actual: u64 },

    #[error("body has already been consumed")]
    AlreadyConsumed,

    #[error("deadline elapsed while transferring the body")]
    Timeout,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl BodyError {
    pub fn incomplete(expected: u64, actual: u64) -> Self {
        Self::Incomplete { expected, actual }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            BodyError::Incomplete { .. } => ErrorClass::BodyLength,
            BodyError::AlreadyConsumed => ErrorClass::Reuse,
            BodyError::Timeout => ErrorClass::Timeout,
            BodyError::Io { .. } => ErrorClass::Io,
        }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    /// The head declares a different length than the body carries; an absent
    /// length only frames an empty body.
    #[error("head declares content-length {declared:?} but the body holds {actual} bytes")]
    LengthMismatch { declared: Option<u64>, actual: u64 },

    #[error("body error: {source}")]
    Body {
        #[from]
        source: BodyError,
    },

    #[error("deadline elapsed while writing the message")]
    Timeout,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn length_mismatch(declared: Option<u64>, actual: u64) -> Self {
        Self::LengthMismatch { declared, actual }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            SendError::LengthMismatch { .. } => ErrorClass::Validation,
            SendError::Body { source } => source.class(),
            SendError::Timeout => ErrorClass::Timeout,
            SendError::Io { .. } => ErrorClass::Io,
        }
    }
}

/// Recoverable problems with a message that framed correctly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("malformed request line: {line:?}")]
    MalformedRequestLine { line: String },

    #[error("malformed status line: {line:?}")]
    MalformedStatusLine { line: String },

    #[error("missing header: {name}")]
    MissingHeader { name: String },

    #[error("missing content-length header")]
    MissingContentLength,

    #[error("missing content-type header")]
    MissingContentType,

    #[error("invalid content-type {value:?}: {reason}")]
    InvalidContentType { value: String, reason: String },
}

impl ValidationError {
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Validation
    }
}

/// Rejected header names or values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("invalid header name: {name:?}")]
    InvalidName { name: String },

    #[error("invalid value for header {name}")]
    InvalidValue { name: String },
}

/// Errors while assembling an outgoing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("invalid status line: {line:?}")]
    InvalidStatusLine { line: String },

    #[error("body length {length} exceeds the signed 64-bit content-length range")]
    LengthOutOfRange { length: u64 },

    #[error("invalid header: {source}")]
    Header {
        #[from]
        source: HeaderError,
    },
}
