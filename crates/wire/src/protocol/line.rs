//! Typed views over the first line of a message.
//!
//! The framer accepts any status line verbatim; these types are what request
//! and response consumers use to reject lines with the wrong shape. Failures
//! are [`ValidationError`]s, not framing errors: the stream is still in sync.

use std::fmt;
use std::str::FromStr;

use http::{Method, StatusCode};

use crate::ensure;
use crate::protocol::ValidationError;

/// Protocol token used when building lines without an explicit one.
pub const DEFAULT_PROTOCOL: &str = "HTTP/1.1";

/// `METHOD SP PATH SP PROTOCOL`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: Method,
    path: String,
    protocol: String,
}

impl RequestLine {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), protocol: DEFAULT_PROTOCOL.to_string() }
    }

    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }
}

impl FromStr for RequestLine {
    type Err = ValidationError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = || ValidationError::MalformedRequestLine { line: line.to_string() };

        let mut parts = line.split(' ');
        let (Some(method), Some(path), Some(protocol), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };
        ensure!(!method.is_empty() && !path.is_empty() && !protocol.is_empty(), malformed());

        let Ok(method) = Method::from_bytes(method.as_bytes()) else {
            return Err(malformed());
        };
        Ok(Self { method, path: path.to_string(), protocol: protocol.to_string() })
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.path, self.protocol)
    }
}

/// `PROTOCOL SP CODE SP REASON`, where the reason may contain spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    protocol: String,
    status: StatusCode,
    reason: String,
}

impl StatusLine {
    /// Builds a status line with the canonical reason phrase of `status`.
    pub fn new(status: StatusCode) -> Self {
        Self {
            protocol: DEFAULT_PROTOCOL.to_string(),
            status,
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }

    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl FromStr for StatusLine {
    type Err = ValidationError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = || ValidationError::MalformedStatusLine { line: line.to_string() };

        let mut parts = line.splitn(3, ' ');
        let (Some(protocol), Some(code), Some(reason)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };
        ensure!(!protocol.is_empty() && code.len() == 3, malformed());

        let Ok(status) = StatusCode::from_bytes(code.as_bytes()) else {
            return Err(malformed());
        };
        Ok(Self { protocol: protocol.to_string(), status, reason: reason.to_string() })
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.protocol, self.status.as_str(), self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_line() {
        let line: RequestLine = "GET /index.html HTTP/1.0".parse().unwrap();
        assert_eq!(line.method(), &Method::GET);
        assert_eq!(line.path(), "/index.html");
        assert_eq!(line.protocol(), "HTTP/1.0");
        assert_eq!(line.to_string(), "GET /index.html HTTP/1.0");
    }

    #[test]
    fn request_line_needs_three_fields() {
        for line in ["", "PING", "GET /", "GET / HTTP/1.1 extra", "GET  HTTP/1.1", "G\tT / HTTP/1.1"] {
            assert_eq!(
                line.parse::<RequestLine>(),
                Err(ValidationError::MalformedRequestLine { line: line.to_string() }),
                "line {line:?}"
            );
        }
    }

    #[test]
    fn extension_methods_are_accepted() {
        let line: RequestLine = "PURGE /cache HTTP/1.1".parse().unwrap();
        assert_eq!(line.method().as_str(), "PURGE");
    }

    #[test]
    fn parses_status_line_with_spaced_reason() {
        let line: StatusLine = "HTTP/1.1 404 Not Found".parse().unwrap();
        assert_eq!(line.protocol(), "HTTP/1.1");
        assert_eq!(line.status(), StatusCode::NOT_FOUND);
        assert_eq!(line.reason(), "Not Found");
    }

    #[test]
    fn status_line_rejects_bad_codes() {
        for line in ["HTTP/1.1 20 OK", "HTTP/1.1 abc OK", "HTTP/1.1 200", "HTTP/1.1"] {
            assert!(line.parse::<StatusLine>().is_err(), "line {line:?}");
        }
    }

    #[test]
    fn builds_canonical_status_line() {
        assert_eq!(StatusLine::new(StatusCode::OK).to_string(), "HTTP/1.1 200 OK");
        assert_eq!(
            StatusLine::new(StatusCode::PAYLOAD_TOO_LARGE).with_protocol("HTTP/1.0").to_string(),
            "HTTP/1.0 413 Payload Too Large"
        );
    }
}
