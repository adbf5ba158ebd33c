use bytes::Bytes;
use http::StatusCode;
use micro_wire::protocol::{BuildError, OutgoingMessage, StatusLine};

use crate::cookie::SetCookie;

/// A response produced by a handler.
///
/// Headers are only validated when the response is turned into a wire
/// message, so handlers can chain calls without intermediate `Result`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self { status, headers: Vec::new(), body: body.into() }
    }

    /// A `text/plain; charset=utf-8` response.
    pub fn text(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self::new(status, body).with_header("Content-Type", mime::TEXT_PLAIN_UTF_8.as_ref())
    }

    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::text(StatusCode::OK, body)
    }

    /// A plain text response whose body is the canonical reason phrase.
    pub fn status(status: StatusCode) -> Self {
        let reason = status.canonical_reason().unwrap_or("Unknown");
        Self::text(status, format!("{reason}\n"))
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_cookie(self, cookie: &SetCookie) -> Self {
        self.with_header("Set-Cookie", cookie.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// First value of header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Builds the wire message with `Content-Length` set to the body size.
    pub fn into_message(self) -> Result<OutgoingMessage, BuildError> {
        let status_line = StatusLine::new(self.status);
        let builder = self
            .headers
            .iter()
            .fold(OutgoingMessage::builder(status_line.to_string()), |builder, (name, value)| builder.header(name, value));
        builder.body(self.body)
    }
}
