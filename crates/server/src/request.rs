use bytes::Bytes;
use http::Method;
use micro_wire::protocol::{HeaderMap, MessageHead, RequestLine};

use crate::cookie::{Cookie, CookieError, parse_cookie_header};
use crate::handler::HandlerError;

/// A fully read request as handed to a [`crate::handler::Handler`].
///
/// The connection has already been released: the body is in memory and its
/// length matched the declared `Content-Length`.
#[derive(Debug, Clone)]
pub struct Request {
    line: RequestLine,
    head: MessageHead,
    body: Bytes,
}

impl Request {
    pub fn new(line: RequestLine, head: MessageHead, body: Bytes) -> Self {
        Self { line, head, body }
    }

    pub fn method(&self) -> &Method {
        self.line.method()
    }

    pub fn path(&self) -> &str {
        self.line.path()
    }

    pub fn protocol(&self) -> &str {
        self.line.protocol()
    }

    pub fn line(&self) -> &RequestLine {
        &self.line
    }

    pub fn head(&self) -> &MessageHead {
        &self.head
    }

    pub fn headers(&self) -> &HeaderMap {
        self.head.headers()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers().get(name)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body as UTF-8 text.
    pub fn body_text(&self) -> Result<&str, HandlerError> {
        std::str::from_utf8(&self.body).map_err(|e| HandlerError::bad_request(format!("body is not utf-8: {e}")))
    }

    /// Every cookie sent in `Cookie` headers, in order.
    pub fn cookies(&self) -> Result<Vec<Cookie>, CookieError> {
        let mut cookies = Vec::new();
        for header in self.head.headers().get_all("Cookie") {
            cookies.extend(parse_cookie_header(header)?);
        }
        Ok(cookies)
    }

    pub fn cookie(&self, name: &str) -> Result<Option<Cookie>, CookieError> {
        Ok(self.cookies()?.into_iter().find(|cookie| cookie.name() == name))
    }
}

#[cfg(test)]
pub(crate) fn request_from(raw: &str) -> Request {
    use micro_wire::protocol::OutgoingMessage;

    let (head, body) = raw.split_once("\r\n\r\n").unwrap();
    let mut lines = head.split("\r\n");
    let line: RequestLine = lines.next().unwrap().parse().unwrap();

    let mut builder = OutgoingMessage::builder(line.to_string());
    for header in lines {
        let (name, value) = header.split_once(':').unwrap();
        builder = builder.header(name, value);
    }
    let message = builder.body(body.to_string()).unwrap();
    let (head, _) = message.into_parts();
    Request::new(line, head, Bytes::copy_from_slice(body.as_bytes()))
}
