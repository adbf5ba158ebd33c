use async_trait::async_trait;
use http::StatusCode;
use micro_wire::protocol::{BodyError, ValidationError};
use thiserror::Error;

use crate::cookie::CookieError;
use crate::request::Request;
use crate::response::Response;

/// Errors a handler returns instead of a response.
///
/// Validation failures become a `400`, everything else a `500`.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("bad request: {reason}")]
    BadRequest { reason: String },

    #[error("invalid request: {source}")]
    Validation {
        #[from]
        source: ValidationError,
    },

    #[error("invalid cookie: {source}")]
    Cookie {
        #[from]
        source: CookieError,
    },

    #[error("body error: {source}")]
    Body {
        #[from]
        source: BodyError,
    },

    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl HandlerError {
    pub fn bad_request<S: ToString>(reason: S) -> Self {
        Self::BadRequest { reason: reason.to_string() }
    }

    pub fn internal<S: ToString>(reason: S) -> Self {
        Self::Internal { reason: reason.to_string() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::BadRequest { .. } | HandlerError::Validation { .. } | HandlerError::Cookie { .. } => {
                StatusCode::BAD_REQUEST
            }
            HandlerError::Body { .. } | HandlerError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Produces a response for one request.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, request: Request) -> Result<Response, HandlerError>;
}

/// Adapts an async function or closure into a [`Handler`].
#[derive(Debug)]
pub struct FnHandler<F> {
    f: F,
}

/// Wraps `f` so it can be registered with a router.
///
/// ```
/// use micro_wire_server::handler::{Handler, HandlerError, handler_fn};
/// use micro_wire_server::{Request, Response};
///
/// async fn hello(_request: Request) -> Result<Response, HandlerError> {
///     Ok(Response::ok("hello\n"))
/// }
///
/// let handler = handler_fn(hello);
/// # fn assert_handler(_: &impl Handler) {}
/// # assert_handler(&handler);
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, HandlerError>> + Send,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, HandlerError>> + Send,
{
    async fn call(&self, request: Request) -> Result<Response, HandlerError> {
        (self.f)(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::request_from;

    #[tokio::test]
    async fn closures_are_handlers() {
        let prefix = String::from("path: ");
        let handler = handler_fn(move |request: Request| {
            let body = format!("{prefix}{}", request.path());
            async move { Ok(Response::ok(body)) }
        });

        let response = handler.call(request_from("GET /a HTTP/1.1\r\n\r\n")).await.unwrap();
        assert_eq!(response.body(), "path: /a");
    }

    #[test]
    fn errors_map_to_status() {
        assert_eq!(HandlerError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(HandlerError::from(ValidationError::MissingContentLength).status(), StatusCode::BAD_REQUEST);
        assert_eq!(HandlerError::internal("x").status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(HandlerError::from(BodyError::AlreadyConsumed).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
