//! Exact-match request routing.
//!
//! A route is a method plus a literal path. There are no patterns or
//! parameters: `/kv` and `/kv/` are different routes. Requests that match
//! nothing go to the not-found handler, which answers `404` by default.

use std::collections::HashMap;

use async_trait::async_trait;
use http::{Method, StatusCode};
use tracing::{debug, warn};

use crate::handler::{Handler, HandlerError};
use crate::request::Request;
use crate::response::Response;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Route {
    method: Method,
    path: String,
}

pub struct Router {
    routes: HashMap<Route, Box<dyn Handler>>,
    not_found: Box<dyn Handler>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").field("routes", &self.routes.keys().collect::<Vec<_>>()).finish_non_exhaustive()
    }
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Finds the handler registered for exactly `method` and `path`.
    pub fn at(&self, method: &Method, path: &str) -> Option<&dyn Handler> {
        let route = Route { method: method.clone(), path: path.to_string() };
        self.routes.get(&route).map(Box::as_ref)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Runs the matching handler, or the not-found handler, and turns a
    /// handler error into an error response.
    pub async fn dispatch(&self, request: Request) -> Response {
        let method = request.method().clone();
        let path = request.path().to_string();

        let handler = self.at(&method, &path).unwrap_or_else(|| {
            debug!(%method, path = %path, "no route matched");
            self.not_found.as_ref()
        });

        match handler.call(request).await {
            Ok(response) => response,
            Err(e) => {
                let status = e.status();
                warn!(%method, path = %path, %status, cause = %e, "handler failed");
                Response::text(status, format!("{e}\n"))
            }
        }
    }
}

pub struct RouterBuilder {
    routes: HashMap<Route, Box<dyn Handler>>,
    not_found: Option<Box<dyn Handler>>,
}

impl std::fmt::Debug for RouterBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterBuilder")
            .field("routes", &self.routes.keys().collect::<Vec<_>>())
            .field("custom_not_found", &self.not_found.is_some())
            .finish()
    }
}

impl RouterBuilder {
    fn new() -> Self {
        Self { routes: HashMap::new(), not_found: None }
    }

    /// Registers `handler` for `method` and `path`, replacing an earlier
    /// registration of the same route.
    #[must_use]
    pub fn route(mut self, method: Method, path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        let route = Route { method, path: path.into() };
        if self.routes.contains_key(&route) {
            warn!(method = %route.method, path = %route.path, "route registered twice, keeping the last handler");
        }
        self.routes.insert(route, Box::new(handler));
        self
    }

    #[must_use]
    pub fn get(self, path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        self.route(Method::GET, path, handler)
    }

    #[must_use]
    pub fn post(self, path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        self.route(Method::POST, path, handler)
    }

    #[must_use]
    pub fn delete(self, path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        self.route(Method::DELETE, path, handler)
    }

    #[must_use]
    pub fn not_found(mut self, handler: impl Handler + 'static) -> Self {
        self.not_found = Some(Box::new(handler));
        self
    }

    pub fn build(self) -> Router {
        let not_found = self.not_found.unwrap_or_else(|| Box::new(NotFound));
        Router { routes: self.routes, not_found }
    }
}

/// The default fallback: `404 Not Found` with a short text body.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFound;

#[async_trait]
impl Handler for NotFound {
    async fn call(&self, _request: Request) -> Result<Response, HandlerError> {
        Ok(Response::status(StatusCode::NOT_FOUND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::request::request_from;

    async fn hello(_request: Request) -> Result<Response, HandlerError> {
        Ok(Response::ok("hello"))
    }

    async fn fails(_request: Request) -> Result<Response, HandlerError> {
        Err(HandlerError::internal("store offline"))
    }

    fn router() -> Router {
        Router::builder().get("/", handler_fn(hello)).post("/fail", handler_fn(fails)).build()
    }

    #[test]
    fn builder_debug_lists_routes() {
        let builder = Router::builder().get("/", handler_fn(hello)).not_found(handler_fn(hello));
        let debug = format!("{builder:?}");
        assert!(debug.starts_with("RouterBuilder"));
        assert!(debug.contains("custom_not_found: true"));
    }

    #[tokio::test]
    async fn matches_method_and_path_exactly() {
        let router = router();

        assert!(router.at(&Method::GET, "/").is_some());
        assert!(router.at(&Method::POST, "/").is_none());
        assert!(router.at(&Method::GET, "/index").is_none());

        let response = router.dispatch(request_from("GET / HTTP/1.1\r\n\r\n")).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.body(), "hello");
    }

    #[tokio::test]
    async fn unmatched_requests_get_not_found() {
        let router = router();

        let response = router.dispatch(request_from("GET /missing HTTP/1.1\r\n\r\n")).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

        let response = router.dispatch(request_from("DELETE / HTTP/1.1\r\n\r\n")).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn custom_not_found() {
        let router = Router::builder()
            .not_found(handler_fn(|request: Request| async move {
                Ok(Response::text(StatusCode::NOT_FOUND, format!("nothing at {}", request.path())))
            }))
            .build();

        let response = router.dispatch(request_from("GET /x HTTP/1.1\r\n\r\n")).await;
        assert_eq!(response.body(), "nothing at /x");
        assert!(router.is_empty());
    }

    #[tokio::test]
    async fn handler_errors_become_responses() {
        let response = router().dispatch(request_from("POST /fail HTTP/1.1\r\n\r\n")).await;
        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body(), "internal error: store offline\n");
    }

    #[test]
    fn later_registration_wins() {
        let router = Router::builder().get("/", handler_fn(hello)).get("/", handler_fn(fails)).build();
        assert_eq!(router.len(), 1);
    }
}
