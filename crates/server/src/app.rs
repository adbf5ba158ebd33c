//! The demo application: a greeting, an echo and a key-value store.
//!
//! | route | body | answer |
//! |---|---|---|
//! | `GET /` | | greeting, counts visits in a cookie |
//! | `POST /echo` | anything | the same bytes |
//! | `GET /kv` | | every `key=value`, one per line |
//! | `POST /kv` | `key=value` | `201` when new, `200` when replaced |
//! | `POST /kv/get` | `key` | the value or `404` |
//! | `DELETE /kv` | `key` | `200` or `404` |
//! | `GET /kv/size` | | number of keys |
//! | `GET /kv/values` | | every value, ordered by key |
//! | `POST /kv/clear` | | number of removed keys |

use std::sync::Arc;

use http::StatusCode;

use crate::cookie::{SameSite, SetCookie};
use crate::handler::{Handler, HandlerError, handler_fn};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::store::KvStore;

const VISITS_COOKIE: &str = "visits";

pub fn router(store: Arc<KvStore>) -> Router {
    Router::builder()
        .get("/", handler_fn(index))
        .post("/echo", handler_fn(echo))
        .get("/kv", with_store(&store, list))
        .post("/kv", with_store(&store, set))
        .post("/kv/get", with_store(&store, get))
        .delete("/kv", with_store(&store, delete))
        .get("/kv/size", with_store(&store, size))
        .get("/kv/values", with_store(&store, values))
        .post("/kv/clear", with_store(&store, clear))
        .build()
}

fn with_store<F, Fut>(store: &Arc<KvStore>, f: F) -> impl Handler + 'static
where
    F: Fn(Arc<KvStore>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
{
    let store = Arc::clone(store);
    handler_fn(move |request| f(Arc::clone(&store), request))
}

async fn index(request: Request) -> Result<Response, HandlerError> {
    // an unparsable counter starts over
    let previous = request.cookie(VISITS_COOKIE)?.and_then(|cookie| cookie.value().parse::<u64>().ok()).unwrap_or(0);
    let visits = previous.saturating_add(1);

    let cookie = SetCookie::new(VISITS_COOKIE, visits.to_string())?
        .with_path("/")
        .http_only()
        .with_same_site(SameSite::Lax);
    let greeting = if visits == 1 { "Hello World!\n".to_string() } else { format!("Hello again, visit {visits}\n") };

    Ok(Response::ok(greeting).with_cookie(&cookie))
}

async fn echo(request: Request) -> Result<Response, HandlerError> {
    let content_type = request.head().mime().map_or_else(|_| mime::APPLICATION_OCTET_STREAM.to_string(), |m| m.to_string());
    Ok(Response::new(StatusCode::OK, request.body().clone()).with_header("Content-Type", content_type))
}

async fn list(store: Arc<KvStore>, _request: Request) -> Result<Response, HandlerError> {
    let body: String = store.entries().into_iter().map(|(key, value)| format!("{key}={value}\n")).collect();
    Ok(Response::ok(body))
}

async fn set(store: Arc<KvStore>, request: Request) -> Result<Response, HandlerError> {
    let (key, value) = parse_entry(request.body_text()?)?;
    let status = match store.set(key, value) {
        Some(_) => StatusCode::OK,
        None => StatusCode::CREATED,
    };
    Ok(Response::text(status, format!("stored {key}\n")))
}

async fn get(store: Arc<KvStore>, request: Request) -> Result<Response, HandlerError> {
    let key = parse_key(request.body_text()?)?;
    Ok(match store.get(key) {
        Some(value) => Response::ok(format!("{value}\n")),
        None => Response::text(StatusCode::NOT_FOUND, format!("no such key {key}\n")),
    })
}

async fn delete(store: Arc<KvStore>, request: Request) -> Result<Response, HandlerError> {
    let key = parse_key(request.body_text()?)?;
    Ok(match store.delete(key) {
        Some(_) => Response::ok(format!("deleted {key}\n")),
        None => Response::text(StatusCode::NOT_FOUND, format!("no such key {key}\n")),
    })
}

async fn size(store: Arc<KvStore>, _request: Request) -> Result<Response, HandlerError> {
    Ok(Response::ok(format!("{}\n", store.size())))
}

async fn values(store: Arc<KvStore>, _request: Request) -> Result<Response, HandlerError> {
    let body: String = store.values().into_iter().map(|value| value + "\n").collect();
    Ok(Response::ok(body))
}

async fn clear(store: Arc<KvStore>, _request: Request) -> Result<Response, HandlerError> {
    Ok(Response::ok(format!("cleared {}\n", store.clear())))
}

fn parse_key(body: &str) -> Result<&str, HandlerError> {
    let key = body.trim();
    if key.is_empty() || key.contains(['=', '\r', '\n']) {
        return Err(HandlerError::bad_request(format!("invalid key {key:?}")));
    }
    Ok(key)
}

fn parse_entry(body: &str) -> Result<(&str, &str), HandlerError> {
    let Some((key, value)) = body.trim_end_matches(['\r', '\n']).split_once('=') else {
        return Err(HandlerError::bad_request("expected key=value"));
    };
    if value.contains(['\r', '\n']) {
        return Err(HandlerError::bad_request("value must be a single line"));
    }
    Ok((parse_key(key)?, value))
}
