//! A small server built on `micro-wire` framing.
//!
//! Each accepted connection carries exactly one request: the server reads the
//! head, validates the request line, reads the body within the configured
//! limit, dispatches it through an exact-match [`Router`], writes one response
//! and closes the connection.
//!
//! ```no_run
//! use std::sync::Arc;
//! use micro_wire_server::{Server, ServerConfig, app, store::KvStore};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let config = ServerConfig::default();
//!     let router = app::router(Arc::new(KvStore::new()));
//!     Server::new(router, &config).run(&config.address).await
//! }
//! ```

pub mod app;
pub mod config;
pub mod cookie;
pub mod handler;
pub mod logging;
pub mod router;
pub mod store;

mod request;
mod response;
mod server;

pub use config::{ConfigError, ConfigOverrides, ServerConfig};
pub use request::Request;
pub use response::Response;
pub use router::Router;
pub use server::{ServeError, Server, serve_connection};
