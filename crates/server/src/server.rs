use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use http::StatusCode;
use micro_wire::WireConfig;
use micro_wire::connection::WireConnection;
use micro_wire::protocol::{BodyError, BuildError, ErrorClass, ParseError, SendError, WireError};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// Why a connection ended without a complete exchange.
#[derive(Error, Debug)]
pub enum ServeError {
    #[error("{source}")]
    Wire {
        #[from]
        source: WireError,
    },

    #[error("failed to build response: {source}")]
    Build {
        #[from]
        source: BuildError,
    },
}

impl ServeError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ServeError::Wire { source } => source.class(),
            ServeError::Build { .. } => ErrorClass::Validation,
        }
    }
}

impl From<ParseError> for ServeError {
    fn from(e: ParseError) -> Self {
        WireError::from(e).into()
    }
}

impl From<BodyError> for ServeError {
    fn from(e: BodyError) -> Self {
        WireError::from(e).into()
    }
}

impl From<SendError> for ServeError {
    fn from(e: SendError) -> Self {
        WireError::from(e).into()
    }
}

/// Accepts connections and answers exactly one request on each.
#[derive(Debug)]
pub struct Server {
    router: Arc<Router>,
    wire_config: WireConfig,
    max_body_bytes: u64,
}

impl Server {
    pub fn new(router: Router, config: &ServerConfig) -> Self {
        Self { router: Arc::new(router), wire_config: config.wire_config(), max_body_bytes: config.max_body_bytes }
    }

    /// Binds `address` and serves until the process ends.
    pub async fn run(self, address: &str) -> io::Result<()> {
        let listener = TcpListener::bind(address).await?;
        info!(address = %listener.local_addr()?, "start listening");
        self.serve(listener).await;
        Ok(())
    }

    /// Runs the accept loop on `listener`, one task per connection.
    ///
    /// A failing connection is logged and closed; it never stops the loop.
    pub async fn serve(self, listener: TcpListener) {
        loop {
            let (tcp_stream, remote_addr) = match listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let router = Arc::clone(&self.router);
            let wire_config = self.wire_config;
            let max_body_bytes = self.max_body_bytes;

            tokio::spawn(async move {
                let mut connection = WireConnection::from_tcp(tcp_stream, &wire_config);
                match serve_connection(&router, &mut connection, max_body_bytes).await {
                    Ok(()) => debug!(%remote_addr, "connection finished"),
                    Err(e) => log_failure(remote_addr, &e),
                }
            });
        }
    }
}

/// Reads one request from `connection`, answers it and closes the write half.
///
/// A request line that is not `METHOD PATH PROTOCOL` is answered with `400`,
/// a declared body above `max_body_bytes` with `413`. Framing, body-length and
/// timeout failures return an error without writing anything, since the
/// stream position can no longer be trusted.
pub async fn serve_connection<R, W>(
    router: &Router,
    connection: &mut WireConnection<R, W>,
    max_body_bytes: u64,
) -> Result<(), ServeError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (reader, writer) = connection.split();
    let Some(message) = reader.read_message().await? else {
        return Ok(());
    };
    let (head, mut body) = message.into_parts();

    let response = match head.request_line() {
        Err(e) => {
            warn!(cause = %e, "rejecting request");
            Response::text(StatusCode::BAD_REQUEST, format!("{e}\n"))
        }
        Ok(_) if body.len() > max_body_bytes => {
            warn!(len = body.len(), max = max_body_bytes, "request body too large");
            Response::status(StatusCode::PAYLOAD_TOO_LARGE)
        }
        Ok(line) => {
            let bytes = body.read_to_bytes().await?;
            debug!(method = %line.method(), path = line.path(), len = bytes.len(), "received request");
            router.dispatch(Request::new(line, head, bytes)).await
        }
    };

    let mut message = response.into_message()?;
    writer.write_message(&mut message).await?;
    writer.shutdown().await?;
    Ok(())
}

fn log_failure(remote_addr: SocketAddr, e: &ServeError) {
    match e.class() {
        ErrorClass::Timeout => warn!(%remote_addr, cause = %e, "deadline elapsed, closing connection"),
        ErrorClass::Io => info!(%remote_addr, cause = %e, "connection failed"),
        ErrorClass::Validation => error!(%remote_addr, cause = %e, "could not answer request"),
        class => warn!(%remote_addr, ?class, cause = %e, "closing connection without response"),
    }
}
