//! Internal helpers shared by the decoders and the connection halves.

use tokio::time::{timeout_at, Instant};

/// Returns `Err($error)` from the enclosing function unless `$predicate` holds.
///
/// ```ignore
/// ensure!(lines <= max_headers, ParseError::too_many_headers(max_headers));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

/// Runs `future` to completion unless the absolute `deadline` passes first.
///
/// When the deadline elapses the future is dropped and `elapsed()` is returned
/// as the error. A `None` deadline never times out.
pub(crate) async fn within<F, T, E>(deadline: Option<Instant>, future: F, elapsed: impl FnOnce() -> E) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match deadline {
        Some(deadline) => match timeout_at(deadline, future).await {
            Ok(result) => result,
            Err(_elapsed) => Err(elapsed()),
        },
        None => future.await,
    }
}
