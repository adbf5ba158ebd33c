//! Framing limits and connection timeout settings.

use std::time::Duration;

use tokio::time::Instant;

/// Default upper bound for the whole head (status line, headers, blank line).
pub const DEFAULT_MAX_HEAD_BYTES: usize = 8 * 1024;

/// Default upper bound for the number of header lines in one head.
pub const DEFAULT_MAX_HEADERS: usize = 64;

/// Default lifetime of a connection deadline, measured from connection setup.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Limits applied while framing messages on one connection.
///
/// ```
/// use std::time::Duration;
/// use micro_wire::WireConfig;
///
/// let config = WireConfig::default().with_max_head_bytes(4096).with_timeout(Some(Duration::from_secs(30)));
/// assert_eq!(config.max_head_bytes(), 4096);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireConfig {
    max_head_bytes: usize,
    max_headers: usize,
    timeout: Option<Duration>,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self { max_head_bytes: DEFAULT_MAX_HEAD_BYTES, max_headers: DEFAULT_MAX_HEADERS, timeout: Some(DEFAULT_TIMEOUT) }
    }
}

impl WireConfig {
    #[must_use]
    pub fn with_max_head_bytes(mut self, max_head_bytes: usize) -> Self {
        self.max_head_bytes = max_head_bytes;
        self
    }

    #[must_use]
    pub fn with_max_headers(mut self, max_headers: usize) -> Self {
        self.max_headers = max_headers;
        self
    }

    /// Sets how long a connection may live before its deadline fires.
    /// `None` disables the deadline entirely.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_head_bytes(&self) -> usize {
        self.max_head_bytes
    }

    pub fn max_headers(&self) -> usize {
        self.max_headers
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The absolute deadline for a connection set up now.
    pub fn deadline_from_now(&self) -> Option<Instant> {
        self.timeout.map(|timeout| Instant::now() + timeout)
    }
}
