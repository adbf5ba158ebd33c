//! Server configuration: a TOML file merged with command line overrides.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration:
//!
//! ```toml
//! address = "127.0.0.1:8080"
//! max_body_bytes = 1048576
//! max_head_bytes = 8192
//! max_headers = 64
//! timeout_secs = 300
//! log_level = "info"
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use clap::Args;
use micro_wire::WireConfig;
use micro_wire::config::{DEFAULT_MAX_HEAD_BYTES, DEFAULT_MAX_HEADERS, DEFAULT_TIMEOUT};
use serde::Deserialize;
use thiserror::Error;
use tracing::Level;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_MAX_BODY_BYTES: u64 = 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to parse config: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },

    #[error("invalid config: {reason}")]
    Invalid { reason: String },
}

impl ConfigError {
    fn invalid<S: ToString>(reason: S) -> Self {
        Self::Invalid { reason: reason.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub address: String,
    /// Largest request body accepted; larger declared lengths get a `413`.
    pub max_body_bytes: u64,
    pub max_head_bytes: usize,
    pub max_headers: usize,
    /// Lifetime of a connection in seconds; `0` disables the deadline.
    pub timeout_secs: u64,
    /// One of `trace`, `debug`, `info`, `warn`, `error`.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_head_bytes: DEFAULT_MAX_HEAD_BYTES,
            max_headers: DEFAULT_MAX_HEADERS,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            log_level: "info".to_string(),
        }
    }
}

/// Command line flags that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct ConfigOverrides {
    /// Socket address to listen on
    #[arg(long)]
    pub address: Option<String>,

    /// Largest accepted request body in bytes
    #[arg(long)]
    pub max_body_bytes: Option<u64>,

    /// Largest accepted head in bytes
    #[arg(long)]
    pub max_head_bytes: Option<usize>,

    /// Largest accepted number of header lines
    #[arg(long)]
    pub max_headers: Option<usize>,

    /// Connection lifetime in seconds, 0 disables it
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Log level: trace, debug, info, warn or error
    #[arg(long)]
    pub log_level: Option<String>,
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        content.parse()
    }

    /// Applies every override that was given.
    #[must_use]
    pub fn merge(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(address) = overrides.address {
            self.address = address;
        }
        if let Some(max_body_bytes) = overrides.max_body_bytes {
            self.max_body_bytes = max_body_bytes;
        }
        if let Some(max_head_bytes) = overrides.max_head_bytes {
            self.max_head_bytes = max_head_bytes;
        }
        if let Some(max_headers) = overrides.max_headers {
            self.max_headers = max_headers;
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        if let Some(log_level) = overrides.log_level {
            self.log_level = log_level;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address.trim().is_empty() {
            return Err(ConfigError::invalid("address must not be empty"));
        }
        // the shortest useful head is a one-byte line plus the blank line
        if self.max_head_bytes < 4 {
            return Err(ConfigError::invalid(format!("max_head_bytes {} is too small", self.max_head_bytes)));
        }
        if self.max_headers == 0 {
            return Err(ConfigError::invalid("max_headers must be at least 1"));
        }
        self.log_level().map(|_| ())
    }

    pub fn log_level(&self) -> Result<Level, ConfigError> {
        Level::from_str(&self.log_level).map_err(|e| ConfigError::invalid(format!("log_level {:?}: {e}", self.log_level)))
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn wire_config(&self) -> WireConfig {
        WireConfig::default()
            .with_max_head_bytes(self.max_head_bytes)
            .with_max_headers(self.max_headers)
            .with_timeout(self.timeout())
    }
}

impl FromStr for ServerConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn empty_file_is_default() {
        let config: ServerConfig = "".parse().unwrap();
        assert_eq!(config, ServerConfig::default());
        assert!(config.validate().is_ok());
        assert_eq!(config.wire_config(), WireConfig::default());
    }

    #[test]
    fn parses_partial_file() {
        let config: ServerConfig = indoc! {r#"
            address = "0.0.0.0:9000"
            max_body_bytes = 16
            timeout_secs = 0
        "#}
        .parse()
        .unwrap();

        assert_eq!(config.address, "0.0.0.0:9000");
        assert_eq!(config.max_body_bytes, 16);
        assert_eq!(config.max_headers, DEFAULT_MAX_HEADERS);
        assert_eq!(config.timeout(), None);
        assert_eq!(config.wire_config().timeout(), None);
    }

    #[test]
    fn rejects_unknown_keys_and_bad_types() {
        assert!(matches!("adress = \"x\"".parse::<ServerConfig>(), Err(ConfigError::Parse { .. })));
        assert!(matches!("max_headers = \"many\"".parse::<ServerConfig>(), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn overrides_win() {
        let config: ServerConfig = "address = \"127.0.0.1:1\"\nlog_level = \"warn\"".parse().unwrap();
        let overrides = ConfigOverrides { address: Some("127.0.0.1:2".to_string()), max_headers: Some(8), ..Default::default() };

        let merged = config.merge(overrides);
        assert_eq!(merged.address, "127.0.0.1:2");
        assert_eq!(merged.max_headers, 8);
        assert_eq!(merged.log_level().unwrap(), Level::WARN);
    }

    #[test]
    fn validation_catches_bad_values() {
        let config = ServerConfig { log_level: "loud".to_string(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let config = ServerConfig { max_headers: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let config = ServerConfig { address: " ".to_string(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ServerConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
