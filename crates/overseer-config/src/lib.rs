//! Shared configuration for the overseer server manager.
//!
//! Configuration is layered by [`ortho_config`]: built-in defaults, then an
//! optional configuration file (`--config-path`), then `OVERSEER_*`
//! environment variables, and finally command-line flags. The resulting
//! [`Config`] describes where the management listener binds, the name of the
//! managed host, and how the daemon emits telemetry.

mod defaults;
mod logging;
mod socket;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_HOST_NAME, DEFAULT_LISTEN_HOST, DEFAULT_LISTEN_PORT, DEFAULT_LOG_FILTER,
    default_host_name, default_listen_socket, default_log_filter, default_log_filter_string,
    default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketEndpoint, SocketParseError, SocketPreparationError};

/// Resolved server manager configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "OVERSEER")]
pub struct Config {
    /// Endpoint on which controller connections are accepted.
    #[serde(default = "default_listen_socket")]
    #[ortho_config(default = default_listen_socket())]
    pub listen_socket: SocketEndpoint,
    /// Name of the host whose servers this manager supervises.
    #[serde(default = "default_host_name")]
    #[ortho_config(default = default_host_name())]
    pub host_name: String,
    /// `tracing` filter expression applied to daemon telemetry.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for daemon telemetry.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_socket: default_listen_socket(),
            host_name: default_host_name(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Endpoint on which the management listener binds.
    #[must_use]
    pub fn listen_socket(&self) -> &SocketEndpoint {
        &self.listen_socket
    }

    /// Name of the managed host.
    #[must_use]
    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    /// Filter expression for the telemetry subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format for the telemetry subscriber.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
