use crate::socket::SocketEndpoint;

/// Default host used for the management listener.
pub const DEFAULT_LISTEN_HOST: &str = "127.0.0.1";

/// Default TCP port on which the server manager accepts controller connections.
pub const DEFAULT_LISTEN_PORT: u16 = 9999;

/// Default name reported for the managed host.
pub const DEFAULT_HOST_NAME: &str = "local";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the binaries.
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

/// Owned host name used where allocation is required (e.g. serde).
pub fn default_host_name() -> String {
    DEFAULT_HOST_NAME.to_string()
}

/// Computes the default endpoint for the management listener.
///
/// Controllers usually run on another machine, so the default is a loopback
/// TCP endpoint rather than a Unix socket.
pub fn default_listen_socket() -> SocketEndpoint {
    SocketEndpoint::tcp(DEFAULT_LISTEN_HOST, DEFAULT_LISTEN_PORT)
}
