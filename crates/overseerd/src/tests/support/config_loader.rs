//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;

use overseer_config::{Config, SocketEndpoint};

use crate::bootstrap::ConfigLoader;

/// Loader that provisions a Unix socket path under a temporary directory,
/// or an ephemeral loopback TCP port.
#[derive(Clone)]
pub struct TestConfigLoader {
    _socket_dir: Arc<TempDir>,
    endpoint: SocketEndpoint,
}

impl TestConfigLoader {
    /// Listens on a Unix socket nested below a fresh temporary directory.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temporary directory for socket");
        let path = dir.path().join("run").join("overseerd.sock");
        let path = path
            .to_str()
            .expect("temporary socket path was not valid UTF-8")
            .to_owned();
        Self {
            _socket_dir: Arc::new(dir),
            endpoint: SocketEndpoint::unix(path),
        }
    }

    /// Listens on `127.0.0.1` with an OS-assigned port.
    #[must_use]
    pub fn tcp() -> Self {
        Self::with_endpoint(SocketEndpoint::tcp("127.0.0.1", 0))
    }

    /// Listens on an explicit endpoint.
    #[must_use]
    pub fn with_endpoint(endpoint: SocketEndpoint) -> Self {
        Self {
            endpoint,
            ..Self::new()
        }
    }

    pub fn endpoint(&self) -> &SocketEndpoint {
        &self.endpoint
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            listen_socket: self.endpoint.clone(),
            host_name: "test-host".to_owned(),
            log_filter: "overseerd=debug".to_owned(),
            ..Config::default()
        })
    }
}

/// Loader that intentionally fails by passing an unknown CLI flag.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("overseerd"),
            OsString::from("--no-such-flag"),
        ];
        Config::load_from_iter(args)
    }
}
