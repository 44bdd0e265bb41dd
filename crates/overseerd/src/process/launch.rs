//! Supervises server manager launch sequencing and runtime orchestration.

use std::sync::Arc;

use tracing::info;

use overseer_config::SocketEndpoint;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::management::ManagementConnectionHandler;
use crate::transport::SocketListener;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Collaborators required to launch the server manager runtime.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) shutdown: S,
}

/// Runs the server manager using the production collaborators.
///
/// Blocks until a termination signal arrives, then stops accepting
/// controller connections and returns.
pub fn run_daemon() -> Result<(), LaunchError> {
    run_daemon_with(LaunchPlan {
        loader: SystemConfigLoader,
        reporter: Arc::new(StructuredHealthReporter::new()),
        shutdown: SystemShutdownSignal::new(),
    })
}

/// Runs the server manager with injected collaborators.
pub(crate) fn run_daemon_with<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        reporter,
        shutdown,
    } = plan;

    info!(target: PROCESS_TARGET, "starting server manager runtime");
    let daemon = bootstrap_with(&loader, Arc::clone(&reporter))?;

    let listener = SocketListener::bind(daemon.config().listen_socket())
        .inspect_err(|error| reporter.listener_failed(error))?;
    let endpoint = bound_endpoint(daemon.config().listen_socket(), &listener);

    let handler = Arc::new(ManagementConnectionHandler::new(daemon.models()));
    let handle = listener
        .start(handler)
        .inspect_err(|error| reporter.listener_failed(error))?;
    reporter.listener_ready(&endpoint);

    let waited = shutdown.wait();
    handle.shutdown();
    let joined = handle.join();
    reporter.listener_stopped();
    waited?;
    joined?;

    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}

/// Endpoint actually bound, resolving an ephemeral TCP port.
fn bound_endpoint(configured: &SocketEndpoint, listener: &SocketListener) -> SocketEndpoint {
    match (configured, listener.local_addr()) {
        (SocketEndpoint::Tcp { .. }, Some(addr)) => {
            SocketEndpoint::tcp(addr.ip().to_string(), addr.port())
        }
        _ => configured.clone(),
    }
}

