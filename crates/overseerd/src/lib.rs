//! The overseer server manager daemon.
//!
//! The daemon keeps the domain, host and server models for a single host and
//! exposes them to a controller over the management protocol defined in
//! [`overseer_protocol`]. Startup follows a fixed sequence: configuration is
//! loaded through [`overseer_config`], structured telemetry is installed, the
//! socket directory is prepared and the management listener is bound.
//!
//! Each accepted controller connection is served on its own thread. Requests
//! on a connection are handled strictly in order and every request receives
//! exactly one response, or the connection is closed. Batched model updates
//! are applied item by item so a rejected update never prevents the rest of
//! the batch from being attempted.
//!
//! Health reporting hooks emit structured telemetry at each lifecycle stage
//! so operators can tell a configuration failure from a listener failure.

mod bootstrap;
mod health;
mod management;
mod model;
mod process;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use management::{DispatchError, HandlerError, OperationError, OperationPhase};
pub use model::{ManagedModels, ModelError, ModelMutator};
pub use process::{LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_daemon};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
