//! Per-message request handling.

use std::io::{self, Read};
use std::sync::Arc;

use tracing::{debug, warn};

use overseer_protocol::{FrameReader, tags};

use super::MANAGEMENT_TARGET;
use super::errors::HandlerError;
use super::output::MessageOutput;
use super::registry::OperationRegistry;
use crate::model::ModelMutator;
use crate::transport::Connection;

/// Handles management messages arriving on a connection.
///
/// The connection driver calls [`Self::handle_message`] once per inbound
/// message and the lifecycle hooks when the connection ends.
pub(crate) trait ManagementOperationHandler: Send + Sync {
    /// Reads one request from `input` and answers it on `connection`.
    ///
    /// `input` is only borrowed for the call. On error no response bytes
    /// have been written.
    fn handle_message(
        &self,
        connection: &mut dyn Connection,
        input: &mut dyn Read,
    ) -> Result<(), HandlerError>;

    /// Called when the peer finished sending at a message boundary.
    fn handle_shutdown(&self, connection: &mut dyn Connection) -> io::Result<()> {
        connection.shutdown_writes()
    }

    /// Called after a message failed; the connection is not reused.
    fn handle_failure(&self, connection: &mut dyn Connection, error: &HandlerError) {
        debug!(target: MANAGEMENT_TARGET, %error, "closing connection after failure");
        if let Err(close_error) = connection.close() {
            warn!(
                target: MANAGEMENT_TARGET,
                error = %close_error,
                "failed to close connection"
            );
        }
    }

    /// Called once a connection has been serviced completely.
    fn handle_finished(&self, _connection: &mut dyn Connection) {}
}

/// Dispatches management requests to operations backed by the managed
/// models.
pub(crate) struct ServerManagerHandler<M> {
    registry: OperationRegistry,
    models: Arc<M>,
}

impl<M: ModelMutator> ServerManagerHandler<M> {
    pub(crate) fn new(models: Arc<M>) -> Self {
        Self::with_registry(OperationRegistry::new(), models)
    }

    pub(crate) const fn with_registry(registry: OperationRegistry, models: Arc<M>) -> Self {
        Self { registry, models }
    }
}

impl<M: ModelMutator> ManagementOperationHandler for ServerManagerHandler<M> {
    fn handle_message(
        &self,
        connection: &mut dyn Connection,
        input: &mut dyn Read,
    ) -> Result<(), HandlerError> {
        let mut input = FrameReader::new(input);
        input.expect_tag(tags::REQUEST_OPERATION)?;
        let code = input.read_byte()?;
        let operation = self.registry.operation_for(code)?;
        let command = operation.command();
        debug!(
            target: MANAGEMENT_TARGET,
            %command,
            request_code = operation.request_code(),
            "dispatching request"
        );
        let output = MessageOutput::new(connection);
        operation
            .handle(&mut input, output, self.models.as_ref())
            .map_err(|error| HandlerError::from_operation(command, error))
    }

    fn handle_finished(&self, _connection: &mut dyn Connection) {
        debug!(target: MANAGEMENT_TARGET, "controller connection finished");
    }
}
