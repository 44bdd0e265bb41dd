//! Drives management handling for accepted controller connections.

use std::io::{self, BufRead, BufReader, Read};
use std::sync::Arc;

use tracing::{debug, warn};

use super::MANAGEMENT_TARGET;
use super::errors::HandlerError;
use super::handler::{ManagementOperationHandler, ServerManagerHandler};
use crate::model::ModelMutator;
use crate::transport::{Connection, ConnectionHandler, ConnectionStream};

/// Transport handler servicing every accepted stream with a
/// [`ServerManagerHandler`].
pub(crate) struct ManagementConnectionHandler<M> {
    handler: ServerManagerHandler<M>,
}

impl<M: ModelMutator> ManagementConnectionHandler<M> {
    pub(crate) fn new(models: Arc<M>) -> Self {
        Self {
            handler: ServerManagerHandler::new(models),
        }
    }
}

impl<M: ModelMutator + 'static> ConnectionHandler for ManagementConnectionHandler<M> {
    fn handle(&self, mut stream: ConnectionStream) {
        let reader = match stream.try_clone() {
            Ok(reader) => reader,
            Err(error) => {
                warn!(
                    target: MANAGEMENT_TARGET,
                    %error,
                    "failed to split controller connection"
                );
                return;
            }
        };
        serve_connection(&self.handler, &mut stream, reader);
    }
}

/// Services messages from `reader` until the peer stops sending or a
/// message fails.
pub(crate) fn serve_connection<H, R>(handler: &H, connection: &mut dyn Connection, reader: R)
where
    H: ManagementOperationHandler + ?Sized,
    R: Read,
{
    let mut input = BufReader::new(reader);
    let mut handled = 0_usize;
    loop {
        let outcome = match at_message_boundary_eof(&mut input) {
            Ok(true) => {
                debug!(
                    target: MANAGEMENT_TARGET,
                    messages = handled,
                    "controller finished sending"
                );
                if let Err(error) = handler.handle_shutdown(connection) {
                    warn!(
                        target: MANAGEMENT_TARGET,
                        %error,
                        "failed to shut down connection writes"
                    );
                }
                handler.handle_finished(connection);
                return;
            }
            Ok(false) => handler.handle_message(connection, &mut input),
            Err(error) => Err(HandlerError::Io(error)),
        };
        if let Err(error) = outcome {
            warn!(
                target: MANAGEMENT_TARGET,
                %error,
                messages = handled,
                "management request failed"
            );
            handler.handle_failure(connection, &error);
            return;
        }
        handled += 1;
    }
}

fn at_message_boundary_eof<R: Read>(input: &mut BufReader<R>) -> io::Result<bool> {
    loop {
        match input.fill_buf() {
            Ok(buffer) => return Ok(buffer.is_empty()),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    }
}
