//! Error types raised while servicing management requests.

use std::io;

use thiserror::Error;

use overseer_protocol::{FrameError, FramingError, ManagementCommand};

use crate::model::ModelError;

/// A request named a command code with no registered operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid command code 0x{code:02X}")]
pub struct DispatchError {
    /// Unregistered command code.
    pub code: u8,
}

/// Lifecycle stage of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationPhase {
    /// Nothing has been read yet.
    New,
    /// The request body has been read.
    RequestRead,
    /// The response has been committed.
    ResponseSent,
}

/// Failures inside a single operation.
#[derive(Debug, Error)]
pub enum OperationError {
    /// Reading the request or writing the response failed.
    #[error(transparent)]
    Frame(#[from] FrameError),
    /// The managed models could not apply the request.
    #[error(transparent)]
    Model(#[from] ModelError),
    /// A step ran out of order.
    #[error("operation step requires phase {expected:?} but operation is in {actual:?}")]
    OutOfOrder {
        /// Phase the step requires.
        expected: OperationPhase,
        /// Phase the operation was in.
        actual: OperationPhase,
    },
}

/// Errors returned by `ManagementOperationHandler::handle_message`.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The command code was not registered.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    /// The request violated the framing rules.
    #[error("framing error: {0}")]
    Framing(#[source] FramingError),
    /// The connection failed.
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
    /// The operation failed after dispatch.
    #[error("{command} operation failed: {source}")]
    OperationExecution {
        /// Command being executed.
        command: ManagementCommand,
        /// Underlying failure.
        #[source]
        source: OperationError,
    },
}

impl HandlerError {
    /// Classifies an operation failure; framing and transport failures keep
    /// their own variants.
    pub(crate) fn from_operation(command: ManagementCommand, error: OperationError) -> Self {
        match error {
            OperationError::Frame(FrameError::Framing(source)) => Self::Framing(source),
            OperationError::Frame(FrameError::Io(source)) => Self::Io(source),
            source => Self::OperationExecution { command, source },
        }
    }
}

impl From<FrameError> for HandlerError {
    fn from(error: FrameError) -> Self {
        match error {
            FrameError::Framing(source) => Self::Framing(source),
            FrameError::Io(source) => Self::Io(source),
            other => Self::Io(io::Error::new(io::ErrorKind::InvalidData, other)),
        }
    }
}
