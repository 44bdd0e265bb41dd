//! Server manager side of the management protocol.
//!
//! Every message on a controller connection is a single request:
//!
//! ```text
//! [REQUEST_OPERATION][command code] <command fields>
//! ```
//!
//! `ServerManagerHandler` reads the header, resolves the command code
//! through the `OperationRegistry` and runs a fresh `Operation`, which
//! reads the rest of the request, applies it to the managed models and
//! commits the response through a `MessageOutput`. Batched updates are
//! applied item by item; rejected items are reported in their response slot
//! without stopping the batch. Any other failure ends the connection without
//! a response.

mod batch;
mod connection;
mod errors;
mod handler;
mod operation;
mod output;
mod registry;

pub(crate) use self::connection::ManagementConnectionHandler;
pub use self::errors::{DispatchError, HandlerError, OperationError, OperationPhase};
#[cfg(test)]
pub(crate) use self::handler::{ManagementOperationHandler, ServerManagerHandler};

const MANAGEMENT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::management");
