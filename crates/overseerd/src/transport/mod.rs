//! Socket transport for controller connections.
//!
//! The listener binds the configured endpoint, accepts connections on a
//! background thread and hands every stream to a [`ConnectionHandler`].

mod errors;
mod handler;
mod listener;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub(crate) use self::handler::{Connection, ConnectionHandler, ConnectionStream};
#[cfg(test)]
pub(crate) use self::listener::ListenerHandle;
pub(crate) use self::listener::SocketListener;
#[cfg(test)]
pub(crate) use self::test_utils::{CountingHandler, RecordingConnection};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
