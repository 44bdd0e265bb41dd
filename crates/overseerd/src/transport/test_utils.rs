//! Test doubles for the transport seams.

use std::io;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use super::{Connection, ConnectionHandler, ConnectionStream};

/// Handler that counts accepted connections and drops them.
pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            count: Arc::clone(&count),
        });
        (count, handler)
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, _stream: ConnectionStream) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-memory connection recording every committed message and lifecycle
/// call.
#[derive(Debug, Default)]
pub(crate) struct RecordingConnection {
    pub(crate) messages: Vec<Vec<u8>>,
    pub(crate) writes_shut: bool,
    pub(crate) closed: bool,
}

impl RecordingConnection {
    /// Every byte sent, in order.
    pub(crate) fn sent_bytes(&self) -> Vec<u8> {
        self.messages.concat()
    }
}

impl Connection for RecordingConnection {
    fn send_message(&mut self, message: &[u8]) -> io::Result<()> {
        if self.writes_shut || self.closed {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "connection no longer writable",
            ));
        }
        self.messages.push(message.to_vec());
        Ok(())
    }

    fn shutdown_writes(&mut self) -> io::Result<()> {
        self.writes_shut = true;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }
}
