//! Buffered outbound message.

use overseer_protocol::{FrameError, FrameWriter};

use crate::transport::Connection;

/// Response under construction for one request.
///
/// Fields are written into a buffer; nothing reaches the connection until
/// [`MessageOutput::commit`]. Dropping an uncommitted output discards it.
pub(crate) struct MessageOutput<'a> {
    connection: &'a mut dyn Connection,
    writer: FrameWriter<Vec<u8>>,
}

impl<'a> MessageOutput<'a> {
    pub(crate) fn new(connection: &'a mut dyn Connection) -> Self {
        Self {
            connection,
            writer: FrameWriter::new(Vec::new()),
        }
    }

    pub(crate) fn writer(&mut self) -> &mut FrameWriter<Vec<u8>> {
        &mut self.writer
    }

    /// Sends the buffered message as a single write.
    pub(crate) fn commit(self) -> Result<(), FrameError> {
        let message = self.writer.into_inner();
        self.connection.send_message(&message)?;
        Ok(())
    }
}
