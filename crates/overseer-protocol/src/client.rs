//! Blocking controller-side client.
//!
//! The client writes one request at a time and waits for the matching
//! response, so a single connection can carry any number of exchanges.

use std::io::{self, BufReader, BufWriter, Read, Write};

use thiserror::Error;
use tracing::debug;

use crate::command::ManagementCommand;
use crate::error::FrameError;
use crate::frame::{FrameReader, FrameWriter};
use crate::message::{ManagementRequest, ManagementResponse};
use crate::model::{
    DomainModel, DomainModelUpdate, HostModelUpdate, ServerIdentityResponse, ServerModelUpdate,
    ServerUpdateResponse,
};

const CLIENT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::client");

/// Errors surfaced by [`ManagementClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be written.
    #[error("failed to send {command} request: {source}")]
    Send {
        /// Command being sent.
        command: ManagementCommand,
        /// Underlying frame error.
        #[source]
        source: FrameError,
    },
    /// The response could not be read.
    #[error("failed to read {command} response: {source}")]
    Receive {
        /// Command awaiting its response.
        command: ManagementCommand,
        /// Underlying frame error.
        #[source]
        source: FrameError,
    },
    /// The response belonged to a different command.
    #[error("received {actual} response to a {expected} request")]
    MismatchedResponse {
        /// Command that was sent.
        expected: ManagementCommand,
        /// Command named by the response.
        actual: ManagementCommand,
    },
}

/// Sends management requests over a connected stream.
#[derive(Debug)]
pub struct ManagementClient<R: Read, W: Write> {
    reader: FrameReader<BufReader<R>>,
    writer: FrameWriter<BufWriter<W>>,
}

impl<R: Read, W: Write> ManagementClient<R, W> {
    /// Wraps the read and write halves of a connection.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: FrameReader::new(BufReader::new(reader)),
            writer: FrameWriter::new(BufWriter::new(writer)),
        }
    }

    /// Installs a complete domain model.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when the exchange fails.
    pub fn update_full_domain(&mut self, model: DomainModel) -> Result<(), ClientError> {
        self.exchange(&ManagementRequest::UpdateFullDomain(model))
            .map(drop)
    }

    /// Applies domain updates, returning one response per update.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when the exchange fails.
    pub fn update_domain_model(
        &mut self,
        updates: Vec<DomainModelUpdate>,
    ) -> Result<Vec<ServerIdentityResponse>, ClientError> {
        let request = ManagementRequest::UpdateDomainModel(updates);
        match self.exchange(&request)? {
            ManagementResponse::UpdateDomainModel(responses) => Ok(responses),
            other => Err(mismatch(&request, &other)),
        }
    }

    /// Applies host updates, returning one response per update.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when the exchange fails.
    pub fn update_host_model(
        &mut self,
        updates: Vec<HostModelUpdate>,
    ) -> Result<Vec<ServerIdentityResponse>, ClientError> {
        let request = ManagementRequest::UpdateHostModel(updates);
        match self.exchange(&request)? {
            ManagementResponse::UpdateHostModel(responses) => Ok(responses),
            other => Err(mismatch(&request, &other)),
        }
    }

    /// Applies updates to `server_name`, returning one response per update.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when the exchange fails.
    pub fn update_server_model(
        &mut self,
        server_name: impl Into<String>,
        updates: Vec<ServerModelUpdate>,
    ) -> Result<Vec<ServerUpdateResponse>, ClientError> {
        let request = ManagementRequest::UpdateServerModel {
            server_name: server_name.into(),
            updates,
        };
        match self.exchange(&request)? {
            ManagementResponse::UpdateServerModel(responses) => Ok(responses),
            other => Err(mismatch(&request, &other)),
        }
    }

    /// Checks that the server manager answers on this connection.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when the exchange fails.
    pub fn is_active(&mut self) -> Result<(), ClientError> {
        self.exchange(&ManagementRequest::IsActive).map(drop)
    }

    /// Releases the underlying halves.
    ///
    /// # Errors
    ///
    /// Returns an error when buffered request bytes cannot be flushed.
    pub fn into_inner(self) -> io::Result<(R, W)> {
        let reader = self.reader.into_inner().into_inner();
        let writer = self
            .writer
            .into_inner()
            .into_inner()
            .map_err(io::IntoInnerError::into_error)?;
        Ok((reader, writer))
    }

    fn exchange(&mut self, request: &ManagementRequest) -> Result<ManagementResponse, ClientError> {
        let command = request.command();
        debug!(target: CLIENT_TARGET, %command, "sending request");
        request
            .write(&mut self.writer)
            .and_then(|()| self.writer.flush())
            .map_err(|source| ClientError::Send { command, source })?;
        ManagementResponse::read(command, &mut self.reader)
            .map_err(|source| ClientError::Receive { command, source })
    }
}

fn mismatch(request: &ManagementRequest, response: &ManagementResponse) -> ClientError {
    ClientError::MismatchedResponse {
        expected: request.command(),
        actual: response.command(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::FramingError;
    use crate::command::tags;
    use crate::model::{ModelUpdateResponse, ServerUpdateOutcome};

    fn scripted(response: &ManagementResponse) -> ManagementClient<Cursor<Vec<u8>>, Vec<u8>> {
        let mut writer = FrameWriter::new(Vec::new());
        response.write(&mut writer).expect("encode response");
        ManagementClient::new(Cursor::new(writer.into_inner()), Vec::new())
    }

    #[test]
    fn is_active_sends_header_and_accepts_ack() {
        let mut client = scripted(&ManagementResponse::IsActive);
        client.is_active().expect("ack");
        let (_, sent) = client.into_inner().expect("release");
        assert_eq!(
            sent,
            vec![
                tags::REQUEST_OPERATION,
                ManagementCommand::IsActive.request_code()
            ]
        );
    }

    #[test]
    fn server_updates_return_decoded_responses() {
        let expected = vec![ModelUpdateResponse::Success(ServerUpdateOutcome {
            previous: Some("8080".to_owned()),
        })];
        let mut client = scripted(&ManagementResponse::UpdateServerModel(expected.clone()));
        let responses = client
            .update_server_model(
                "srv1",
                vec![ServerModelUpdate::SetProperty {
                    name: "port".to_owned(),
                    value: "9090".to_owned(),
                }],
            )
            .expect("exchange");
        assert_eq!(responses, expected);
    }

    #[test]
    fn wrong_response_code_is_a_receive_error() {
        let mut client = scripted(&ManagementResponse::IsActive);
        let error = client
            .update_full_domain(DomainModel::default())
            .expect_err("mismatched code");
        assert!(matches!(
            error,
            ClientError::Receive {
                command: ManagementCommand::UpdateFullDomain,
                source: FrameError::Framing(FramingError::UnexpectedTag { .. }),
            }
        ));
    }

    #[test]
    fn closed_stream_is_reported_as_truncation() {
        let mut client = ManagementClient::new(Cursor::new(Vec::new()), Vec::new());
        let error = client.is_active().expect_err("no response");
        assert!(matches!(
            error,
            ClientError::Receive {
                source: FrameError::Framing(FramingError::Truncated { .. }),
                ..
            }
        ));
    }
}
