//! Per-request operation state machine.

use std::io::Read;
use std::mem;

use tracing::debug;

use overseer_protocol::{FrameReader, ManagementCommand, ManagementRequest, ManagementResponse};

use super::MANAGEMENT_TARGET;
use super::batch::process_batch;
use super::errors::{OperationError, OperationPhase};
use super::output::MessageOutput;
use crate::model::{ModelError, ModelMutator};

#[derive(Debug)]
enum OperationState {
    New,
    RequestRead(ManagementRequest),
    ResponseSent,
}

impl OperationState {
    const fn phase(&self) -> OperationPhase {
        match self {
            Self::New => OperationPhase::New,
            Self::RequestRead(_) => OperationPhase::RequestRead,
            Self::ResponseSent => OperationPhase::ResponseSent,
        }
    }
}

/// Handles one request for one command.
///
/// Operations move `New → RequestRead → ResponseSent` and are never reused.
#[derive(Debug)]
pub(crate) struct Operation {
    command: ManagementCommand,
    state: OperationState,
}

impl Operation {
    pub(crate) const fn new(command: ManagementCommand) -> Self {
        Self {
            command,
            state: OperationState::New,
        }
    }

    pub(crate) const fn command(&self) -> ManagementCommand {
        self.command
    }

    pub(crate) const fn request_code(&self) -> u8 {
        self.command.request_code()
    }

    pub(crate) const fn response_code(&self) -> u8 {
        self.command.response_code()
    }

    pub(crate) const fn phase(&self) -> OperationPhase {
        self.state.phase()
    }

    /// Reads the rest of the request, up to the end of the message.
    pub(crate) fn read_request<R: Read>(
        &mut self,
        input: &mut FrameReader<R>,
    ) -> Result<(), OperationError> {
        self.require(OperationPhase::New)?;
        let request = ManagementRequest::read_body(self.command, input)?;
        self.state = OperationState::RequestRead(request);
        Ok(())
    }

    /// Executes the request against `models` and commits the response.
    ///
    /// Nothing is written unless every step succeeds.
    pub(crate) fn send_response(
        &mut self,
        mut output: MessageOutput<'_>,
        models: &dyn ModelMutator,
    ) -> Result<(), OperationError> {
        let request = match mem::replace(&mut self.state, OperationState::ResponseSent) {
            OperationState::RequestRead(request) => request,
            other => {
                self.state = other;
                return Err(self.out_of_order(OperationPhase::RequestRead));
            }
        };
        let response = execute(self.command, request, models)?;
        response.write(output.writer())?;
        output.commit()?;
        debug!(
            target: MANAGEMENT_TARGET,
            command = %self.command,
            response_code = self.response_code(),
            "response sent"
        );
        Ok(())
    }

    /// Runs both steps in order.
    pub(crate) fn handle<R: Read>(
        mut self,
        input: &mut FrameReader<R>,
        output: MessageOutput<'_>,
        models: &dyn ModelMutator,
    ) -> Result<(), OperationError> {
        self.read_request(input)?;
        self.send_response(output, models)
    }

    fn require(&self, expected: OperationPhase) -> Result<(), OperationError> {
        if self.phase() == expected {
            Ok(())
        } else {
            Err(self.out_of_order(expected))
        }
    }

    const fn out_of_order(&self, expected: OperationPhase) -> OperationError {
        OperationError::OutOfOrder {
            expected,
            actual: self.phase(),
        }
    }
}

fn execute(
    command: ManagementCommand,
    request: ManagementRequest,
    models: &dyn ModelMutator,
) -> Result<ManagementResponse, ModelError> {
    let response = match request {
        ManagementRequest::UpdateFullDomain(model) => {
            models.set_domain(model)?;
            ManagementResponse::UpdateFullDomain
        }
        ManagementRequest::UpdateDomainModel(updates) => ManagementResponse::UpdateDomainModel(
            process_batch(command, updates, |update| models.apply_domain_update(update))?,
        ),
        ManagementRequest::UpdateHostModel(updates) => ManagementResponse::UpdateHostModel(
            process_batch(command, updates, |update| models.apply_host_update(update))?,
        ),
        ManagementRequest::UpdateServerModel {
            server_name,
            updates,
        } => ManagementResponse::UpdateServerModel(process_batch(command, updates, |update| {
            models.apply_server_update(&server_name, update)
        })?),
        ManagementRequest::IsActive => ManagementResponse::IsActive,
    };
    Ok(response)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use overseer_protocol::{FrameWriter, ServerModelUpdate, tags};

    use super::*;
    use crate::model::ManagedModels;
    use crate::transport::RecordingConnection;

    fn server_request_body(server: &str) -> Cursor<Vec<u8>> {
        let mut writer = FrameWriter::new(Vec::new());
        writer.write_tag(tags::PARAM_SERVER_NAME).expect("tag");
        writer.write_utf8(server).expect("name");
        writer
            .write_tagged_list::<ServerModelUpdate>(
                tags::PARAM_SERVER_MODEL_UPDATE_COUNT,
                tags::PARAM_SERVER_MODEL_UPDATE,
                &[],
            )
            .expect("updates");
        Cursor::new(writer.into_inner())
    }

    #[test]
    fn operation_walks_through_every_phase() {
        let models = ManagedModels::new("local");
        let mut connection = RecordingConnection::default();
        let mut operation = Operation::new(ManagementCommand::UpdateServerModel);
        let mut input = FrameReader::new(server_request_body("srv1"));

        operation.read_request(&mut input).expect("read request");
        assert_eq!(operation.phase(), OperationPhase::RequestRead);

        operation
            .send_response(MessageOutput::new(&mut connection), &models)
            .expect("send response");
        assert_eq!(operation.phase(), OperationPhase::ResponseSent);
        assert_eq!(
            connection.sent_bytes(),
            vec![0x47, tags::PARAM_MODEL_UPDATE_RESPONSE_COUNT, 0, 0, 0, 0]
        );
    }

    #[test]
    fn responding_before_reading_is_out_of_order() {
        let models = ManagedModels::new("local");
        let mut connection = RecordingConnection::default();
        let mut operation = Operation::new(ManagementCommand::IsActive);

        let error = operation
            .send_response(MessageOutput::new(&mut connection), &models)
            .expect_err("no request read");
        assert!(matches!(
            error,
            OperationError::OutOfOrder {
                expected: OperationPhase::RequestRead,
                actual: OperationPhase::New,
            }
        ));
        assert!(connection.messages.is_empty());
    }

    #[test]
    fn requests_are_read_once() {
        let mut operation = Operation::new(ManagementCommand::IsActive);
        let mut input = FrameReader::new(Cursor::new(Vec::new()));
        operation.read_request(&mut input).expect("first read");
        let error = operation
            .read_request(&mut input)
            .expect_err("second read");
        assert!(matches!(
            error,
            OperationError::OutOfOrder {
                expected: OperationPhase::New,
                actual: OperationPhase::RequestRead,
            }
        ));
    }

    #[test]
    fn is_active_responds_with_its_code_only() {
        let models = ManagedModels::new("local");
        let mut connection = RecordingConnection::default();
        let mut input = FrameReader::new(Cursor::new(Vec::new()));

        Operation::new(ManagementCommand::IsActive)
            .handle(&mut input, MessageOutput::new(&mut connection), &models)
            .expect("handle");
        assert_eq!(connection.sent_bytes(), vec![0x49]);
    }
}
