//! Request and response messages, one variant per command.
//!
//! ```text
//! Request:  [REQUEST_OPERATION][command code] <command fields>
//! Response: [response code] <command fields>
//! ```

use std::io::{Read, Write};

use crate::command::{ManagementCommand, tags};
use crate::error::FrameError;
use crate::frame::{FrameReader, FrameWriter};
use crate::model::{
    DomainModel, DomainModelUpdate, HostModelUpdate, ServerIdentityResponse, ServerModelUpdate,
    ServerUpdateResponse,
};

/// A request sent by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagementRequest {
    /// Replace the domain model wholesale.
    UpdateFullDomain(DomainModel),
    /// Apply domain-scoped updates.
    UpdateDomainModel(Vec<DomainModelUpdate>),
    /// Apply host-scoped updates.
    UpdateHostModel(Vec<HostModelUpdate>),
    /// Apply updates to one server.
    UpdateServerModel {
        /// Targeted server.
        server_name: String,
        /// Updates, applied in order.
        updates: Vec<ServerModelUpdate>,
    },
    /// Liveness check.
    IsActive,
}

impl ManagementRequest {
    /// Command selected by this request.
    #[must_use]
    pub const fn command(&self) -> ManagementCommand {
        match self {
            Self::UpdateFullDomain(_) => ManagementCommand::UpdateFullDomain,
            Self::UpdateDomainModel(_) => ManagementCommand::UpdateDomainModel,
            Self::UpdateHostModel(_) => ManagementCommand::UpdateHostModel,
            Self::UpdateServerModel { .. } => ManagementCommand::UpdateServerModel,
            Self::IsActive => ManagementCommand::IsActive,
        }
    }

    /// Reads the fields that follow the command byte of `command`.
    ///
    /// # Errors
    ///
    /// Returns the first framing, decoding or I/O error encountered.
    pub fn read_body<R: Read>(
        command: ManagementCommand,
        reader: &mut FrameReader<R>,
    ) -> Result<Self, FrameError> {
        match command {
            ManagementCommand::UpdateFullDomain => {
                reader.expect_tag(tags::PARAM_DOMAIN_MODEL)?;
                Ok(Self::UpdateFullDomain(reader.read_opaque()?))
            }
            ManagementCommand::UpdateDomainModel => Ok(Self::UpdateDomainModel(
                reader.read_tagged_list(
                    tags::PARAM_DOMAIN_MODEL_UPDATE_COUNT,
                    tags::PARAM_DOMAIN_MODEL_UPDATE,
                )?,
            )),
            ManagementCommand::UpdateHostModel => Ok(Self::UpdateHostModel(
                reader.read_tagged_list(
                    tags::PARAM_HOST_MODEL_UPDATE_COUNT,
                    tags::PARAM_HOST_MODEL_UPDATE,
                )?,
            )),
            ManagementCommand::UpdateServerModel => {
                reader.expect_tag(tags::PARAM_SERVER_NAME)?;
                let server_name = reader.read_utf8()?;
                let updates = reader.read_tagged_list(
                    tags::PARAM_SERVER_MODEL_UPDATE_COUNT,
                    tags::PARAM_SERVER_MODEL_UPDATE,
                )?;
                Ok(Self::UpdateServerModel {
                    server_name,
                    updates,
                })
            }
            ManagementCommand::IsActive => Ok(Self::IsActive),
        }
    }

    /// Writes the complete request, header included.
    ///
    /// # Errors
    ///
    /// Returns the first encoding or I/O error encountered.
    pub fn write<W: Write>(&self, writer: &mut FrameWriter<W>) -> Result<(), FrameError> {
        writer.write_tag(tags::REQUEST_OPERATION)?;
        writer.write_byte(self.command().request_code())?;
        match self {
            Self::UpdateFullDomain(model) => {
                writer.write_tag(tags::PARAM_DOMAIN_MODEL)?;
                writer.write_opaque(model)
            }
            Self::UpdateDomainModel(updates) => writer.write_tagged_list(
                tags::PARAM_DOMAIN_MODEL_UPDATE_COUNT,
                tags::PARAM_DOMAIN_MODEL_UPDATE,
                updates,
            ),
            Self::UpdateHostModel(updates) => writer.write_tagged_list(
                tags::PARAM_HOST_MODEL_UPDATE_COUNT,
                tags::PARAM_HOST_MODEL_UPDATE,
                updates,
            ),
            Self::UpdateServerModel {
                server_name,
                updates,
            } => {
                writer.write_tag(tags::PARAM_SERVER_NAME)?;
                writer.write_utf8(server_name)?;
                writer.write_tagged_list(
                    tags::PARAM_SERVER_MODEL_UPDATE_COUNT,
                    tags::PARAM_SERVER_MODEL_UPDATE,
                    updates,
                )
            }
            Self::IsActive => Ok(()),
        }
    }
}

/// A response returned by the server manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagementResponse {
    /// The domain model was installed.
    UpdateFullDomain,
    /// One response per domain update, in request order.
    UpdateDomainModel(Vec<ServerIdentityResponse>),
    /// One response per host update, in request order.
    UpdateHostModel(Vec<ServerIdentityResponse>),
    /// One response per server update, in request order.
    UpdateServerModel(Vec<ServerUpdateResponse>),
    /// The control channel is alive.
    IsActive,
}

impl ManagementResponse {
    /// Command this response answers.
    #[must_use]
    pub const fn command(&self) -> ManagementCommand {
        match self {
            Self::UpdateFullDomain => ManagementCommand::UpdateFullDomain,
            Self::UpdateDomainModel(_) => ManagementCommand::UpdateDomainModel,
            Self::UpdateHostModel(_) => ManagementCommand::UpdateHostModel,
            Self::UpdateServerModel(_) => ManagementCommand::UpdateServerModel,
            Self::IsActive => ManagementCommand::IsActive,
        }
    }

    /// Writes the response code followed by the response fields.
    ///
    /// # Errors
    ///
    /// Returns the first encoding or I/O error encountered.
    pub fn write<W: Write>(&self, writer: &mut FrameWriter<W>) -> Result<(), FrameError> {
        writer.write_byte(self.command().response_code())?;
        match self {
            Self::UpdateFullDomain | Self::IsActive => Ok(()),
            Self::UpdateDomainModel(responses) | Self::UpdateHostModel(responses) => {
                write_update_responses(writer, responses)
            }
            Self::UpdateServerModel(responses) => write_update_responses(writer, responses),
        }
    }

    /// Reads the response to `command`, starting at the response code.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FramingError::UnexpectedTag`] when the response code
    /// does not belong to `command`, or the first framing, decoding or I/O
    /// error encountered in the fields.
    pub fn read<R: Read>(
        command: ManagementCommand,
        reader: &mut FrameReader<R>,
    ) -> Result<Self, FrameError> {
        reader.expect_tag(command.response_code())?;
        match command {
            ManagementCommand::UpdateFullDomain => Ok(Self::UpdateFullDomain),
            ManagementCommand::UpdateDomainModel => {
                Ok(Self::UpdateDomainModel(read_update_responses(reader)?))
            }
            ManagementCommand::UpdateHostModel => {
                Ok(Self::UpdateHostModel(read_update_responses(reader)?))
            }
            ManagementCommand::UpdateServerModel => {
                Ok(Self::UpdateServerModel(read_update_responses(reader)?))
            }
            ManagementCommand::IsActive => Ok(Self::IsActive),
        }
    }
}

fn write_update_responses<W: Write, T: serde::Serialize>(
    writer: &mut FrameWriter<W>,
    responses: &[T],
) -> Result<(), FrameError> {
    writer.write_tagged_list(
        tags::PARAM_MODEL_UPDATE_RESPONSE_COUNT,
        tags::PARAM_MODEL_UPDATE_RESPONSE,
        responses,
    )
}

fn read_update_responses<R: Read, T: serde::de::DeserializeOwned>(
    reader: &mut FrameReader<R>,
) -> Result<Vec<T>, FrameError> {
    reader.read_tagged_list(
        tags::PARAM_MODEL_UPDATE_RESPONSE_COUNT,
        tags::PARAM_MODEL_UPDATE_RESPONSE,
    )
}
