//! Wire tags and command codes of the management protocol.
//!
//! Every field on the wire is preceded by one of the [`tags`]. The command
//! byte that follows [`tags::REQUEST_OPERATION`] selects a
//! [`ManagementCommand`]; each command answers with its own response code.

use std::fmt;

/// Field tags.
pub mod tags {
    /// Starts every request; followed by the command byte.
    pub const REQUEST_OPERATION: u8 = 0x10;
    /// Precedes an opaque domain model.
    pub const PARAM_DOMAIN_MODEL: u8 = 0x20;
    /// Precedes the number of domain model updates.
    pub const PARAM_DOMAIN_MODEL_UPDATE_COUNT: u8 = 0x21;
    /// Precedes one opaque domain model update.
    pub const PARAM_DOMAIN_MODEL_UPDATE: u8 = 0x22;
    /// Precedes the number of host model updates.
    pub const PARAM_HOST_MODEL_UPDATE_COUNT: u8 = 0x23;
    /// Precedes one opaque host model update.
    pub const PARAM_HOST_MODEL_UPDATE: u8 = 0x24;
    /// Precedes the name of the targeted server.
    pub const PARAM_SERVER_NAME: u8 = 0x25;
    /// Precedes the number of server model updates.
    pub const PARAM_SERVER_MODEL_UPDATE_COUNT: u8 = 0x26;
    /// Precedes one opaque server model update.
    pub const PARAM_SERVER_MODEL_UPDATE: u8 = 0x27;
    /// Precedes the number of per-update responses.
    pub const PARAM_MODEL_UPDATE_RESPONSE_COUNT: u8 = 0x28;
    /// Precedes one opaque per-update response.
    pub const PARAM_MODEL_UPDATE_RESPONSE: u8 = 0x29;
}

/// Commands understood by the server manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagementCommand {
    /// Replace the whole domain model.
    UpdateFullDomain,
    /// Apply a batch of domain-scoped updates.
    UpdateDomainModel,
    /// Apply a batch of host-scoped updates.
    UpdateHostModel,
    /// Apply a batch of updates to one server.
    UpdateServerModel,
    /// Liveness check of the control channel.
    IsActive,
}

impl ManagementCommand {
    /// Every command, in registry order.
    pub const ALL: [Self; 5] = [
        Self::UpdateFullDomain,
        Self::UpdateDomainModel,
        Self::UpdateHostModel,
        Self::UpdateServerModel,
        Self::IsActive,
    ];

    /// Byte sent by the controller to request this command.
    #[must_use]
    pub const fn request_code(self) -> u8 {
        match self {
            Self::UpdateFullDomain => 0x40,
            Self::UpdateDomainModel => 0x42,
            Self::UpdateHostModel => 0x44,
            Self::UpdateServerModel => 0x46,
            Self::IsActive => 0x48,
        }
    }

    /// Byte that opens the response to this command.
    #[must_use]
    pub const fn response_code(self) -> u8 {
        match self {
            Self::UpdateFullDomain => 0x41,
            Self::UpdateDomainModel => 0x43,
            Self::UpdateHostModel => 0x45,
            Self::UpdateServerModel => 0x47,
            Self::IsActive => 0x49,
        }
    }

    /// Resolves a request code, returning `None` for unregistered bytes.
    #[must_use]
    pub fn from_request_code(code: u8) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|command| command.request_code() == code)
    }

    /// Canonical name used in logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UpdateFullDomain => "update-full-domain",
            Self::UpdateDomainModel => "update-domain-model",
            Self::UpdateHostModel => "update-host-model",
            Self::UpdateServerModel => "update-server-model",
            Self::IsActive => "is-active",
        }
    }
}

impl fmt::Display for ManagementCommand {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
