//! Managed configuration models, updates and per-update responses.
//!
//! Every type here travels as an opaque frame field. Enums carry a serde
//! `kind` tag, so each update or response variant has an explicit encoding.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain-wide configuration installed by the controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainModel {
    /// Domain-wide system properties.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// Server groups keyed by name.
    #[serde(default)]
    pub server_groups: BTreeMap<String, ServerGroup>,
}

/// A named set of servers sharing one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerGroup {
    /// Profile applied to every server of the group.
    pub profile: String,
}

/// Identifies one server instance affected by an update.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServerIdentity {
    /// Host running the server.
    pub host_name: String,
    /// Group the server belongs to.
    pub server_group: String,
    /// Server name, unique within the host.
    pub server_name: String,
}

impl fmt::Display for ServerIdentity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{}/{}/{}",
            self.host_name, self.server_group, self.server_name
        )
    }
}

/// One change to the domain model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainModelUpdate {
    /// Defines or replaces a domain property.
    SetProperty {
        /// Property name.
        name: String,
        /// New value.
        value: String,
    },
    /// Removes a domain property.
    RemoveProperty {
        /// Property name.
        name: String,
    },
    /// Adds a server group.
    AddServerGroup {
        /// Group name.
        name: String,
        /// Profile applied to the group.
        profile: String,
    },
    /// Removes an unused server group.
    RemoveServerGroup {
        /// Group name.
        name: String,
    },
}

/// One change to the host model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostModelUpdate {
    /// Defines or replaces a host property.
    SetProperty {
        /// Property name.
        name: String,
        /// New value.
        value: String,
    },
    /// Removes a host property.
    RemoveProperty {
        /// Property name.
        name: String,
    },
    /// Declares a server on this host.
    AddServer {
        /// Server name.
        name: String,
        /// Server group the server joins.
        group: String,
    },
    /// Removes a server from this host.
    RemoveServer {
        /// Server name.
        name: String,
    },
}

/// One change to a single server's model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServerModelUpdate {
    /// Defines or replaces a server property.
    SetProperty {
        /// Property name.
        name: String,
        /// New value.
        value: String,
    },
    /// Removes a server property.
    RemoveProperty {
        /// Property name.
        name: String,
    },
}

/// Result of a successfully applied server update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerUpdateOutcome {
    /// Value replaced or removed by the update, if any.
    pub previous: Option<String>,
}

/// A rejected update, as reported back to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("update failed: {message}")]
pub struct UpdateFailure {
    /// Human-readable reason.
    pub message: String,
    /// Description of the underlying cause, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl UpdateFailure {
    /// Builds a failure without a cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Attaches a cause description.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

/// Outcome of one update within a batch.
///
/// Either the value produced by applying the update, or the captured
/// failure; never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum ModelUpdateResponse<T> {
    /// The update was applied.
    Success(T),
    /// The update was rejected.
    Failed(UpdateFailure),
}

impl<T> ModelUpdateResponse<T> {
    /// Returns `true` when the update was applied.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the success value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failed(_) => None,
        }
    }

    /// Returns the captured failure, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&UpdateFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }
}

impl<T> From<Result<T, UpdateFailure>> for ModelUpdateResponse<T> {
    fn from(result: Result<T, UpdateFailure>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(failure) => Self::Failed(failure),
        }
    }
}

/// Per-update response of domain and host batches: the affected servers.
pub type ServerIdentityResponse = ModelUpdateResponse<Vec<ServerIdentity>>;

/// Per-update response of server batches.
pub type ServerUpdateResponse = ModelUpdateResponse<ServerUpdateOutcome>;
