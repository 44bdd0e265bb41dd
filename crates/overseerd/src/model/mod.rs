//! Managed configuration models and the seam operations mutate them through.

mod errors;
mod managed;

use overseer_protocol::{
    DomainModel, DomainModelUpdate, HostModelUpdate, ServerIdentity, ServerModelUpdate,
    ServerUpdateOutcome,
};

pub use self::errors::ModelError;
pub use self::managed::ManagedModels;

const MODEL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::model");

/// Applies controller-issued changes to the managed models.
///
/// Implementations are shared between connection threads and must serialise
/// their own mutation.
pub trait ModelMutator: Send + Sync {
    /// Replaces the domain model wholesale.
    fn set_domain(&self, model: DomainModel) -> Result<(), ModelError>;

    /// Applies one domain update, returning the servers it affects.
    fn apply_domain_update(
        &self,
        update: DomainModelUpdate,
    ) -> Result<Vec<ServerIdentity>, ModelError>;

    /// Applies one host update, returning the servers it affects.
    fn apply_host_update(&self, update: HostModelUpdate) -> Result<Vec<ServerIdentity>, ModelError>;

    /// Applies one update to the named server.
    fn apply_server_update(
        &self,
        server_name: &str,
        update: ServerModelUpdate,
    ) -> Result<ServerUpdateOutcome, ModelError>;
}
