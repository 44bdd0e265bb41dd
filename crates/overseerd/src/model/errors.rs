//! Failures reported by model mutation.

use overseer_protocol::UpdateFailure;
use thiserror::Error;

/// Errors returned by [`super::ModelMutator`] implementations.
///
/// Only [`ModelError::UpdateFailed`] is an expected outcome: a batch records
/// it against the offending update and carries on. Any other variant aborts
/// the batch.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The update was rejected by the model.
    #[error(transparent)]
    UpdateFailed(#[from] UpdateFailure),
    /// The model store could not be reached.
    #[error("managed model unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
}

impl ModelError {
    /// Builds an [`ModelError::UpdateFailed`] from a rejection message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::UpdateFailed(UpdateFailure::new(message))
    }

    /// Builds an [`ModelError::Unavailable`] error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}
