//! Applies update batches one item at a time.

use tracing::{debug, warn};

use overseer_protocol::{ManagementCommand, ModelUpdateResponse};

use super::MANAGEMENT_TARGET;
use crate::model::ModelError;

/// Applies `updates` in order through `apply`.
///
/// A rejected update ([`ModelError::UpdateFailed`]) is recorded in its slot
/// and the batch continues, so the result always has one response per
/// update. Any other error abandons the remaining updates and is returned.
pub(crate) fn process_batch<U, T, F>(
    command: ManagementCommand,
    updates: Vec<U>,
    mut apply: F,
) -> Result<Vec<ModelUpdateResponse<T>>, ModelError>
where
    F: FnMut(U) -> Result<T, ModelError>,
{
    let total = updates.len();
    let mut responses = Vec::with_capacity(total);
    for (index, update) in updates.into_iter().enumerate() {
        match apply(update) {
            Ok(value) => responses.push(ModelUpdateResponse::Success(value)),
            Err(ModelError::UpdateFailed(failure)) => {
                debug!(
                    target: MANAGEMENT_TARGET,
                    %command,
                    index,
                    reason = %failure.message,
                    "update rejected"
                );
                responses.push(ModelUpdateResponse::Failed(failure));
            }
            Err(error) => {
                warn!(
                    target: MANAGEMENT_TARGET,
                    %command,
                    index,
                    total,
                    %error,
                    "batch aborted"
                );
                return Err(error);
            }
        }
    }
    Ok(responses)
}
