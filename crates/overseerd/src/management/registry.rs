//! Maps command codes to fresh operations.

use std::collections::HashMap;

use overseer_protocol::ManagementCommand;

use super::errors::DispatchError;
use super::operation::Operation;

/// Command codes the server manager answers.
#[derive(Debug, Clone)]
pub(crate) struct OperationRegistry {
    commands: HashMap<u8, ManagementCommand>,
}

impl OperationRegistry {
    /// Registry of every [`ManagementCommand`].
    pub(crate) fn new() -> Self {
        Self::with_commands(ManagementCommand::ALL)
    }

    /// Registry restricted to `commands`.
    pub(crate) fn with_commands(commands: impl IntoIterator<Item = ManagementCommand>) -> Self {
        Self {
            commands: commands
                .into_iter()
                .map(|command| (command.request_code(), command))
                .collect(),
        }
    }

    /// Creates a new operation for `code`.
    pub(crate) fn operation_for(&self, code: u8) -> Result<Operation, DispatchError> {
        self.commands
            .get(&code)
            .copied()
            .map(Operation::new)
            .ok_or(DispatchError { code })
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
