use crate::error::{CombatError, ErrorSeverity};
use crate::state::{ConditionId, EntityId};

use super::stack::StackId;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    #[error("condition {id} not found on {owner}")]
    NotFound { owner: EntityId, id: ConditionId },

    #[error("condition {0} already present")]
    DuplicateId(ConditionId),

    #[error("stack {stack:?} already holds {live} of at most {max} stacks")]
    StackCapExceeded { stack: StackId, live: u32, max: u32 },
}

impl CombatError for ConditionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound { .. } => ErrorSeverity::Recoverable,
            Self::DuplicateId(_) | Self::StackCapExceeded { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "CONDITION_NOT_FOUND",
            Self::DuplicateId(_) => "CONDITION_DUPLICATE_ID",
            Self::StackCapExceeded { .. } => "CONDITION_STACK_CAP_EXCEEDED",
        }
    }
}
