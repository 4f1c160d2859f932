use crate::env::OracleError;
use crate::error::{CombatError, ErrorContext, ErrorSeverity};
use crate::state::{EntityId, PowerId};

/// Failure to build or evaluate a payload.
///
/// Returned at the boundary of `init`, the initial calculation and one
/// target's results; a failing target never aborts the other targets.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("owner {0} not found")]
    OwnerNotFound(EntityId),

    #[error("no property source {source_entity} for power {power}")]
    NoPropertySource {
        power: PowerId,
        source_entity: EntityId,
    },

    #[error("target {0} not found")]
    TargetNotFound(EntityId),

    #[error("initial properties of power {0} not calculated")]
    NotCalculated(PowerId),

    #[error("power {0} has no bounces remaining")]
    NoBouncesRemaining(PowerId),

    #[error("{context:?}: {source}")]
    WithContext {
        source: Box<PayloadError>,
        context: ErrorContext,
    },
}

impl PayloadError {
    pub fn with_context(self, context: ErrorContext) -> Self {
        Self::WithContext {
            source: Box::new(self),
            context,
        }
    }
}

impl CombatError for PayloadError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Oracle(error) => error.severity(),
            Self::OwnerNotFound(_) | Self::TargetNotFound(_) => ErrorSeverity::Recoverable,
            Self::NoPropertySource { .. } | Self::NotCalculated(_) => ErrorSeverity::Internal,
            Self::NoBouncesRemaining(_) => ErrorSeverity::Validation,
            Self::WithContext { source, .. } => source.severity(),
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Oracle(error) => error.error_code(),
            Self::OwnerNotFound(_) => "PAYLOAD_OWNER_NOT_FOUND",
            Self::NoPropertySource { .. } => "PAYLOAD_NO_PROPERTY_SOURCE",
            Self::TargetNotFound(_) => "PAYLOAD_TARGET_NOT_FOUND",
            Self::NotCalculated(_) => "PAYLOAD_NOT_CALCULATED",
            Self::NoBouncesRemaining(_) => "PAYLOAD_NO_BOUNCES_REMAINING",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }
}
