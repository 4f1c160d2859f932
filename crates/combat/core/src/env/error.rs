//! Oracle access errors.

use crate::error::{CombatError, ErrorSeverity};
use crate::state::{ConditionDefId, EntityId, PowerId};

/// Required collaborator or catalog entry is unavailable.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("DefinitionOracle not available")]
    CatalogNotAvailable,

    #[error("CurveOracle not available")]
    CurvesNotAvailable,

    #[error("CombatFormulas not available")]
    FormulasNotAvailable,

    #[error("WorldOracle not available")]
    WorldNotAvailable,

    #[error("RngOracle not available")]
    RngNotAvailable,

    #[error("power definition {0} not found")]
    PowerNotFound(PowerId),

    #[error("condition definition {0} not found")]
    ConditionNotFound(ConditionDefId),

    #[error("entity {0} not found")]
    EntityNotFound(EntityId),

    #[error("power definition {0} registered twice")]
    DuplicatePower(PowerId),

    #[error("condition definition {0} registered twice")]
    DuplicateCondition(ConditionDefId),
}

impl CombatError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        use OracleError::*;
        match self {
            // Missing oracles are fatal - engine cannot proceed
            CatalogNotAvailable | CurvesNotAvailable | FormulasNotAvailable
            | WorldNotAvailable | RngNotAvailable => ErrorSeverity::Fatal,

            EntityNotFound(_) => ErrorSeverity::Recoverable,

            PowerNotFound(_) | ConditionNotFound(_) | DuplicatePower(_)
            | DuplicateCondition(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            CatalogNotAvailable => "ORACLE_CATALOG_NOT_AVAILABLE",
            CurvesNotAvailable => "ORACLE_CURVES_NOT_AVAILABLE",
            FormulasNotAvailable => "ORACLE_FORMULAS_NOT_AVAILABLE",
            WorldNotAvailable => "ORACLE_WORLD_NOT_AVAILABLE",
            RngNotAvailable => "ORACLE_RNG_NOT_AVAILABLE",
            PowerNotFound(_) => "ORACLE_POWER_NOT_FOUND",
            ConditionNotFound(_) => "ORACLE_CONDITION_NOT_FOUND",
            EntityNotFound(_) => "ORACLE_ENTITY_NOT_FOUND",
            DuplicatePower(_) => "ORACLE_DUPLICATE_POWER",
            DuplicateCondition(_) => "ORACLE_DUPLICATE_CONDITION",
        }
    }
}
