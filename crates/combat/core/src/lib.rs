//! Deterministic combat-effects resolution.
//!
//! `combat-core` decides whether a power may be activated
//! ([`activation::can_activate_power`]), snapshots everything a power needs into
//! a [`PowerPayload`], calculates one [`PowerResults`] per affected target, and
//! maintains each target's [`ConditionCollection`] of stacking status effects.
//!
//! The crate performs no I/O and never blocks. Catalogs, curves, combat
//! formulas, entity lookup and randomness are injected through [`env::Env`].
pub mod activation;
pub mod condition;
pub mod config;
pub mod env;
pub mod error;
pub mod formula;
pub mod payload;
pub mod power;
pub mod property;
pub mod results;
pub mod state;

pub use activation::{
    ActivationFlags, ActivationRequest, InPositionResult, PowerUseResult, can_activate_power,
    is_in_position_for_power,
};
pub use condition::{
    ApplyReport, Condition, ConditionCollection, ConditionDefinition, ConditionError,
    ConditionFlags, ConditionScope, ConditionType, PendingCondition, RemovalFilter, StackId,
    StackingBehavior, StackingStyle,
};
pub use config::CombatConfig;
pub use env::{
    CombatEntity, CombatEnv, CombatFormulas, DefinitionCatalog, DefinitionOracle, Env,
    OracleError, PcgRng, RngOracle, SandboxEntity, SandboxWorld, StandardFormulas, WorldOracle,
};
pub use error::{CombatError, ErrorContext, ErrorSeverity};
pub use formula::{Curve, CurveOracle, CurveTable, Formula, FormulaError, PropertyFormula};
pub use payload::{PayloadError, PowerPayload};
pub use power::{
    ActivationType, ConditionRef, PowerApplication, PowerCollection, PowerDefinition,
    PowerFlags, PowerInstance, TargetingStyle,
};
pub use property::{DamageType, ManaType, PropertyCollection, PropertyId, PropertyKey};
pub use results::{PowerResults, ResultFlags};
pub use state::{
    AllianceId, ConditionDefId, ConditionId, CurveId, EntityId, KeywordId, KeywordSet, PowerId,
    Rank, RegionId, TimeMs, Vector3,
};
