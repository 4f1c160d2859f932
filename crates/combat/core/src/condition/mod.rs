//! Conditions: timed, stacking status effects.
//!
//! A [`ConditionDefinition`] is immutable catalog data. Payloads turn it into
//! [`PendingCondition`]s plus stacking decisions; the target's
//! [`ConditionCollection`] then applies them as live [`Condition`]s.
mod collection;
mod definition;
mod error;
mod instance;
mod removal;
mod stack;

pub use collection::{AddedCondition, ApplyReport, ConditionCollection};
pub use definition::{ConditionDefinition, ConditionFlags, ConditionScope, ConditionType};
pub use error::ConditionError;
pub use instance::{Condition, OwnerLink, PendingCondition};
pub use removal::RemovalFilter;
pub use stack::{
    ConditionRefresh, RefreshMode, StackApplicationData, StackEntry, StackId, StackingBehavior,
    StackingStyle, resolve_stacking,
};
