//! Identifiers and small value types shared across the engine.
mod common;

pub use common::{
    AllianceId, ConditionDefId, ConditionId, CurveId, EntityId, KeywordId, KeywordSet, PowerId,
    Rank, RegionId, TimeMs, Vector3,
};
