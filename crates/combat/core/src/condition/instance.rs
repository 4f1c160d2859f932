use std::sync::Arc;

use super::definition::{ConditionFlags, ConditionType};
use super::stack::{ConditionRefresh, RefreshMode, StackId};
use crate::property::PropertyCollection;
use crate::state::{ConditionDefId, ConditionId, EntityId, KeywordSet, PowerId, TimeMs};

/// Power that created a condition and is responsible for cancelling it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OwnerLink {
    pub owner: EntityId,
    pub power: PowerId,
}

/// A condition decided by a payload but not yet added to a collection.
///
/// One value per stack instance; stacks of one application share `properties`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingCondition {
    pub definition: ConditionDefId,
    pub power: PowerId,
    pub creator: EntityId,
    pub ultimate_creator: EntityId,
    pub stack_id: StackId,
    pub condition_type: ConditionType,
    pub keywords: KeywordSet,
    pub flags: ConditionFlags,
    /// Zero means infinite.
    pub duration_ms: u64,
    pub max_stacks: u32,
    pub properties: Arc<PropertyCollection>,
    pub owner_link: Option<OwnerLink>,
}

/// A live condition inside a [`crate::ConditionCollection`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Condition {
    pub id: ConditionId,
    pub definition: ConditionDefId,
    pub power: PowerId,
    pub creator: EntityId,
    pub ultimate_creator: EntityId,
    pub stack_id: StackId,
    pub condition_type: ConditionType,
    pub keywords: KeywordSet,
    pub flags: ConditionFlags,
    pub start_time: TimeMs,
    /// Zero means infinite.
    pub duration_ms: u64,
    pub properties: Arc<PropertyCollection>,
    pub owner_link: Option<OwnerLink>,
}

impl Condition {
    pub(crate) fn from_pending(id: ConditionId, pending: PendingCondition, now: TimeMs) -> Self {
        Self {
            id,
            definition: pending.definition,
            power: pending.power,
            creator: pending.creator,
            ultimate_creator: pending.ultimate_creator,
            stack_id: pending.stack_id,
            condition_type: pending.condition_type,
            keywords: pending.keywords,
            flags: pending.flags,
            start_time: now,
            duration_ms: pending.duration_ms,
            properties: pending.properties,
            owner_link: pending.owner_link,
        }
    }

    pub fn is_infinite(&self) -> bool {
        self.duration_ms == 0
    }

    pub fn is_negative_status(&self) -> bool {
        self.flags.contains(ConditionFlags::NEGATIVE_STATUS)
    }

    /// Time left at `now`; `None` for infinite conditions.
    pub fn remaining_ms(&self, now: TimeMs) -> Option<u64> {
        if self.is_infinite() {
            None
        } else {
            Some(self.duration_ms.saturating_sub(now.since(self.start_time)))
        }
    }

    pub fn is_expired(&self, now: TimeMs) -> bool {
        self.remaining_ms(now) == Some(0)
    }

    pub(crate) fn apply_refresh(&mut self, refresh: &ConditionRefresh, now: TimeMs) {
        match refresh.mode {
            RefreshMode::Reset => {
                self.start_time = now;
                self.duration_ms = refresh.duration_ms;
            }
            RefreshMode::Extend => {
                if !self.is_infinite() {
                    self.duration_ms = self.duration_ms.saturating_add(refresh.duration_ms);
                }
            }
        }
    }
}
