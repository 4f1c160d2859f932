//! Per-target outcome of a power.
//!
//! [`PowerResults`] is the contract handed to the entity-mutation layer: it
//! applies health and resource deltas itself and passes the condition lists to
//! the target's [`crate::ConditionCollection::apply_results`].

use bitflags::bitflags;
use strum::EnumCount;

use crate::condition::{ConditionRefresh, PendingCondition};
use crate::property::{DamageType, ManaType, PropertyCollection};
use crate::state::{ConditionId, EntityId, PowerId, Vector3};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(
        feature = "serde",
        derive(serde::Serialize, serde::Deserialize),
        serde(transparent)
    )]
    pub struct ResultFlags: u8 {
        const CRITICAL       = 1 << 0;
        const SUPER_CRITICAL = 1 << 1;
        const DODGED         = 1 << 2;
        const RESISTED       = 1 << 3;
        /// Results were calculated for the power's user.
        const SELF_RESULTS   = 1 << 4;
    }
}

/// Knockback to apply to the target.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KnockbackResult {
    /// Point the target is pushed away from.
    pub source: Vector3,
    pub distance: f32,
    pub duration_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerResults {
    pub power: PowerId,
    pub owner: EntityId,
    pub ultimate_owner: EntityId,
    pub target: EntityId,
    pub position: Vector3,
    pub is_hostile: bool,
    pub flags: ResultFlags,

    /// Damage per [`DamageType`], after dynamic level scaling.
    pub damage: [f32; DamageType::COUNT],
    /// Damage before dynamic level scaling, for client display.
    pub damage_for_client: [f32; DamageType::COUNT],
    pub healing: f32,
    /// Per [`ManaType`].
    pub endurance_change: [f32; ManaType::COUNT],
    pub secondary_resource_change: f32,

    pub conditions_to_remove: Vec<ConditionId>,
    pub conditions_to_refresh: Vec<ConditionRefresh>,
    pub conditions_to_add: Vec<PendingCondition>,
    pub knockback: Option<KnockbackResult>,

    /// Pass-through properties (creator asset, loot and reward flags ...).
    pub properties: PropertyCollection,
}

impl PowerResults {
    pub fn new(power: PowerId, owner: EntityId, ultimate_owner: EntityId, target: EntityId) -> Self {
        Self {
            power,
            owner,
            ultimate_owner,
            target,
            position: Vector3::ZERO,
            is_hostile: false,
            flags: ResultFlags::empty(),
            damage: [0.0; DamageType::COUNT],
            damage_for_client: [0.0; DamageType::COUNT],
            healing: 0.0,
            endurance_change: [0.0; ManaType::COUNT],
            secondary_resource_change: 0.0,
            conditions_to_remove: Vec::new(),
            conditions_to_refresh: Vec::new(),
            conditions_to_add: Vec::new(),
            knockback: None,
            properties: PropertyCollection::new(),
        }
    }

    pub fn damage_of(&self, damage_type: DamageType) -> f32 {
        self.damage[damage_type.index()]
    }

    pub fn total_damage(&self) -> f32 {
        self.damage.iter().sum()
    }

    pub fn is_critical(&self) -> bool {
        self.flags.contains(ResultFlags::CRITICAL)
    }

    pub fn is_dodged(&self) -> bool {
        self.flags.contains(ResultFlags::DODGED)
    }

    /// True when nothing would change on the target.
    pub fn is_empty(&self) -> bool {
        self.total_damage() == 0.0
            && self.healing == 0.0
            && self.endurance_change.iter().all(|v| *v == 0.0)
            && self.secondary_resource_change == 0.0
            && self.conditions_to_remove.is_empty()
            && self.conditions_to_refresh.is_empty()
            && self.conditions_to_add.is_empty()
            && self.knockback.is_none()
    }
}
