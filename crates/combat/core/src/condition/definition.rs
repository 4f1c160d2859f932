use bitflags::bitflags;

use super::stack::StackingBehavior;
use crate::formula::{Formula, PropertyFormula};
use crate::state::{ConditionDefId, KeywordSet};

/// Who receives a condition applied by a power.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionScope {
    #[default]
    Target,
    User,
}

/// Broad condition category, used by removal filters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionType {
    #[default]
    Status,
    DamageOverTime,
    HealOverTime,
    Boost,
}

bitflags! {
    /// Behavior switches of a condition definition. Serialized as `"A | B"` text.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(
        feature = "serde",
        derive(serde::Serialize, serde::Deserialize),
        serde(transparent)
    )]
    pub struct ConditionFlags: u16 {
        /// Debuff: subject to negative-status resistance, notifies on refresh.
        const NEGATIVE_STATUS       = 1 << 0;
        /// Lasts exactly as long as the knockback it accompanies.
        const KNOCKBACK             = 1 << 1;
        /// Lasts exactly as long as the owner's movement.
        const MOVEMENT              = 1 << 2;
        /// Not lengthened by the owner's duration bonuses.
        const IGNORE_DURATION_BONUS = 1 << 3;
        /// Never shortened by resistance.
        const IGNORE_RESIST         = 1 << 4;
    }
}

impl ConditionFlags {
    /// Duration is dictated by a movement rather than by a formula.
    pub fn is_movement_bound(self) -> bool {
        self.intersects(Self::KNOCKBACK | Self::MOVEMENT)
    }
}

/// Immutable description of a status effect.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ConditionDefinition {
    pub id: ConditionDefId,
    pub name: String,
    pub scope: ConditionScope,
    pub condition_type: ConditionType,
    pub keywords: KeywordSet,
    pub flags: ConditionFlags,
    /// Milliseconds; zero means infinite.
    pub duration_ms: Formula,
    /// Probability in `[0, 1]`.
    pub apply_chance: Formula,
    pub stacking: StackingBehavior,
    /// Evaluated once per application into the condition's own property store.
    pub properties: Vec<PropertyFormula>,
}

impl Default for ConditionDefinition {
    fn default() -> Self {
        Self {
            id: ConditionDefId::default(),
            name: String::new(),
            scope: ConditionScope::Target,
            condition_type: ConditionType::Status,
            keywords: KeywordSet::EMPTY,
            flags: ConditionFlags::empty(),
            duration_ms: Formula::ZERO,
            apply_chance: Formula::ONE,
            stacking: StackingBehavior::default(),
            properties: Vec::new(),
        }
    }
}

impl ConditionDefinition {
    pub fn new(id: ConditionDefId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_scope(mut self, scope: ConditionScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_type(mut self, condition_type: ConditionType) -> Self {
        self.condition_type = condition_type;
        self
    }

    pub fn with_keywords(mut self, keywords: KeywordSet) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_flags(mut self, flags: ConditionFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_duration(mut self, duration_ms: Formula) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_apply_chance(mut self, apply_chance: Formula) -> Self {
        self.apply_chance = apply_chance;
        self
    }

    pub fn with_stacking(mut self, stacking: StackingBehavior) -> Self {
        self.stacking = stacking;
        self
    }

    pub fn with_property(mut self, property: PropertyFormula) -> Self {
        self.properties.push(property);
        self
    }

    pub fn is_negative_status(&self) -> bool {
        self.flags.contains(ConditionFlags::NEGATIVE_STATUS)
    }
}
