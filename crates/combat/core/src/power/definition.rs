use bitflags::bitflags;

use crate::condition::{ConditionDefinition, RemovalFilter};
use crate::env::PathFlags;
use crate::formula::{Formula, PropertyFormula};
use crate::property::{DamageType, ManaType, PropertyKey};
use crate::state::{ConditionDefId, KeywordId, KeywordSet, PowerId, RegionId};

// ============================================================================
// Targeting and activation
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetingStyle {
    #[default]
    SelfOnly,
    SingleTarget,
    /// Area centered on the target position.
    Area { radius: f32 },
    /// Projectile or beam toward the target.
    Directional { width: f32 },
    /// Area centered on the owner.
    SelfCenteredArea {
        radius: f32,
        /// Range and line of sight to the primary target still apply.
        #[cfg_attr(feature = "serde", serde(default))]
        tracks_primary_target: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActivationType {
    #[default]
    Normal,
    Passive,
    Toggle,
    /// Follow-up activation unlocked by another power.
    ExtraActivation,
}

/// Path used for the line-of-sight check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LosRequirement {
    #[default]
    None,
    Straight,
    /// Projected onto the ground plane.
    Ground,
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(
        feature = "serde",
        derive(serde::Serialize, serde::Deserialize),
        serde(transparent)
    )]
    pub struct PowerFlags: u32 {
        const MELEE                         = 1 << 0;
        const TRAVEL                        = 1 << 1;
        const MOVEMENT                      = 1 << 2;
        const ITEM                          = 1 << 3;
        const COMBO                         = 1 << 4;
        const PROC                          = 1 << 5;
        const CAN_CRIT                      = 1 << 6;
        /// Cannot run alongside another exclusive power.
        const EXCLUSIVE                     = 1 << 7;
        /// May be aimed at the ground with no target; skips the range check then.
        const MOUSE_TARGETED                = 1 << 8;
        /// Movement with a fixed duration; speed derives from distance and time.
        const FIXED_MOVEMENT_DURATION       = 1 << 9;
        const CANCEL_CONDITIONS_ON_END      = 1 << 10;
        const CANCEL_CONDITIONS_ON_UNASSIGN = 1 << 11;
        /// Cannot be dodged.
        const UNAVOIDABLE                   = 1 << 12;
        /// Base healing counts twice.
        const DOUBLE_BASE_HEALING           = 1 << 13;
    }
}

// ============================================================================
// Numeric profiles
// ============================================================================

/// Damage numbers for one damage type.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct DamageProfile {
    pub damage_type: DamageType,
    pub base: f32,
    pub per_level: f32,
    /// Added after every multiplier.
    pub unmodified: f32,
    pub unmodified_per_rank: f32,
    /// Hold-and-release bonus per second held.
    pub per_second_held: f32,
}

impl Default for DamageProfile {
    fn default() -> Self {
        Self {
            damage_type: DamageType::Physical,
            base: 0.0,
            per_level: 0.0,
            unmodified: 0.0,
            unmodified_per_rank: 0.0,
            per_second_held: 0.0,
        }
    }
}

impl DamageProfile {
    pub fn flat(damage_type: DamageType, base: f32) -> Self {
        Self {
            damage_type,
            base,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct HealingProfile {
    pub base: f32,
    /// Usually a level curve lookup.
    pub base_curve: Option<Formula>,
    /// Fraction of the target's max health.
    pub max_health_pct: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceAmount {
    pub mana: ManaType,
    pub amount: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct BounceProfile {
    pub count: u32,
    pub range: f32,
    pub speed: f32,
    /// Bounce targets are not range checked against the owner.
    pub ignore_range_check: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KnockbackProfile {
    pub distance: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SummonProfile {
    pub bounds_radius: f32,
    pub locomotion: PathFlags,
}

/// Condition applied by a power: a catalog reference or an inline definition.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionRef {
    Reference(ConditionDefId),
    Mixin(Box<ConditionDefinition>),
}

impl ConditionRef {
    pub fn id(&self) -> ConditionDefId {
        match self {
            Self::Reference(id) => *id,
            Self::Mixin(definition) => definition.id,
        }
    }
}

/// Trigger-time gate checked against the owner.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActivationRequirement {
    HasConditionKeyword(KeywordId),
    LacksConditionKeyword(KeywordId),
    PropertyAtLeast {
        key: PropertyKey,
        #[cfg_attr(feature = "serde", serde(default))]
        param: u32,
        value: f32,
    },
}

// ============================================================================
// Power Definition
// ============================================================================

/// Immutable, data-driven description of a power.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PowerDefinition {
    pub id: PowerId,
    pub name: String,
    pub targeting: TargetingStyle,
    pub activation: ActivationType,
    pub range: f32,
    pub los: LosRequirement,
    pub keywords: KeywordSet,
    pub flags: PowerFlags,

    pub damage: Vec<DamageProfile>,
    pub healing: HealingProfile,
    /// Symmetric variance applied to base damage and healing.
    pub damage_variance: f32,
    pub tuning_score: f32,
    /// Added to the rolled crit chance.
    pub crit_chance_bonus: f32,
    pub endurance_change: Vec<ResourceAmount>,
    pub secondary_resource_change: f32,
    pub cost: Option<ResourceAmount>,

    pub cooldown_ms: u64,
    /// Also the minimum time between two activations.
    pub animation_ms: u64,
    pub max_held_ms: u64,
    /// Damage multiplier per point of owner attack speed.
    pub attack_speed_damage_factor: f32,

    pub conditions: Vec<ConditionRef>,
    pub removals: Vec<RemovalFilter>,
    pub bounce: Option<BounceProfile>,
    pub knockback: Option<KnockbackProfile>,
    pub movement_speed_override: f32,
    pub summon: Option<SummonProfile>,

    pub requirements: Vec<ActivationRequirement>,
    /// Owner conditions with any of these keywords block activation.
    pub blocking_keywords: KeywordSet,
    pub restricted_regions: Vec<RegionId>,
    /// Power that must have unlocked this one (extra activations).
    pub extra_activation_of: Option<PowerId>,

    /// Evaluated into the payload at init.
    pub properties: Vec<PropertyFormula>,
}

impl Default for PowerDefinition {
    fn default() -> Self {
        Self {
            id: PowerId::default(),
            name: String::new(),
            targeting: TargetingStyle::SingleTarget,
            activation: ActivationType::Normal,
            range: 0.0,
            los: LosRequirement::None,
            keywords: KeywordSet::EMPTY,
            flags: PowerFlags::empty(),
            damage: Vec::new(),
            healing: HealingProfile::default(),
            damage_variance: 0.0,
            tuning_score: 1.0,
            crit_chance_bonus: 0.0,
            endurance_change: Vec::new(),
            secondary_resource_change: 0.0,
            cost: None,
            cooldown_ms: 0,
            animation_ms: 0,
            max_held_ms: 0,
            attack_speed_damage_factor: 0.0,
            conditions: Vec::new(),
            removals: Vec::new(),
            bounce: None,
            knockback: None,
            movement_speed_override: 0.0,
            summon: None,
            requirements: Vec::new(),
            blocking_keywords: KeywordSet::EMPTY,
            restricted_regions: Vec::new(),
            extra_activation_of: None,
            properties: Vec::new(),
        }
    }
}

impl PowerDefinition {
    pub fn new(id: PowerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_targeting(mut self, targeting: TargetingStyle) -> Self {
        self.targeting = targeting;
        self
    }

    pub fn with_activation(mut self, activation: ActivationType) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    pub fn with_los(mut self, los: LosRequirement) -> Self {
        self.los = los;
        self
    }

    pub fn with_keywords(mut self, keywords: KeywordSet) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_flags(mut self, flags: PowerFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_damage(mut self, damage: DamageProfile) -> Self {
        self.damage.push(damage);
        self
    }

    pub fn with_healing(mut self, healing: HealingProfile) -> Self {
        self.healing = healing;
        self
    }

    pub fn with_variance(mut self, variance: f32) -> Self {
        self.damage_variance = variance;
        self
    }

    pub fn with_cost(mut self, mana: ManaType, amount: f32) -> Self {
        self.cost = Some(ResourceAmount { mana, amount });
        self
    }

    pub fn with_cooldown(mut self, cooldown_ms: u64) -> Self {
        self.cooldown_ms = cooldown_ms;
        self
    }

    pub fn with_animation(mut self, animation_ms: u64) -> Self {
        self.animation_ms = animation_ms;
        self
    }

    pub fn with_condition(mut self, condition: ConditionRef) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_removal(mut self, removal: RemovalFilter) -> Self {
        self.removals.push(removal);
        self
    }

    pub fn with_bounce(mut self, bounce: BounceProfile) -> Self {
        self.bounce = Some(bounce);
        self
    }

    pub fn with_knockback(mut self, distance: f32, speed: f32) -> Self {
        self.knockback = Some(KnockbackProfile { distance });
        self.movement_speed_override = speed;
        self
    }

    pub fn with_summon(mut self, summon: SummonProfile) -> Self {
        self.summon = Some(summon);
        self
    }

    pub fn with_requirement(mut self, requirement: ActivationRequirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub fn with_property(mut self, property: PropertyFormula) -> Self {
        self.properties.push(property);
        self
    }

    pub fn has(&self, flags: PowerFlags) -> bool {
        self.flags.contains(flags)
    }

    pub fn is_self_targeted(&self) -> bool {
        matches!(self.targeting, TargetingStyle::SelfOnly)
    }

    pub fn is_passive(&self) -> bool {
        self.activation == ActivationType::Passive
    }

    pub fn is_toggle(&self) -> bool {
        self.activation == ActivationType::Toggle
    }

    /// Inline condition definitions carried by this power.
    pub fn mixins(&self) -> impl Iterator<Item = &ConditionDefinition> {
        self.conditions.iter().filter_map(|condition| match condition {
            ConditionRef::Mixin(definition) => Some(definition.as_ref()),
            ConditionRef::Reference(_) => None,
        })
    }
}
