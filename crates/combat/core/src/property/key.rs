//! Property keys read by the combat engine.

/// Damage channel. Per-type properties use the type index as their parameter;
/// [`DamageType::ANY_PARAM`] addresses the "any type" variant.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DamageType {
    Physical = 0,
    Energy = 1,
    Mental = 2,
}

impl DamageType {
    pub const ANY_PARAM: u32 = 3;

    pub const fn param(self) -> u32 {
        self as u32
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Primary resource pools (endurance).
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ManaType {
    #[default]
    Primary = 0,
    Alternate = 1,
}

impl ManaType {
    pub const fn param(self) -> u32 {
        self as u32
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Enumerated property key. The meaning of the parameter is noted per key.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyKey {
    // ----- entity state -----
    CombatLevel,
    CharacterLevel,
    HealthMax,
    /// param: mana type
    Endurance,

    // ----- damage base -----
    /// param: damage type
    DamageBase,
    DamageBaseBonus,
    /// param: damage type
    DamageBasePerLevel,
    /// param: damage type
    DamageBaseUnmodified,
    /// param: damage type
    DamageBaseUnmodifiedPerRank,
    /// param: damage type
    DamageBasePerSecondHeld,
    DamageVariance,
    DamageTuningScore,

    // ----- damage bonuses -----
    /// param: damage type or any
    DamageMult,
    /// param: power id
    DamageMultForPower,
    /// param: keyword
    DamageMultForKeyword,
    /// param: damage type or any
    DamagePct,
    DamagePctBonus,
    /// param: power id
    DamagePctBonusForPower,
    /// param: keyword
    DamagePctBonusForKeyword,
    /// param: damage type or any
    DamageRating,
    /// param: power id
    DamageRatingBonusForPower,
    /// param: keyword
    DamageRatingBonusForKeyword,
    /// param: keyword; rating added per power of that keyword on cooldown
    DamageRatingPerKeywordCooldown,
    AttackSpeedPct,
    DamagePctVsBoss,
    DamageRatingVsBoss,
    TeamUpDamageScalar,

    // ----- damage penalties -----
    WeakenPct,
    /// param: keyword
    WeakenPctForKeyword,

    // ----- crit -----
    CritRating,
    /// param: keyword
    CritRatingBonusForKeyword,
    SuperCritRating,
    CritDamageRating,
    /// param: keyword; attacker always crits with powers carrying it
    CritAlwaysOnKeywordAttack,
    /// param: keyword; defender is always crit by powers carrying it
    CritAlwaysOnGotHitKeyword,
    /// Crit chance defense on the target.
    CritDefenseRating,
    /// Combat level used for crit math when a player hits scaled content.
    CritLevelOverride,

    // ----- defense -----
    DodgeChancePct,
    MetaGameBossResistance,
    MetaGameBossPenetration,

    // ----- healing -----
    HealingBase,
    HealingBaseCurve,
    HealingMagnitude,
    HealingBasePct,

    // ----- resources -----
    /// param: mana type
    EnduranceChange,
    SecondaryResourceChange,

    // ----- condition resistance and duration -----
    ResistScore,
    ResistScoreNegativeStatus,
    /// param: keyword
    ResistScoreForKeyword,
    /// param: keyword
    ImmuneToConditionKeyword,
    ConditionDurationBonusPct,
    ConditionDurationBonusMs,
    RegionDifficultyTier,

    // ----- movement -----
    MovementSpeedOverride,

    // ----- bounce -----
    BounceCountRemaining,
    BounceRange,
    BounceSpeed,
    BounceIgnoreRangeCheck,
    BounceFirstTarget,

    // ----- pass-through -----
    CreatorEntityAsset,
    CreatorPowerAsset,
    NoExpOnDeath,
    NoLootDrop,
    DestroyOnKill,
    RecursionDepth,
    SummonLifespanOverrideMs,

    // ----- item requirements -----
    ItemLevelRequirement,

    // ----- free-form tags used by condition removal filters -----
    /// param: tag id
    ConditionTag,
}

impl PropertyKey {
    /// Value returned for keys that are not set.
    pub const fn default_real(self) -> f32 {
        match self {
            Self::DamageTuningScore | Self::TeamUpDamageScalar | Self::HealingMagnitude => 1.0,
            _ => 0.0,
        }
    }

    /// Keys copied from the owner into every payload snapshot.
    pub const OWNER_SNAPSHOT: &'static [PropertyKey] = &[
        Self::DamageBaseBonus,
        Self::DamageMult,
        Self::DamageMultForPower,
        Self::DamageMultForKeyword,
        Self::DamagePct,
        Self::DamagePctBonus,
        Self::DamagePctBonusForPower,
        Self::DamagePctBonusForKeyword,
        Self::DamageRating,
        Self::DamageRatingBonusForPower,
        Self::DamageRatingBonusForKeyword,
        Self::DamageRatingPerKeywordCooldown,
        Self::AttackSpeedPct,
        Self::DamagePctVsBoss,
        Self::DamageRatingVsBoss,
        Self::TeamUpDamageScalar,
        Self::WeakenPct,
        Self::WeakenPctForKeyword,
        Self::CritRating,
        Self::CritRatingBonusForKeyword,
        Self::SuperCritRating,
        Self::CritDamageRating,
        Self::CritAlwaysOnKeywordAttack,
        Self::CritLevelOverride,
        Self::MetaGameBossPenetration,
        Self::HealingMagnitude,
        Self::ConditionDurationBonusPct,
        Self::ConditionDurationBonusMs,
        Self::CreatorEntityAsset,
        Self::NoExpOnDeath,
        Self::NoLootDrop,
        Self::DestroyOnKill,
        Self::RecursionDepth,
        Self::SummonLifespanOverrideMs,
    ];
}
