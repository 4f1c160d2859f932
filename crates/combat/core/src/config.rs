/// Combat configuration constants and tunable parameters.
///
/// Every field has a default; data files only need to list overrides.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct CombatConfig {
    /// Distance subtracted from a target's bounds radius when offsetting a
    /// directional aim point toward the owner.
    pub aim_padding: f32,

    /// Extra distance allowed on top of a power's range.
    pub range_tolerance: f32,

    /// Added to self-applied movement durations of directly-controlled avatars.
    pub movement_latency_compensation_ms: u64,

    /// Shortest finite duration a resisted condition can end up with.
    pub min_finite_duration_ms: u64,

    /// Chance of a critical hit before rating bonuses, in `[0, 1]`.
    pub base_crit_chance: f32,

    /// Chance of a super-critical once a hit is critical, in `[0, 1]`.
    pub base_super_crit_chance: f32,

    /// Damage multiplier of a critical hit.
    pub crit_damage_multiplier: f32,

    /// Damage multiplier of a super-critical hit.
    pub super_crit_damage_multiplier: f32,

    /// Rating at which a rating converts to +50% (rating / (rating + K)).
    pub rating_scale: f32,

    /// Resist score at which condition durations are halved.
    pub resist_score_constant: f32,

    /// Resist score added per region difficulty tier against player sources.
    pub region_resist_per_tier: f32,

    /// Max health growth per combat level for dynamic level scaling.
    pub health_per_level_factor: f32,

    /// Knockback distance multiplier applied to every target.
    pub knockback_scale: f32,

    /// Accumulate `DamagePctBonus` twice when building damage percentages.
    pub duplicate_damage_pct_bonus: bool,

    /// Trip a debug assertion on fatal-class invariant violations.
    pub strict_invariants: bool,
}

impl CombatConfig {
    // ===== compile-time constants used as capacities =====
    /// Longest owner chain (summon of a summon ...) followed when resolving the ultimate owner.
    pub const MAX_OWNER_CHAIN: usize = 8;
    /// Hard upper bound on stacks under one stack id.
    pub const MAX_STACKS: u32 = 64;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_AIM_PADDING: f32 = 8.0;
    pub const DEFAULT_RANGE_TOLERANCE: f32 = 16.0;
    pub const DEFAULT_MOVEMENT_LATENCY_COMPENSATION_MS: u64 = 150;
    pub const DEFAULT_MIN_FINITE_DURATION_MS: u64 = 1;
    pub const DEFAULT_BASE_CRIT_CHANCE: f32 = 0.05;
    pub const DEFAULT_BASE_SUPER_CRIT_CHANCE: f32 = 0.1;
    pub const DEFAULT_CRIT_DAMAGE_MULTIPLIER: f32 = 1.5;
    pub const DEFAULT_SUPER_CRIT_DAMAGE_MULTIPLIER: f32 = 2.0;
    pub const DEFAULT_RATING_SCALE: f32 = 1000.0;
    pub const DEFAULT_RESIST_SCORE_CONSTANT: f32 = 500.0;
    pub const DEFAULT_REGION_RESIST_PER_TIER: f32 = 100.0;
    pub const DEFAULT_HEALTH_PER_LEVEL_FACTOR: f32 = 0.08;

    pub const fn new() -> Self {
        Self {
            aim_padding: Self::DEFAULT_AIM_PADDING,
            range_tolerance: Self::DEFAULT_RANGE_TOLERANCE,
            movement_latency_compensation_ms: Self::DEFAULT_MOVEMENT_LATENCY_COMPENSATION_MS,
            min_finite_duration_ms: Self::DEFAULT_MIN_FINITE_DURATION_MS,
            base_crit_chance: Self::DEFAULT_BASE_CRIT_CHANCE,
            base_super_crit_chance: Self::DEFAULT_BASE_SUPER_CRIT_CHANCE,
            crit_damage_multiplier: Self::DEFAULT_CRIT_DAMAGE_MULTIPLIER,
            super_crit_damage_multiplier: Self::DEFAULT_SUPER_CRIT_DAMAGE_MULTIPLIER,
            rating_scale: Self::DEFAULT_RATING_SCALE,
            resist_score_constant: Self::DEFAULT_RESIST_SCORE_CONSTANT,
            region_resist_per_tier: Self::DEFAULT_REGION_RESIST_PER_TIER,
            health_per_level_factor: Self::DEFAULT_HEALTH_PER_LEVEL_FACTOR,
            knockback_scale: 1.0,
            duplicate_damage_pct_bonus: true,
            strict_invariants: false,
        }
    }

    pub fn with_strict_invariants(mut self, strict: bool) -> Self {
        self.strict_invariants = strict;
        self
    }

    pub fn with_duplicate_damage_pct_bonus(mut self, duplicate: bool) -> Self {
        self.duplicate_damage_pct_bonus = duplicate;
        self
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) static DEFAULT_CONFIG: CombatConfig = CombatConfig::new();
