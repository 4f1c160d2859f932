//! Combat formula oracle.
//!
//! Rating conversion, crit, knockback and level-scaling math is owned by the
//! combat-formula model; the engine only consumes it as pure functions.

use crate::config::CombatConfig;
use crate::property::{PropertyCollection, PropertyId, PropertyKey};
use crate::state::KeywordSet;

pub trait CombatFormulas: Send + Sync {
    /// Converts a rating into a fraction (`0.1` = +10%). Monotonic in `rating`.
    fn rating_to_percent(&self, rating: f32, target_level: u32) -> f32;

    /// Crit chance in `[0, 1]` of `attacker` against `target`.
    fn crit_chance(
        &self,
        attacker: &PropertyCollection,
        target: &PropertyCollection,
        keywords: KeywordSet,
        level: u32,
    ) -> f32;

    /// Chance in `[0, 1]` that a critical hit is super-critical.
    fn super_crit_chance(
        &self,
        attacker: &PropertyCollection,
        target: &PropertyCollection,
        level: u32,
    ) -> f32;

    fn crit_damage_multiplier(
        &self,
        attacker: &PropertyCollection,
        super_critical: bool,
        level: u32,
    ) -> f32;

    /// Chance in `[0, 1]` that `target` dodges a hostile hit.
    fn dodge_chance(&self, target: &PropertyCollection) -> f32;

    fn knockback_distance(&self, base_distance: f32, target: &PropertyCollection) -> f32;

    /// What an entity with `max_health` at `actual_level` would have at `level`.
    fn max_health_at_level(&self, max_health: f32, actual_level: u32, level: u32) -> f32;

    /// Duration multiplier in `(0, 1]` for a resist score.
    fn resist_duration_multiplier(&self, resist_score: f32) -> f32;

    /// Resist score granted by a region difficulty tier.
    fn region_resist_bonus(&self, difficulty_tier: i64) -> f32;
}

/// Closed-form formulas parameterized by [`CombatConfig`].
#[derive(Clone, Debug, Default)]
pub struct StandardFormulas {
    config: CombatConfig,
}

impl StandardFormulas {
    pub fn new(config: CombatConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    fn keyword_sum(props: &PropertyCollection, key: PropertyKey, keywords: KeywordSet) -> f32 {
        keywords
            .iter()
            .map(|keyword| props.real(PropertyId::new(key, keyword.0 as u32)))
            .sum()
    }
}

impl CombatFormulas for StandardFormulas {
    fn rating_to_percent(&self, rating: f32, target_level: u32) -> f32 {
        let scale = self.config.rating_scale * (1.0 + target_level as f32 * 0.05);
        if scale <= 0.0 {
            return 0.0;
        }
        rating / (rating.abs() + scale)
    }

    fn crit_chance(
        &self,
        attacker: &PropertyCollection,
        target: &PropertyCollection,
        keywords: KeywordSet,
        level: u32,
    ) -> f32 {
        let rating = attacker.real(PropertyKey::CritRating)
            + Self::keyword_sum(attacker, PropertyKey::CritRatingBonusForKeyword, keywords)
            - target.real(PropertyKey::CritDefenseRating);
        (self.config.base_crit_chance + self.rating_to_percent(rating, level)).clamp(0.0, 1.0)
    }

    fn super_crit_chance(
        &self,
        attacker: &PropertyCollection,
        _target: &PropertyCollection,
        level: u32,
    ) -> f32 {
        let rating = attacker.real(PropertyKey::SuperCritRating);
        (self.config.base_super_crit_chance + self.rating_to_percent(rating, level))
            .clamp(0.0, 1.0)
    }

    fn crit_damage_multiplier(
        &self,
        attacker: &PropertyCollection,
        super_critical: bool,
        level: u32,
    ) -> f32 {
        let base = if super_critical {
            self.config.super_crit_damage_multiplier
        } else {
            self.config.crit_damage_multiplier
        };
        base + self
            .rating_to_percent(attacker.real(PropertyKey::CritDamageRating), level)
            .max(0.0)
    }

    fn dodge_chance(&self, target: &PropertyCollection) -> f32 {
        target.real(PropertyKey::DodgeChancePct).clamp(0.0, 1.0)
    }

    fn knockback_distance(&self, base_distance: f32, _target: &PropertyCollection) -> f32 {
        (base_distance * self.config.knockback_scale).max(0.0)
    }

    fn max_health_at_level(&self, max_health: f32, actual_level: u32, level: u32) -> f32 {
        let factor = self.config.health_per_level_factor;
        let actual = 1.0 + factor * actual_level as f32;
        if actual_level == level || actual <= 0.0 {
            return max_health;
        }
        max_health * (1.0 + factor * level as f32) / actual
    }

    fn resist_duration_multiplier(&self, resist_score: f32) -> f32 {
        if resist_score <= 0.0 {
            return 1.0;
        }
        let k = self.config.resist_score_constant;
        k / (k + resist_score)
    }

    fn region_resist_bonus(&self, difficulty_tier: i64) -> f32 {
        difficulty_tier.max(0) as f32 * self.config.region_resist_per_tier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_conversion_is_monotonic_and_zero_at_zero() {
        let formulas = StandardFormulas::default();
        assert_eq!(formulas.rating_to_percent(0.0, 10), 0.0);
        let mut last = formulas.rating_to_percent(-5000.0, 10);
        for rating in (-4000..=5000).step_by(500) {
            let value = formulas.rating_to_percent(rating as f32, 10);
            assert!(value >= last);
            last = value;
        }
    }

    #[test]
    fn resist_halves_at_constant() {
        let formulas = StandardFormulas::default();
        let k = CombatConfig::DEFAULT_RESIST_SCORE_CONSTANT;
        assert_eq!(formulas.resist_duration_multiplier(k), 0.5);
        assert_eq!(formulas.resist_duration_multiplier(0.0), 1.0);
    }

    #[test]
    fn health_scaling_is_identity_at_same_level() {
        let formulas = StandardFormulas::default();
        assert_eq!(formulas.max_health_at_level(1000.0, 20, 20), 1000.0);
        assert!(formulas.max_health_at_level(1000.0, 20, 30) > 1000.0);
    }
}
