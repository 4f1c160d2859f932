//! Target-independent calculation.
//!
//! Runs once per payload, before any target: base damage with variance,
//! aggregated bonuses and penalties, healing and resource changes.

use strum::{EnumCount, IntoEnumIterator};

use super::{PayloadError, PowerPayload};
use crate::env::{CombatEnv, RollKind, compute_seed};
use crate::formula::FormulaContext;
use crate::property::{DamageType, ManaType, PropertyId, PropertyKey};

/// Slots per damage aggregate: one per [`DamageType`] plus "any type".
pub(crate) const DAMAGE_SLOTS: usize = DamageType::COUNT + 1;
pub(crate) const ANY_SLOT: usize = DamageType::ANY_PARAM as usize;

/// Numbers computed by [`PowerPayload::calculate_initial_properties`].
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct InitialValues {
    /// Rolled base damage per type, variance and tuning applied.
    pub damage_base: [f32; DamageType::COUNT],
    /// Flat damage added after every multiplier.
    pub damage_unmodified: [f32; DamageType::COUNT],
    pub damage_mult: [f32; DAMAGE_SLOTS],
    pub damage_pct: [f32; DAMAGE_SLOTS],
    pub damage_rating: [f32; DAMAGE_SLOTS],
    pub weaken_pct: f32,
    pub healing: f32,
    pub endurance_change: [f32; ManaType::COUNT],
    pub secondary_resource_change: f32,
}

impl InitialValues {
    /// Type-specific plus "any type" value of an aggregate.
    pub fn total(slots: &[f32; DAMAGE_SLOTS], damage_type: DamageType) -> f32 {
        slots[damage_type.index()] + slots[ANY_SLOT]
    }
}

impl PowerPayload {
    /// Computes the target-independent numbers. Calling it again is a no-op.
    ///
    /// Missing curves degrade the affected contribution to zero; only a
    /// missing catalog entry or RNG oracle fails the calculation.
    pub fn calculate_initial_properties(&mut self, env: &CombatEnv<'_>) -> Result<(), PayloadError> {
        if self.initial.is_some() {
            return Ok(());
        }
        let definition = self.definition(env)?;
        let rng = env.rng()?;
        let props = &self.properties;
        let mut values = InitialValues::default();

        // ====================================================================
        // Damage
        // ====================================================================

        let held_seconds =
            self.variable_activation_time_ms.min(definition.max_held_ms) as f32 / 1000.0;
        let variance = props.real(PropertyKey::DamageVariance);
        let damage_roll = rng.variance(
            compute_seed(self.power_seed, self.owner, RollKind::DamageVariance, 0),
            variance,
        );
        let tuning = props.real(PropertyKey::DamageTuningScore);

        for damage_type in DamageType::iter() {
            let param = damage_type.param();
            let base = props.real(PropertyId::new(PropertyKey::DamageBase, param));
            let per_level = props.real(PropertyId::new(PropertyKey::DamageBasePerLevel, param));
            let mut total = 0.0;
            if base != 0.0 || per_level != 0.0 {
                total = base
                    + props.real(PropertyKey::DamageBaseBonus)
                    + per_level * self.combat_level as f32
                    + props.real(PropertyId::new(PropertyKey::DamageBasePerSecondHeld, param))
                        * held_seconds;
            }
            values.damage_base[damage_type.index()] = total * damage_roll * tuning;
            values.damage_unmodified[damage_type.index()] = props
                .real(PropertyId::new(PropertyKey::DamageBaseUnmodified, param))
                + props.real(PropertyId::new(PropertyKey::DamageBaseUnmodifiedPerRank, param))
                    * self.rank as f32;
        }

        // ====================================================================
        // Damage bonuses and penalties
        // ====================================================================

        for slot in 0..DAMAGE_SLOTS {
            let param = slot as u32;
            values.damage_mult[slot] = props.real(PropertyId::new(PropertyKey::DamageMult, param));
            values.damage_pct[slot] = props.real(PropertyId::new(PropertyKey::DamagePct, param));
            values.damage_rating[slot] =
                props.real(PropertyId::new(PropertyKey::DamageRating, param));
        }

        let power_param = self.power.0;
        let keyword_sum = |key: PropertyKey| -> f32 {
            self.keywords
                .iter()
                .map(|keyword| props.real(PropertyId::new(key, u32::from(keyword.0))))
                .sum()
        };

        values.damage_mult[ANY_SLOT] += definition.attack_speed_damage_factor
            * props.real(PropertyKey::AttackSpeedPct)
            + props.real(PropertyId::new(PropertyKey::DamageMultForPower, power_param))
            + keyword_sum(PropertyKey::DamageMultForKeyword);

        let pct_bonus = props.real(PropertyKey::DamagePctBonus);
        values.damage_pct[ANY_SLOT] += pct_bonus;
        if self.config(env).duplicate_damage_pct_bonus {
            values.damage_pct[ANY_SLOT] += pct_bonus;
        }
        values.damage_pct[ANY_SLOT] += props
            .real(PropertyId::new(PropertyKey::DamagePctBonusForPower, power_param))
            + keyword_sum(PropertyKey::DamagePctBonusForKeyword);

        values.damage_rating[ANY_SLOT] += props
            .real(PropertyId::new(PropertyKey::DamageRatingBonusForPower, power_param))
            + keyword_sum(PropertyKey::DamageRatingBonusForKeyword)
            + self.keyword_cooldown_rating;

        values.weaken_pct =
            props.real(PropertyKey::WeakenPct) + keyword_sum(PropertyKey::WeakenPctForKeyword);

        // ====================================================================
        // Healing and resources
        // ====================================================================

        let curve_healing = match &definition.healing.base_curve {
            Some(formula) => {
                let ctx = FormulaContext::new(props)
                    .with_rank(self.rank)
                    .with_combat_level(self.combat_level);
                let ctx = match env.curves() {
                    Ok(curves) => ctx.with_curves(curves),
                    Err(_) => ctx,
                };
                formula.evaluate_or_zero(&ctx, "healing base curve")
            }
            None => props.real(PropertyKey::HealingBaseCurve),
        };
        let healing_base = props.real(PropertyKey::HealingBase) + curve_healing;
        if healing_base != 0.0 {
            let healing_roll = rng.variance(
                compute_seed(self.power_seed, self.owner, RollKind::HealingVariance, 0),
                variance,
            );
            values.healing = healing_base * props.real(PropertyKey::HealingMagnitude) * healing_roll;
        }

        for mana in ManaType::iter() {
            values.endurance_change[mana.index()] =
                props.real(PropertyId::new(PropertyKey::EnduranceChange, mana.param()));
        }
        values.secondary_resource_change = props.real(PropertyKey::SecondaryResourceChange);

        tracing::trace!(
            power = %self.power,
            damage = ?values.damage_base,
            healing = values.healing,
            "initial properties calculated"
        );
        self.properties
            .set_real(PropertyKey::HealingBaseCurve, curve_healing);
        self.initial = Some(values);
        Ok(())
    }

    pub(crate) fn initial_values(&self) -> Result<&InitialValues, PayloadError> {
        self.initial
            .as_ref()
            .ok_or(PayloadError::NotCalculated(self.power))
    }
}
