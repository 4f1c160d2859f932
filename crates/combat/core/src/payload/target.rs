//! Per-target calculation.

use strum::IntoEnumIterator;

use super::initial::{ANY_SLOT, InitialValues};
use super::{PayloadError, PowerPayload};
use crate::condition::ConditionScope;
use crate::env::{CombatEntity, CombatEnv, RollKind, compute_seed};
use crate::error::ErrorContext;
use crate::power::{PowerDefinition, PowerFlags};
use crate::property::{DamageType, PropertyId, PropertyKey};
use crate::results::{KnockbackResult, PowerResults, ResultFlags};
use crate::state::{EntityId, TimeMs};

/// Copied from the payload into every result.
const PASS_THROUGH: &[PropertyKey] = &[
    PropertyKey::CreatorEntityAsset,
    PropertyKey::CreatorPowerAsset,
    PropertyKey::NoExpOnDeath,
    PropertyKey::NoLootDrop,
    PropertyKey::DestroyOnKill,
    PropertyKey::RecursionDepth,
    PropertyKey::SummonLifespanOverrideMs,
];

/// Outcome of the critical-hit roll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct CritRoll {
    critical: bool,
    super_critical: bool,
    level: u32,
}

impl PowerPayload {
    /// Calculates the results for one target.
    ///
    /// With `calculate_for_target` the results describe what happens to
    /// `target`: dodge, damage, healing, resources, knockback, removals and
    /// target-scoped conditions. Without it, `target` is the power's user and
    /// only user-scoped conditions are produced.
    ///
    /// Pure with respect to the payload: the same payload, seed and target
    /// state always produce identical results.
    pub fn calculate_power_results(
        &self,
        env: &CombatEnv<'_>,
        target: &dyn CombatEntity,
        calculate_for_target: bool,
        now: TimeMs,
    ) -> Result<PowerResults, PayloadError> {
        let initial = self.initial_values()?;
        let definition = self.definition(env)?;
        let world = env.world()?;

        let mut results =
            PowerResults::new(self.power, self.owner, self.ultimate_owner, target.id());
        results.position = target.position();
        results.is_hostile =
            target.id() != self.owner && world.is_hostile(self.alliance, target.alliance());

        if calculate_for_target {
            self.calculate_target_results(env, definition, initial, target, &mut results, now)?;
        } else {
            results.flags |= ResultFlags::SELF_RESULTS;
            self.apply_conditions(
                env,
                definition,
                target,
                ConditionScope::User,
                0,
                &mut results,
                now,
            )?;
        }

        results
            .properties
            .copy_keys_from(&self.properties, PASS_THROUGH);
        Ok(results)
    }

    /// Results for the power's own user; see [`Self::calculate_power_results`].
    pub fn calculate_user_results(
        &self,
        env: &CombatEnv<'_>,
        now: TimeMs,
    ) -> Result<PowerResults, PayloadError> {
        let user = env
            .world()?
            .entity(self.owner)
            .ok_or(PayloadError::OwnerNotFound(self.owner))?;
        self.calculate_power_results(env, user, false, now)
    }

    /// Calculates every target in order. A target that cannot be resolved or
    /// calculated is logged and skipped; the others are unaffected.
    pub fn calculate_results_for_targets(
        &self,
        env: &CombatEnv<'_>,
        targets: &[EntityId],
        now: TimeMs,
    ) -> Vec<PowerResults> {
        let Ok(world) = env.world() else {
            tracing::warn!(power = %self.power, "no world oracle for target calculation");
            return Vec::new();
        };
        targets
            .iter()
            .filter_map(|&id| {
                let outcome = world
                    .entity(id)
                    .ok_or(PayloadError::TargetNotFound(id))
                    .and_then(|target| self.calculate_power_results(env, target, true, now));
                match outcome {
                    Ok(results) => Some(results),
                    Err(error) => {
                        let error = error.with_context(
                            ErrorContext::new()
                                .with_entity(id)
                                .with_power(self.power)
                                .with_time(now),
                        );
                        tracing::warn!(%error, "skipping target");
                        None
                    }
                }
            })
            .collect()
    }

    fn calculate_target_results(
        &self,
        env: &CombatEnv<'_>,
        definition: &PowerDefinition,
        initial: &InitialValues,
        target: &dyn CombatEntity,
        results: &mut PowerResults,
        now: TimeMs,
    ) -> Result<(), PayloadError> {
        let formulas = env.formulas()?;
        let rng = env.rng()?;
        let target_props = target.properties();

        // ====================================================================
        // Dodge
        // ====================================================================

        if results.is_hostile && !definition.has(PowerFlags::UNAVOIDABLE) {
            let chance = formulas.dodge_chance(target_props);
            if rng.chance(compute_seed(self.power_seed, target.id(), RollKind::Dodge, 0), chance) {
                results.flags |= ResultFlags::DODGED;
                tracing::trace!(power = %self.power, entity = %target.id(), "dodged");
                return Ok(());
            }
        }

        // ====================================================================
        // Critical
        // ====================================================================

        let crit = self.roll_critical(env, definition, target)?;
        if crit.critical {
            results.flags |= ResultFlags::CRITICAL;
        }
        if crit.super_critical {
            results.flags |= ResultFlags::SUPER_CRITICAL;
        }

        // ====================================================================
        // Damage
        // ====================================================================

        let mut pct = initial.damage_pct;
        let mut rating = initial.damage_rating;
        if target.rank().is_boss() {
            pct[ANY_SLOT] += self.properties.real(PropertyKey::DamagePctVsBoss);
            rating[ANY_SLOT] += self.properties.real(PropertyKey::DamageRatingVsBoss);
        }
        let team_up = self.properties.real(PropertyKey::TeamUpDamageScalar);
        let weaken = (1.0 - initial.weaken_pct).max(0.0);
        let target_level = target.combat_level();

        for damage_type in DamageType::iter() {
            let index = damage_type.index();
            let base = initial.damage_base[index];
            let unmodified = initial.damage_unmodified[index];
            if base == 0.0 && unmodified == 0.0 {
                continue;
            }
            let mult = (1.0 + InitialValues::total(&initial.damage_mult, damage_type)).max(0.0);
            let rating_pct = formulas
                .rating_to_percent(InitialValues::total(&rating, damage_type), target_level);
            let pct_scale = (1.0 + InitialValues::total(&pct, damage_type) + rating_pct).max(0.0);
            results.damage[index] = base * mult * pct_scale * weaken * team_up + unmodified;
        }

        if crit.critical {
            let multiplier =
                formulas.crit_damage_multiplier(&self.properties, crit.super_critical, crit.level);
            results.damage.iter_mut().for_each(|damage| *damage *= multiplier);
        }

        let boss_resistance = target_props.real(PropertyKey::MetaGameBossResistance);
        if boss_resistance != 0.0 {
            let scale = if boss_resistance > 0.0 {
                let mitigation = (boss_resistance
                    - self.properties.real(PropertyKey::MetaGameBossPenetration))
                .clamp(0.0, 1.0);
                1.0 - mitigation
            } else {
                1.0 - boss_resistance
            };
            results.damage.iter_mut().for_each(|damage| *damage *= scale);
        }

        results.damage_for_client = results.damage;
        if self.is_player_sourced && !target.is_player() && self.combat_level != target_level {
            let max_health = target.max_health();
            let at_level = formulas.max_health_at_level(max_health, target_level, self.combat_level);
            if max_health > 0.0 && at_level > 0.0 {
                let scale = max_health / at_level;
                results.damage.iter_mut().for_each(|damage| *damage *= scale);
            }
        }

        // ====================================================================
        // Healing and resources
        // ====================================================================

        let mut healing = initial.healing;
        if definition.has(PowerFlags::DOUBLE_BASE_HEALING) {
            healing += initial.healing;
        }
        healing += target.max_health() * self.properties.real(PropertyKey::HealingBasePct);
        if healing > 0.0 {
            results.healing = healing;
        }
        results.endurance_change = initial.endurance_change;
        results.secondary_resource_change = initial.secondary_resource_change;

        // ====================================================================
        // Knockback
        // ====================================================================

        let mut movement_ms = 0;
        if let Some(knockback) = definition.knockback {
            let distance = formulas.knockback_distance(knockback.distance, target_props);
            let speed = self.properties.real(PropertyKey::MovementSpeedOverride);
            if distance > 0.0 && speed > 0.0 {
                movement_ms = (distance / speed * 1000.0).round() as u64;
            }
            if movement_ms > 0 {
                results.knockback = Some(KnockbackResult {
                    source: self.owner_position,
                    distance,
                    duration_ms: movement_ms,
                });
            }
        }

        // ====================================================================
        // Conditions
        // ====================================================================

        results.conditions_to_remove = target.conditions().collect_removals(&definition.removals);
        self.apply_conditions(
            env,
            definition,
            target,
            ConditionScope::Target,
            movement_ms,
            results,
            now,
        )?;

        tracing::trace!(
            power = %self.power,
            entity = %target.id(),
            damage = ?results.damage,
            healing = results.healing,
            critical = crit.critical,
            "target results calculated"
        );
        Ok(())
    }

    fn roll_critical(
        &self,
        env: &CombatEnv<'_>,
        definition: &PowerDefinition,
        target: &dyn CombatEntity,
    ) -> Result<CritRoll, PayloadError> {
        let override_level = self.properties.int(PropertyKey::CritLevelOverride);
        let level = if self.is_player_sourced && !target.is_player() && override_level > 0 {
            u32::try_from(override_level).unwrap_or(u32::MAX)
        } else {
            target.combat_level()
        };
        let mut roll = CritRoll {
            level,
            ..CritRoll::default()
        };
        if !definition.has(PowerFlags::CAN_CRIT) || definition.is_passive() {
            return Ok(roll);
        }

        let target_props = target.properties();
        let forced = self.keywords.iter().any(|keyword| {
            let param = u32::from(keyword.0);
            self.properties
                .flag(PropertyId::new(PropertyKey::CritAlwaysOnKeywordAttack, param))
                || target_props.flag(PropertyId::new(PropertyKey::CritAlwaysOnGotHitKeyword, param))
        });

        let formulas = env.formulas()?;
        let rng = env.rng()?;
        roll.critical = forced || {
            let chance = formulas.crit_chance(&self.properties, target_props, self.keywords, level)
                + definition.crit_chance_bonus;
            rng.chance(
                compute_seed(self.power_seed, target.id(), RollKind::Critical, 0),
                chance,
            )
        };
        if roll.critical {
            let chance = formulas.super_crit_chance(&self.properties, target_props, level);
            roll.super_critical = rng.chance(
                compute_seed(self.power_seed, target.id(), RollKind::SuperCritical, 0),
                chance,
            );
        }
        Ok(roll)
    }
}
