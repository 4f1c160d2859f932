//! Condition application decisions for one target.
//!
//! Produces pending conditions plus the remove and refresh lists dictated by
//! stacking. Nothing is mutated here; the target's collection applies the
//! lists later, removals first.

use std::sync::Arc;

use super::{PayloadError, PowerPayload};
use crate::condition::{
    ConditionDefinition, ConditionFlags, ConditionScope, OwnerLink, PendingCondition,
};
use crate::env::{CombatEntity, CombatEnv, CombatFormulas, RollKind, compute_seed};
use crate::error::invariant_violation;
use crate::formula::FormulaContext;
use crate::power::{ConditionRef, PowerDefinition, PowerFlags};
use crate::property::{PropertyCollection, PropertyId, PropertyKey};
use crate::results::{PowerResults, ResultFlags};
use crate::state::{ConditionId, TimeMs};

/// Why a single condition was not applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Skip {
    /// Fully resisted; flagged on the results.
    Resisted,
    /// Not applicable or rejected; nothing to report.
    Ignored,
}

impl PowerPayload {
    /// Decides the conditions of `definition` for `target` in `scope`.
    ///
    /// `movement_ms` is the duration of the movement that movement-bound
    /// target conditions follow (the knockback); user conditions follow the
    /// activation's own movement time.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn apply_conditions(
        &self,
        env: &CombatEnv<'_>,
        definition: &PowerDefinition,
        target: &dyn CombatEntity,
        scope: ConditionScope,
        movement_ms: u64,
        results: &mut PowerResults,
        now: TimeMs,
    ) -> Result<(), PayloadError> {
        if definition.conditions.is_empty() {
            return Ok(());
        }
        let catalog = env.catalog()?;
        let formulas = env.formulas()?;
        let rng = env.rng()?;
        let config = self.config(env);

        let movement_ms = match scope {
            ConditionScope::Target => movement_ms,
            ConditionScope::User if self.movement_time_ms > 0 && self.owner_directly_controlled => {
                self.movement_time_ms + config.movement_latency_compensation_ms
            }
            ConditionScope::User => self.movement_time_ms,
        };

        // Stacks already scheduled for removal do not count against caps.
        let mut excluded: Vec<ConditionId> = results.conditions_to_remove.clone();

        for (index, condition_ref) in definition.conditions.iter().enumerate() {
            let condition = match condition_ref {
                ConditionRef::Mixin(condition) => condition.as_ref(),
                ConditionRef::Reference(id) => match catalog.condition(*id) {
                    Some(condition) => condition,
                    None => {
                        tracing::warn!(power = %self.power, condition = %id, "condition definition not found");
                        continue;
                    }
                },
            };
            if condition.scope != scope {
                continue;
            }

            let target_props = target.properties();
            if condition.keywords.iter().any(|keyword| {
                target_props.flag(PropertyId::new(
                    PropertyKey::ImmuneToConditionKeyword,
                    u32::from(keyword.0),
                ))
            }) {
                continue;
            }

            let stack_id = condition.stacking.stack_id(
                self.power,
                condition.id,
                self.ultimate_owner,
                self.creator_player,
            );
            let existing = target.conditions().stack_count(&stack_id);
            let ctx = FormulaContext::new(&self.properties)
                .with_target(target_props)
                .with_rank(self.rank)
                .with_combat_level(self.combat_level)
                .with_existing_stacks(existing);
            let ctx = match env.curves() {
                Ok(curves) => ctx.with_curves(curves),
                Err(_) => ctx,
            };

            let chance = condition.apply_chance.evaluate_or_zero(&ctx, "condition apply chance");
            let seed = compute_seed(
                self.power_seed,
                target.id(),
                RollKind::ConditionChance,
                index as u32,
            );
            if !rng.chance(seed, chance) {
                continue;
            }

            let duration_ms = if condition.flags.is_movement_bound() {
                if movement_ms == 0 {
                    invariant_violation(
                        config.strict_invariants,
                        "movement-bound condition without a movement duration",
                    );
                    results.flags |= ResultFlags::RESISTED;
                    return Ok(());
                }
                movement_ms
            } else {
                match self.condition_duration(env, formulas, condition, target, scope, &ctx) {
                    Ok(duration_ms) => duration_ms,
                    Err(Skip::Resisted) => {
                        results.flags |= ResultFlags::RESISTED;
                        continue;
                    }
                    Err(Skip::Ignored) => continue,
                }
            };

            let data = target.conditions().stack_application_data(
                &stack_id,
                &condition.stacking,
                self.rank,
                duration_ms,
                now,
                &excluded,
            );
            excluded.extend_from_slice(&data.remove);
            results.conditions_to_remove.extend_from_slice(&data.remove);
            results.conditions_to_refresh.extend_from_slice(&data.refresh);
            if data.num_new_stacks == 0 {
                continue;
            }

            let mut properties = PropertyCollection::new();
            for property in &condition.properties {
                properties.set_real(
                    property.id(),
                    property.formula.evaluate_or_zero(&ctx, "condition property"),
                );
            }
            let properties = Arc::new(properties);
            let owner_link = self.owner.is_valid().then_some(OwnerLink {
                owner: self.owner,
                power: self.power,
            });
            let pending = PendingCondition {
                definition: condition.id,
                power: self.power,
                creator: self.owner,
                ultimate_creator: self.ultimate_owner,
                stack_id,
                condition_type: condition.condition_type,
                keywords: condition.keywords,
                flags: condition.flags,
                duration_ms: data.duration_ms,
                max_stacks: condition.stacking.max_stacks_for_rank(self.rank),
                properties,
                owner_link,
            };
            tracing::trace!(
                power = %self.power,
                entity = %target.id(),
                condition = %condition.id,
                stacks = data.num_new_stacks,
                duration_ms = data.duration_ms,
                "condition scheduled"
            );
            results
                .conditions_to_add
                .extend(std::iter::repeat_n(pending, data.num_new_stacks as usize));
        }
        Ok(())
    }

    /// Rolled, resisted and bonus-adjusted duration. Zero means infinite.
    fn condition_duration(
        &self,
        env: &CombatEnv<'_>,
        formulas: &dyn CombatFormulas,
        condition: &ConditionDefinition,
        target: &dyn CombatEntity,
        scope: ConditionScope,
        ctx: &FormulaContext<'_>,
    ) -> Result<u64, Skip> {
        let config = self.config(env);
        let rolled = condition.duration_ms.evaluate_or_zero(ctx, "condition duration");
        if rolled < 0.0 {
            invariant_violation(config.strict_invariants, "negative condition duration");
            return Err(Skip::Ignored);
        }
        if rolled == 0.0 {
            return self.admit_infinite(env, condition, target, scope).map(|()| 0);
        }
        // Positive rolls stay finite.
        let mut duration_ms = (rolled.round() as u64).max(config.min_finite_duration_ms);

        if scope == ConditionScope::Target && !condition.flags.contains(ConditionFlags::IGNORE_RESIST)
        {
            let multiplier = formulas
                .resist_duration_multiplier(self.resist_score(formulas, condition, target));
            let resisted = duration_ms as f32 * multiplier;
            if resisted <= 0.0 {
                return Err(Skip::Resisted);
            }
            duration_ms = (resisted.round() as u64).max(config.min_finite_duration_ms);
        }

        if !condition.flags.contains(ConditionFlags::IGNORE_DURATION_BONUS) {
            let pct = self.properties.real(PropertyKey::ConditionDurationBonusPct);
            let flat = self.properties.real(PropertyKey::ConditionDurationBonusMs);
            let bonused = (duration_ms as f32 * (1.0 + pct)).max(0.0) + flat;
            duration_ms = (bonused.round().max(0.0) as u64).max(config.min_finite_duration_ms);
        }
        Ok(duration_ms)
    }

    /// Aggregated tenacity of `target` against `condition`.
    fn resist_score(
        &self,
        formulas: &dyn CombatFormulas,
        condition: &ConditionDefinition,
        target: &dyn CombatEntity,
    ) -> f32 {
        let props = target.properties();
        let mut score = props.real(PropertyKey::ResistScore);
        if condition.is_negative_status() {
            score += props.real(PropertyKey::ResistScoreNegativeStatus);
        }
        score += condition
            .keywords
            .iter()
            .map(|keyword| {
                props.real(PropertyId::new(
                    PropertyKey::ResistScoreForKeyword,
                    u32::from(keyword.0),
                ))
            })
            .sum::<f32>();
        if self.is_player_sourced {
            score += formulas.region_resist_bonus(props.int(PropertyKey::RegionDifficultyTier));
        }
        score
    }

    /// Gates for conditions that never expire on their own.
    fn admit_infinite(
        &self,
        env: &CombatEnv<'_>,
        condition: &ConditionDefinition,
        target: &dyn CombatEntity,
        scope: ConditionScope,
    ) -> Result<(), Skip> {
        let config = self.config(env);

        // Resistance cannot shorten an infinite debuff, so any resistance rejects it.
        if scope == ConditionScope::Target
            && condition.is_negative_status()
            && !condition.flags.contains(ConditionFlags::IGNORE_RESIST)
        {
            if let Ok(formulas) = env.formulas() {
                let score = self.resist_score(formulas, condition, target);
                if formulas.resist_duration_multiplier(score) < 1.0 {
                    return Err(Skip::Resisted);
                }
            }
        }

        if !self.owner.is_valid() {
            invariant_violation(
                config.strict_invariants,
                "infinite condition without an owner to remove it",
            );
            return Err(Skip::Ignored);
        }

        if self.from_hotspot && !target.overlaps(self.owner) {
            return Err(Skip::Ignored);
        }

        if scope == ConditionScope::User {
            let cancels = self.flags.intersects(
                PowerFlags::CANCEL_CONDITIONS_ON_END | PowerFlags::CANCEL_CONDITIONS_ON_UNASSIGN,
            );
            let assigned = env
                .world()
                .ok()
                .and_then(|world| world.powers(self.owner))
                .is_some_and(|powers| powers.contains(self.power));
            if cancels && !assigned {
                return Err(Skip::Ignored);
            }
        }
        Ok(())
    }
}
