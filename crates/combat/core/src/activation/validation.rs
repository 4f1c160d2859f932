//! Activation eligibility.
//!
//! Checks run in a fixed order and return on the first failure:
//! - Owner simulated, power assigned and activatable
//! - Owner in world (unless self-targeted)
//! - Region, restrictive condition and prerequisite gates
//! - Extra activation, cooldown and exclusivity gates
//! - Item-sourced power checks
//! - Target and position
//! - Resource cost
//!
//! The only side effect is cancelling an executing travel power when an
//! exclusive power is requested.

use super::position::is_in_position_for_power;
use super::result::{ActivationFlags, ActivationRequest, InPositionResult, PowerUseResult};
use crate::env::{CombatEntity, CombatEnv};
use crate::power::{
    ActivationRequirement, ActivationType, PowerCollection, PowerDefinition, PowerFlags,
    TargetingStyle,
};
use crate::property::{PropertyId, PropertyKey};
use crate::state::{EntityId, TimeMs};

/// Decides whether `owner` may activate `request.power` right now.
///
/// `powers` is the owner's power collection; it is only mutated when an
/// executing travel power is interrupted by an exclusive one.
pub fn can_activate_power(
    env: &CombatEnv<'_>,
    owner: EntityId,
    powers: &mut PowerCollection,
    request: &ActivationRequest,
) -> PowerUseResult {
    let result = check_activation(env, owner, powers, request);
    if !result.is_success() {
        tracing::debug!(
            %owner,
            power = %request.power,
            auto = request.flags.contains(ActivationFlags::AUTO_ACTIVATED),
            %result,
            "activation rejected"
        );
    }
    result
}

fn check_activation(
    env: &CombatEnv<'_>,
    owner_id: EntityId,
    powers: &mut PowerCollection,
    request: &ActivationRequest,
) -> PowerUseResult {
    let Ok(world) = env.world() else {
        tracing::warn!(owner = %owner_id, "activation check without a world oracle");
        return PowerUseResult::GenericError;
    };
    let Some(owner) = world.entity(owner_id).filter(|owner| owner.is_simulated()) else {
        return PowerUseResult::OwnerNotSimulated;
    };
    let Some(instance) = powers.get(request.power) else {
        return PowerUseResult::AbilityMissing;
    };
    let Some(definition) = env.catalog().ok().and_then(|catalog| catalog.power(request.power))
    else {
        tracing::warn!(power = %request.power, "assigned power has no definition");
        return PowerUseResult::GenericError;
    };
    if definition.is_passive() {
        return PowerUseResult::GenericError;
    }

    let last_activation = instance.last_activation;
    let toggled_on = instance.toggled_on;
    let extra_activation_ready = instance.extra_activation_ready;
    let source_item = instance.source_item;
    let on_cooldown = instance.is_on_cooldown(definition.cooldown_ms, request.now);

    let target_id = if definition.is_self_targeted() {
        Some(owner_id)
    } else {
        if !owner.is_in_world() {
            return PowerUseResult::OwnerNotInWorld;
        }
        request.target
    };

    // ========================================================================
    // Trigger-time gates
    // ========================================================================

    if owner
        .region()
        .is_some_and(|region| definition.restricted_regions.contains(&region))
    {
        return PowerUseResult::RegionRestricted;
    }
    if !definition.blocking_keywords.is_empty()
        && owner
            .conditions()
            .iter()
            .any(|condition| condition.keywords.intersects(definition.blocking_keywords))
    {
        return PowerUseResult::RestrictiveCondition;
    }
    if !definition
        .requirements
        .iter()
        .all(|requirement| requirement_met(owner, requirement))
    {
        return PowerUseResult::PrerequisiteFailed;
    }
    if definition.activation == ActivationType::ExtraActivation && !extra_activation_ready {
        return PowerUseResult::ExtraActivationFailed;
    }
    // Switching a toggle off is always allowed.
    if definition.is_toggle() && toggled_on {
        return PowerUseResult::Success;
    }
    if on_cooldown && !request.flags.contains(ActivationFlags::IGNORE_COOLDOWN) {
        return PowerUseResult::Cooldown;
    }

    // ========================================================================
    // Exclusivity
    // ========================================================================

    if definition.has(PowerFlags::EXCLUSIVE) {
        if let Some(result) = check_exclusive(env, powers, definition, last_activation, request.now)
        {
            return result;
        }
    }

    if definition.has(PowerFlags::ITEM) && !item_usable(env, owner, source_item) {
        return PowerUseResult::ItemUseRestricted;
    }

    // ========================================================================
    // Target and position
    // ========================================================================

    let target = match target_id {
        Some(id) => match world.entity(id) {
            Some(target) => Some(target),
            None => return PowerUseResult::BadTarget,
        },
        None => None,
    };
    if target.is_none()
        && matches!(definition.targeting, TargetingStyle::SingleTarget)
        && !definition.has(PowerFlags::MOUSE_TARGETED)
    {
        return PowerUseResult::BadTarget;
    }

    if !request.flags.contains(ActivationFlags::SKIP_POSITION_CHECK) {
        match is_in_position_for_power(env, owner, definition, target, request.target_position) {
            InPositionResult::Success => {}
            InPositionResult::OutOfRange | InPositionResult::NoPowerLos => {
                return PowerUseResult::OutOfPosition;
            }
            InPositionResult::BadTargetPosition => return PowerUseResult::BadTarget,
            InPositionResult::Error => return PowerUseResult::GenericError,
        }
    }

    // ========================================================================
    // Definition-specific final check
    // ========================================================================

    if let Some(cost) = definition.cost {
        let available = owner
            .properties()
            .real(PropertyId::new(PropertyKey::Endurance, cost.mana.param()));
        if cost.amount > available {
            return PowerUseResult::InsufficientResource;
        }
    }

    PowerUseResult::Success
}

/// Resolves exclusivity against the currently executing power. Interrupts a
/// travel power; any other executing exclusive power blocks activation.
fn check_exclusive(
    env: &CombatEnv<'_>,
    powers: &mut PowerCollection,
    definition: &PowerDefinition,
    last_activation: Option<TimeMs>,
    now: TimeMs,
) -> Option<PowerUseResult> {
    let executing = powers
        .executing_power()
        .filter(|&power| power != definition.id)
        .and_then(|power| env.catalog().ok()?.power(power))
        .filter(|executing| executing.has(PowerFlags::EXCLUSIVE));

    if let Some(executing) = executing {
        if executing.has(PowerFlags::TRAVEL) {
            powers.cancel_execution(executing.id);
        } else {
            return Some(PowerUseResult::PowerInProgress);
        }
    }

    let elapsed = last_activation.map(|at| now.since(at));
    match elapsed {
        Some(elapsed) if elapsed < definition.animation_ms => {
            Some(PowerUseResult::MinimumReactivateTime)
        }
        _ => None,
    }
}

fn requirement_met(owner: &dyn CombatEntity, requirement: &ActivationRequirement) -> bool {
    match *requirement {
        ActivationRequirement::HasConditionKeyword(keyword) => owner
            .conditions()
            .iter()
            .any(|condition| condition.keywords.contains(keyword)),
        ActivationRequirement::LacksConditionKeyword(keyword) => !owner
            .conditions()
            .iter()
            .any(|condition| condition.keywords.contains(keyword)),
        ActivationRequirement::PropertyAtLeast { key, param, value } => {
            owner.properties().real(PropertyId::new(key, param)) >= value
        }
    }
}

fn item_usable(env: &CombatEnv<'_>, owner: &dyn CombatEntity, source_item: Option<EntityId>) -> bool {
    let Some(item_id) = source_item else {
        return false;
    };
    let Some(item) = env.world().ok().and_then(|world| world.entity(item_id)) else {
        tracing::debug!(item = %item_id, "source item not found");
        return false;
    };
    if item.owner() != Some(owner.id()) {
        return false;
    }
    let required = item.properties().int(PropertyKey::ItemLevelRequirement);
    required <= owner.properties().int(PropertyKey::CharacterLevel)
}
