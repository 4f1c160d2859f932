//! Range, line-of-sight and placement checks.

use super::result::InPositionResult;
use crate::env::{CombatEntity, CombatEnv};
use crate::power::{ActivationType, LosRequirement, PowerDefinition, PowerFlags, TargetingStyle};
use crate::state::Vector3;

/// Checks whether `owner` can reach `target` (or `target_position`) with the power.
///
/// Self-targeted powers, extra activations and owner-centered areas that do
/// not track a primary target always succeed.
pub fn is_in_position_for_power(
    env: &CombatEnv<'_>,
    owner: &dyn CombatEntity,
    definition: &PowerDefinition,
    target: Option<&dyn CombatEntity>,
    target_position: Vector3,
) -> InPositionResult {
    let always_in_position = match definition.targeting {
        TargetingStyle::SelfOnly => true,
        TargetingStyle::SelfCenteredArea {
            tracks_primary_target,
            ..
        } => !tracks_primary_target,
        _ => false,
    } || definition.activation == ActivationType::ExtraActivation;
    if always_in_position {
        return InPositionResult::Success;
    }

    let Ok(world) = env.world() else {
        tracing::warn!(power = %definition.id, "position check without a world oracle");
        return InPositionResult::Error;
    };

    let owner_position = owner.position();
    let mut aim = target.map_or(target_position, |target| target.position());
    if !(aim.x.is_finite() && aim.y.is_finite() && aim.z.is_finite()) {
        return InPositionResult::BadTargetPosition;
    }

    let directional = matches!(definition.targeting, TargetingStyle::Directional { .. });
    if let (true, Some(target)) = (directional, target) {
        let offset = (target.bounds_radius() - env.config().aim_padding).max(0.0);
        let toward_owner = (owner_position - aim).flattened().normalized();
        aim = aim + toward_owner * offset;
    }

    if !definition.has(PowerFlags::MELEE) {
        let ground_targeted = target.is_none() && definition.has(PowerFlags::MOUSE_TARGETED);
        if !ground_targeted {
            let target_radius = match target {
                Some(target) if !directional => target.bounds_radius(),
                _ => 0.0,
            };
            let distance =
                owner_position.distance_2d(aim) - owner.bounds_radius() - target_radius;
            if distance > definition.range + env.config().range_tolerance {
                tracing::trace!(
                    power = %definition.id,
                    distance,
                    range = definition.range,
                    "out of range"
                );
                return InPositionResult::OutOfRange;
            }
        }
    }

    if definition.los != LosRequirement::None
        && !world.line_of_sight(owner_position, aim, definition.los)
    {
        return InPositionResult::NoPowerLos;
    }

    if let Some(summon) = definition.summon {
        if !world.is_area_clear(aim, summon.bounds_radius, summon.locomotion) {
            return InPositionResult::BadTargetPosition;
        }
    }

    InPositionResult::Success
}
