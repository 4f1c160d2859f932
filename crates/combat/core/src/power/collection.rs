use std::collections::BTreeMap;

use super::definition::{PowerDefinition, PowerFlags};
use super::instance::{PowerInstance, TrackedCondition};
use crate::env::DefinitionOracle;
use crate::error::{CombatError, ErrorSeverity};
use crate::state::{ConditionId, EntityId, KeywordId, PowerId, TimeMs};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PowerError {
    #[error("power {0} already assigned")]
    AlreadyAssigned(PowerId),

    #[error("power {0} not assigned")]
    NotAssigned(PowerId),
}

impl CombatError for PowerError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyAssigned(_) => "POWER_ALREADY_ASSIGNED",
            Self::NotAssigned(_) => "POWER_NOT_ASSIGNED",
        }
    }
}

/// Result of unassigning a power.
#[derive(Clone, Debug, PartialEq)]
pub struct Unassigned {
    pub instance: PowerInstance,
    /// Conditions the caller must remove from their targets.
    pub cancel: Vec<TrackedCondition>,
}

/// Powers assigned to one entity. Only the owning entity mutates it.
#[derive(Clone, Debug, Default)]
pub struct PowerCollection {
    powers: BTreeMap<PowerId, PowerInstance>,
}

impl PowerCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.powers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.powers.is_empty()
    }

    pub fn contains(&self, power: PowerId) -> bool {
        self.powers.contains_key(&power)
    }

    pub fn get(&self, power: PowerId) -> Option<&PowerInstance> {
        self.powers.get(&power)
    }

    pub fn get_mut(&mut self, power: PowerId) -> Option<&mut PowerInstance> {
        self.powers.get_mut(&power)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PowerInstance> {
        self.powers.values()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn assign(&mut self, instance: PowerInstance) -> Result<&mut PowerInstance, PowerError> {
        match self.powers.entry(instance.power) {
            std::collections::btree_map::Entry::Occupied(_) => {
                Err(PowerError::AlreadyAssigned(instance.power))
            }
            std::collections::btree_map::Entry::Vacant(slot) => Ok(slot.insert(instance)),
        }
    }

    /// Removes a power. Tracked conditions are returned for cancellation when
    /// the definition cancels its conditions on unassign.
    pub fn unassign(&mut self, definition: &PowerDefinition) -> Result<Unassigned, PowerError> {
        let mut instance = self
            .powers
            .remove(&definition.id)
            .ok_or(PowerError::NotAssigned(definition.id))?;
        let cancel = if definition.has(PowerFlags::CANCEL_CONDITIONS_ON_UNASSIGN) {
            std::mem::take(&mut instance.tracked_conditions)
        } else {
            Vec::new()
        };
        Ok(Unassigned { instance, cancel })
    }

    /// Stamps an activation: restarts the cooldown clock, marks non-toggle
    /// powers as executing and flips toggles.
    pub fn begin_activation(
        &mut self,
        definition: &PowerDefinition,
        now: TimeMs,
    ) -> Result<(), PowerError> {
        let instance = self
            .powers
            .get_mut(&definition.id)
            .ok_or(PowerError::NotAssigned(definition.id))?;
        instance.last_activation = Some(now);
        instance.extra_activation_ready = false;
        if definition.is_toggle() {
            instance.toggled_on = !instance.toggled_on;
        } else {
            instance.executing = true;
        }
        Ok(())
    }

    /// Ends execution. Tracked conditions are returned for cancellation when
    /// the definition cancels its conditions on end.
    pub fn end_execution(
        &mut self,
        definition: &PowerDefinition,
    ) -> Result<Vec<TrackedCondition>, PowerError> {
        let instance = self
            .powers
            .get_mut(&definition.id)
            .ok_or(PowerError::NotAssigned(definition.id))?;
        instance.executing = false;
        if definition.has(PowerFlags::CANCEL_CONDITIONS_ON_END) {
            Ok(std::mem::take(&mut instance.tracked_conditions))
        } else {
            Ok(Vec::new())
        }
    }

    /// Interrupts an executing power without ending its conditions.
    pub fn cancel_execution(&mut self, power: PowerId) -> bool {
        match self.powers.get_mut(&power) {
            Some(instance) if instance.executing => {
                instance.executing = false;
                tracing::debug!(%power, "execution cancelled");
                true
            }
            _ => false,
        }
    }

    /// Unlocks the extra activation `power`.
    pub fn ready_extra_activation(&mut self, power: PowerId) -> Result<(), PowerError> {
        let instance = self
            .powers
            .get_mut(&power)
            .ok_or(PowerError::NotAssigned(power))?;
        instance.extra_activation_ready = true;
        Ok(())
    }

    pub fn track_condition(
        &mut self,
        power: PowerId,
        target: EntityId,
        condition: ConditionId,
    ) -> Result<(), PowerError> {
        let instance = self
            .powers
            .get_mut(&power)
            .ok_or(PowerError::NotAssigned(power))?;
        instance
            .tracked_conditions
            .push(TrackedCondition { target, condition });
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn executing_power(&self) -> Option<PowerId> {
        self.powers
            .values()
            .find(|instance| instance.executing)
            .map(|instance| instance.power)
    }

    /// Number of assigned powers carrying `keyword` that are on cooldown at `now`.
    pub fn count_on_cooldown_with_keyword(
        &self,
        catalog: &dyn DefinitionOracle,
        keyword: KeywordId,
        now: TimeMs,
    ) -> u32 {
        self.powers
            .values()
            .filter(|instance| {
                catalog.power(instance.power).is_some_and(|definition| {
                    definition.keywords.contains(keyword)
                        && instance.is_on_cooldown(definition.cooldown_ms, now)
                })
            })
            .count() as u32
    }
}
