use crate::property::PropertyCollection;
use crate::state::{ConditionId, EntityId, PowerId, TimeMs};

/// A condition on some target that this power is responsible for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackedCondition {
    pub target: EntityId,
    pub condition: ConditionId,
}

/// Per-owner runtime state of one assigned power.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerInstance {
    pub power: PowerId,
    pub rank: u32,
    pub last_activation: Option<TimeMs>,
    pub toggled_on: bool,
    pub executing: bool,
    /// Unlocked by the power this one is an extra activation of.
    pub extra_activation_ready: bool,
    pub source_item: Option<EntityId>,
    /// Per-instance values layered over the definition (bounce count ...).
    pub overrides: PropertyCollection,
    pub tracked_conditions: Vec<TrackedCondition>,
}

impl PowerInstance {
    pub fn new(power: PowerId, rank: u32) -> Self {
        Self {
            power,
            rank,
            last_activation: None,
            toggled_on: false,
            executing: false,
            extra_activation_ready: false,
            source_item: None,
            overrides: PropertyCollection::new(),
            tracked_conditions: Vec::new(),
        }
    }

    pub fn with_source_item(mut self, item: EntityId) -> Self {
        self.source_item = Some(item);
        self
    }

    /// Milliseconds since the last activation; `None` if never activated.
    pub fn elapsed_since_activation(&self, now: TimeMs) -> Option<u64> {
        self.last_activation.map(|at| now.since(at))
    }

    pub fn cooldown_remaining(&self, cooldown_ms: u64, now: TimeMs) -> u64 {
        self.elapsed_since_activation(now)
            .map_or(0, |elapsed| cooldown_ms.saturating_sub(elapsed))
    }

    pub fn is_on_cooldown(&self, cooldown_ms: u64, now: TimeMs) -> bool {
        self.cooldown_remaining(cooldown_ms, now) > 0
    }
}
