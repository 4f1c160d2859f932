use crate::state::{EntityId, PowerId, TimeMs, Vector3};

/// One concrete activation attempt, consumed once to build a payload.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerApplication {
    pub power: PowerId,
    pub user: EntityId,
    pub target: Option<EntityId>,
    pub target_position: Vector3,
    pub user_position: Vector3,
    /// Duration of the movement a movement power performs.
    pub movement_time_ms: u64,
    /// Time a hold-and-release power was held.
    pub variable_activation_time_ms: u64,
    /// Seed for every gameplay roll.
    pub power_seed: u64,
    /// Seed for cosmetic randomness only.
    pub fx_seed: u64,
    /// Entity whose properties stand in for the user's (item or creator).
    pub property_source: Option<EntityId>,
    pub activation_time: TimeMs,
}

impl PowerApplication {
    pub fn new(power: PowerId, user: EntityId, activation_time: TimeMs) -> Self {
        Self {
            power,
            user,
            target: None,
            target_position: Vector3::ZERO,
            user_position: Vector3::ZERO,
            movement_time_ms: 0,
            variable_activation_time_ms: 0,
            power_seed: 0,
            fx_seed: 0,
            property_source: None,
            activation_time,
        }
    }

    pub fn with_target(mut self, target: EntityId, position: Vector3) -> Self {
        self.target = Some(target);
        self.target_position = position;
        self
    }

    pub fn with_target_position(mut self, position: Vector3) -> Self {
        self.target_position = position;
        self
    }

    pub fn with_user_position(mut self, position: Vector3) -> Self {
        self.user_position = position;
        self
    }

    pub fn with_seeds(mut self, power_seed: u64, fx_seed: u64) -> Self {
        self.power_seed = power_seed;
        self.fx_seed = fx_seed;
        self
    }

    pub fn with_movement_time(mut self, movement_time_ms: u64) -> Self {
        self.movement_time_ms = movement_time_ms;
        self
    }

    pub fn with_held_time(mut self, held_ms: u64) -> Self {
        self.variable_activation_time_ms = held_ms;
        self
    }

    pub fn with_property_source(mut self, source: EntityId) -> Self {
        self.property_source = Some(source);
        self
    }
}
