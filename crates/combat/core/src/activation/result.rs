use bitflags::bitflags;

use crate::state::{EntityId, PowerId, TimeMs, Vector3};

/// Outcome of an activation eligibility check.
///
/// Rejections are expected outcomes handed back to the command layer, which
/// decides whether to notify the player, retry later or drop the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PowerUseResult {
    Success,
    AbilityMissing,
    OwnerNotSimulated,
    OwnerNotInWorld,
    PowerInProgress,
    MinimumReactivateTime,
    ItemUseRestricted,
    OutOfPosition,
    BadTarget,
    RestrictiveCondition,
    PrerequisiteFailed,
    GenericError,
    ExtraActivationFailed,
    RegionRestricted,
    Cooldown,
    InsufficientResource,
}

impl PowerUseResult {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// Outcome of the positional part of validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InPositionResult {
    Success,
    OutOfRange,
    NoPowerLos,
    BadTargetPosition,
    Error,
}

impl InPositionResult {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(
        feature = "serde",
        derive(serde::Serialize, serde::Deserialize),
        serde(transparent)
    )]
    pub struct ActivationFlags: u8 {
        /// Position was already validated (e.g. by a client-side prediction check).
        const SKIP_POSITION_CHECK = 1 << 0;
        const IGNORE_COOLDOWN     = 1 << 1;
        /// Requested by AI or a proc, not by a player command.
        const AUTO_ACTIVATED      = 1 << 2;
    }
}

/// Activation request as issued by the command layer.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActivationRequest {
    pub power: PowerId,
    pub target: Option<EntityId>,
    pub target_position: Vector3,
    pub flags: ActivationFlags,
    pub now: TimeMs,
}

impl ActivationRequest {
    pub fn new(power: PowerId, now: TimeMs) -> Self {
        Self {
            power,
            target: None,
            target_position: Vector3::ZERO,
            flags: ActivationFlags::empty(),
            now,
        }
    }

    pub fn at_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn at_position(mut self, position: Vector3) -> Self {
        self.target_position = position;
        self
    }

    pub fn with_flags(mut self, flags: ActivationFlags) -> Self {
        self.flags |= flags;
        self
    }
}
