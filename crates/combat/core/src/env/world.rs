//! Entity lookup and world geometry, consumed through narrow traits.

use bitflags::bitflags;

use crate::condition::ConditionCollection;
use crate::power::{LosRequirement, PowerCollection};
use crate::property::{PropertyCollection, PropertyKey};
use crate::state::{AllianceId, EntityId, Rank, RegionId, Vector3};

bitflags! {
    /// Movement capabilities used when checking whether an area is clear.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(
        feature = "serde",
        derive(serde::Serialize, serde::Deserialize),
        serde(transparent)
    )]
    pub struct PathFlags: u8 {
        const WALK  = 1 << 0;
        const FLY   = 1 << 1;
        const SWIM  = 1 << 2;
        const PHASE = 1 << 3;
    }
}

/// Read-only view of a live entity.
pub trait CombatEntity {
    fn id(&self) -> EntityId;
    fn position(&self) -> Vector3;
    fn bounds_radius(&self) -> f32;

    /// Actively ticking in a world.
    fn is_simulated(&self) -> bool;
    fn is_in_world(&self) -> bool;

    fn properties(&self) -> &PropertyCollection;
    fn conditions(&self) -> &ConditionCollection;

    fn alliance(&self) -> AllianceId;
    fn rank(&self) -> Rank;

    /// Player avatar.
    fn is_player(&self) -> bool;

    /// Moved by a remote client rather than by the server.
    fn is_directly_controlled(&self) -> bool;

    /// Summoner, creator or wielder.
    fn owner(&self) -> Option<EntityId>;

    fn region(&self) -> Option<RegionId>;

    /// Area effect that applies its power to whoever overlaps it.
    fn is_hotspot(&self) -> bool {
        false
    }

    /// Still inside the hotspot's volume.
    fn overlaps(&self, _hotspot: EntityId) -> bool {
        false
    }

    fn combat_level(&self) -> u32 {
        self.properties().int(PropertyKey::CombatLevel).max(0) as u32
    }

    fn max_health(&self) -> f32 {
        self.properties().real(PropertyKey::HealthMax)
    }
}

/// Entity lookup plus the spatial queries the validator needs.
pub trait WorldOracle: Send + Sync {
    fn entity(&self, id: EntityId) -> Option<&dyn CombatEntity>;

    fn powers(&self, id: EntityId) -> Option<&PowerCollection>;

    fn is_hostile(&self, alliance: AllianceId, other: AllianceId) -> bool;

    fn line_of_sight(&self, from: Vector3, to: Vector3, path: LosRequirement) -> bool;

    /// No blocking geometry or entity inside the circle for the given movement.
    fn is_area_clear(&self, center: Vector3, radius: f32, locomotion: PathFlags) -> bool;
}
