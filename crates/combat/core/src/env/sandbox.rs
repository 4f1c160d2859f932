//! In-memory world used by tests and developer tools.
//!
//! Geometry is a flat plane with circular blockers; hostility is "different
//! alliance". Entities and their power collections are plain owned values.

use std::collections::BTreeMap;

use super::world::{CombatEntity, PathFlags, WorldOracle};
use crate::condition::ConditionCollection;
use crate::power::{LosRequirement, PowerCollection};
use crate::property::{PropertyCollection, PropertyKey};
use crate::state::{AllianceId, EntityId, Rank, RegionId, Vector3};

/// Owned entity record.
#[derive(Clone, Debug)]
pub struct SandboxEntity {
    pub id: EntityId,
    pub position: Vector3,
    pub bounds_radius: f32,
    pub simulated: bool,
    pub in_world: bool,
    pub properties: PropertyCollection,
    pub conditions: ConditionCollection,
    pub alliance: AllianceId,
    pub rank: Rank,
    pub player: bool,
    pub directly_controlled: bool,
    pub owner: Option<EntityId>,
    pub region: Option<RegionId>,
    pub hotspot: bool,
    /// Hotspots this entity currently stands in.
    pub overlapping: Vec<EntityId>,
}

impl SandboxEntity {
    pub fn new(id: EntityId, position: Vector3) -> Self {
        Self {
            id,
            position,
            bounds_radius: 0.0,
            simulated: true,
            in_world: true,
            properties: PropertyCollection::new(),
            conditions: ConditionCollection::new(id),
            alliance: AllianceId::default(),
            rank: Rank::Normal,
            player: false,
            directly_controlled: false,
            owner: None,
            region: None,
            hotspot: false,
            overlapping: Vec::new(),
        }
    }

    pub fn player(mut self) -> Self {
        self.player = true;
        self.directly_controlled = true;
        self
    }

    pub fn with_alliance(mut self, alliance: AllianceId) -> Self {
        self.alliance = alliance;
        self
    }

    pub fn with_rank(mut self, rank: Rank) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_bounds(mut self, radius: f32) -> Self {
        self.bounds_radius = radius;
        self
    }

    pub fn with_owner(mut self, owner: EntityId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_level(mut self, level: i64, max_health: f32) -> Self {
        self.properties.set_int(PropertyKey::CombatLevel, level);
        self.properties.set_int(PropertyKey::CharacterLevel, level);
        self.properties.set_real(PropertyKey::HealthMax, max_health);
        self
    }

    pub fn with_properties(mut self, properties: PropertyCollection) -> Self {
        self.properties.merge(&properties);
        self
    }
}

impl CombatEntity for SandboxEntity {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Vector3 {
        self.position
    }

    fn bounds_radius(&self) -> f32 {
        self.bounds_radius
    }

    fn is_simulated(&self) -> bool {
        self.simulated
    }

    fn is_in_world(&self) -> bool {
        self.in_world
    }

    fn properties(&self) -> &PropertyCollection {
        &self.properties
    }

    fn conditions(&self) -> &ConditionCollection {
        &self.conditions
    }

    fn alliance(&self) -> AllianceId {
        self.alliance
    }

    fn rank(&self) -> Rank {
        self.rank
    }

    fn is_player(&self) -> bool {
        self.player
    }

    fn is_directly_controlled(&self) -> bool {
        self.directly_controlled
    }

    fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    fn region(&self) -> Option<RegionId> {
        self.region
    }

    fn is_hotspot(&self) -> bool {
        self.hotspot
    }

    fn overlaps(&self, hotspot: EntityId) -> bool {
        self.overlapping.contains(&hotspot)
    }
}

/// Circular obstacle on the ground plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blocker {
    pub center: Vector3,
    pub radius: f32,
    /// Movement types that can occupy the blocker's area anyway.
    pub passable: PathFlags,
}

#[derive(Clone, Debug, Default)]
pub struct SandboxWorld {
    entities: BTreeMap<EntityId, SandboxEntity>,
    powers: BTreeMap<EntityId, PowerCollection>,
    blockers: Vec<Blocker>,
}

impl SandboxWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: SandboxEntity) {
        self.powers.entry(entity.id).or_default();
        self.entities.insert(entity.id, entity);
    }

    pub fn add_blocker(&mut self, blocker: Blocker) {
        self.blockers.push(blocker);
    }

    pub fn get(&self, id: EntityId) -> Option<&SandboxEntity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut SandboxEntity> {
        self.entities.get_mut(&id)
    }

    pub fn powers_mut(&mut self, id: EntityId) -> Option<&mut PowerCollection> {
        self.powers.get_mut(&id)
    }

    /// Moves an entity's powers out so they can be mutated while the world is
    /// borrowed by an environment.
    pub fn take_powers(&mut self, id: EntityId) -> PowerCollection {
        self.powers.remove(&id).unwrap_or_default()
    }

    pub fn insert_powers(&mut self, id: EntityId, powers: PowerCollection) {
        self.powers.insert(id, powers);
    }

    pub fn conditions_mut(&mut self, id: EntityId) -> Option<&mut ConditionCollection> {
        self.entities.get_mut(&id).map(|entity| &mut entity.conditions)
    }

    /// Distance from the segment `from..to` to `point` on the ground plane.
    fn segment_distance(from: Vector3, to: Vector3, point: Vector3) -> f32 {
        let (from, to, point) = (from.flattened(), to.flattened(), point.flattened());
        let segment = to - from;
        let len_sq = segment.x * segment.x + segment.y * segment.y;
        if len_sq <= f32::EPSILON {
            return from.distance(point);
        }
        let offset = point - from;
        let t = ((offset.x * segment.x + offset.y * segment.y) / len_sq).clamp(0.0, 1.0);
        (from + segment * t).distance(point)
    }
}

impl WorldOracle for SandboxWorld {
    fn entity(&self, id: EntityId) -> Option<&dyn CombatEntity> {
        self.entities
            .get(&id)
            .map(|entity| entity as &dyn CombatEntity)
    }

    fn powers(&self, id: EntityId) -> Option<&PowerCollection> {
        self.powers.get(&id)
    }

    fn is_hostile(&self, alliance: AllianceId, other: AllianceId) -> bool {
        alliance != other
    }

    fn line_of_sight(&self, from: Vector3, to: Vector3, path: LosRequirement) -> bool {
        if path == LosRequirement::None {
            return true;
        }
        self.blockers
            .iter()
            .all(|blocker| Self::segment_distance(from, to, blocker.center) > blocker.radius)
    }

    fn is_area_clear(&self, center: Vector3, radius: f32, locomotion: PathFlags) -> bool {
        self.blockers.iter().all(|blocker| {
            blocker.passable.intersects(locomotion)
                || blocker.center.distance_2d(center) >= blocker.radius + radius
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blockers_cut_line_of_sight() {
        let mut world = SandboxWorld::new();
        world.add_blocker(Blocker {
            center: Vector3::new(5.0, 0.0, 0.0),
            radius: 1.0,
            passable: PathFlags::FLY,
        });
        let from = Vector3::ZERO;
        assert!(!world.line_of_sight(from, Vector3::new(10.0, 0.0, 0.0), LosRequirement::Straight));
        assert!(world.line_of_sight(from, Vector3::new(0.0, 10.0, 0.0), LosRequirement::Ground));
        assert!(world.line_of_sight(from, Vector3::new(10.0, 0.0, 0.0), LosRequirement::None));
    }

    #[test]
    fn area_clear_respects_locomotion() {
        let mut world = SandboxWorld::new();
        world.add_blocker(Blocker {
            center: Vector3::ZERO,
            radius: 2.0,
            passable: PathFlags::FLY,
        });
        assert!(!world.is_area_clear(Vector3::new(1.0, 0.0, 0.0), 1.0, PathFlags::WALK));
        assert!(world.is_area_clear(Vector3::new(1.0, 0.0, 0.0), 1.0, PathFlags::FLY));
        assert!(world.is_area_clear(Vector3::new(10.0, 0.0, 0.0), 1.0, PathFlags::WALK));
    }
}
