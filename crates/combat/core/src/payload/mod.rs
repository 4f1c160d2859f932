//! Power payload: the frozen calculation context of one activation.
//!
//! A payload is built once per activation. [`PowerPayload::init`] copies
//! everything the calculation reads out of the live entities into an owned
//! [`PropertyCollection`]; [`PowerPayload::calculate_initial_properties`] then
//! computes the target-independent numbers exactly once, and
//! [`PowerPayload::calculate_power_results`] derives one [`PowerResults`] per
//! target from that snapshot.
//!
//! Nothing in the payload refers back into live entity state, so moving or
//! re-buffing the owner between two targets cannot change the outcome.
//!
//! [`PowerResults`]: crate::results::PowerResults

mod conditions;
mod error;
mod initial;
mod target;

pub use error::PayloadError;

use arrayvec::ArrayVec;

use crate::config::CombatConfig;
use crate::env::{CombatEntity, CombatEnv, OracleError};
use crate::formula::FormulaContext;
use crate::power::{PowerApplication, PowerDefinition, PowerFlags};
use crate::property::{PropertyCollection, PropertyId, PropertyKey, PropertyValue};
use crate::state::{AllianceId, EntityId, KeywordId, KeywordSet, PowerId, TimeMs, Vector3};

use initial::InitialValues;

/// Owned snapshot of one activation.
#[derive(Clone, Debug, PartialEq)]
pub struct PowerPayload {
    power: PowerId,
    rank: u32,
    owner: EntityId,
    ultimate_owner: EntityId,
    /// Ultimate owner when it is a player; invalid otherwise.
    creator_player: EntityId,
    alliance: AllianceId,
    owner_position: Vector3,
    target: Option<EntityId>,
    target_position: Vector3,
    power_seed: u64,
    fx_seed: u64,
    combat_level: u32,
    keywords: KeywordSet,
    flags: PowerFlags,
    is_player_sourced: bool,
    owner_directly_controlled: bool,
    from_hotspot: bool,
    movement_time_ms: u64,
    variable_activation_time_ms: u64,
    activation_time: TimeMs,
    /// Rating granted by same-keyword powers on cooldown at activation.
    keyword_cooldown_rating: f32,
    properties: PropertyCollection,
    initial: Option<InitialValues>,
}

impl PowerPayload {
    /// Snapshots the owner, target and power state for one activation.
    ///
    /// ## Errors
    /// - `OwnerNotFound` if the owner cannot be resolved
    /// - `NoPropertySource` if the property source (owner, or the item or
    ///   creator named by the application) cannot be resolved
    /// - `Oracle` if the catalog or world oracle is missing, or the power is
    ///   not in the catalog
    pub fn init(env: &CombatEnv<'_>, application: &PowerApplication) -> Result<Self, PayloadError> {
        let world = env.world()?;
        let definition = env
            .catalog()?
            .power(application.power)
            .ok_or(OracleError::PowerNotFound(application.power))?;

        let owner = world
            .entity(application.user)
            .ok_or(PayloadError::OwnerNotFound(application.user))?;
        let source_id = application.property_source.unwrap_or(application.user);
        let Some(source) = world.entity(source_id) else {
            tracing::warn!(
                power = %application.power,
                source = %source_id,
                "payload property source not found"
            );
            return Err(PayloadError::NoPropertySource {
                power: application.power,
                source_entity: source_id,
            });
        };

        let ultimate = resolve_ultimate_owner(env, owner);
        let is_player_sourced = ultimate.is_player();
        let instance = world
            .powers(owner.id())
            .and_then(|powers| powers.get(application.power));
        let rank = instance.map_or(0, |instance| instance.rank);
        let combat_level = source.combat_level();

        let (target, target_position) = match application.target {
            Some(id) => match world.entity(id) {
                Some(entity) => (Some(id), entity.position()),
                None => (Some(id), application.target_position),
            },
            None => (None, application.target_position),
        };

        let mut payload = Self {
            power: application.power,
            rank,
            owner: owner.id(),
            ultimate_owner: ultimate.id(),
            creator_player: if is_player_sourced {
                ultimate.id()
            } else {
                EntityId::INVALID
            },
            alliance: ultimate.alliance(),
            owner_position: owner.position(),
            target,
            target_position,
            power_seed: application.power_seed,
            fx_seed: application.fx_seed,
            combat_level,
            keywords: definition.keywords,
            flags: definition.flags,
            is_player_sourced,
            owner_directly_controlled: owner.is_directly_controlled(),
            from_hotspot: owner.is_hotspot(),
            movement_time_ms: application.movement_time_ms,
            variable_activation_time_ms: application.variable_activation_time_ms,
            activation_time: application.activation_time,
            keyword_cooldown_rating: 0.0,
            properties: PropertyCollection::new(),
            initial: None,
        };

        payload
            .properties
            .copy_keys_from(source.properties(), PropertyKey::OWNER_SNAPSHOT);
        payload.copy_definition_properties(definition);

        let ctx = FormulaContext::new(source.properties())
            .with_rank(rank)
            .with_combat_level(combat_level);
        let ctx = match env.curves() {
            Ok(curves) => ctx.with_curves(curves),
            Err(_) => ctx,
        };
        for property in &definition.properties {
            let value = property.formula.evaluate_or_zero(&ctx, "power property");
            payload.properties.set_real(property.id(), value);
        }

        if let Some(instance) = instance {
            payload.properties.merge(&instance.overrides);
        }

        payload.seed_bounce(definition);
        payload.keyword_cooldown_rating = payload.snapshot_keyword_cooldowns(env, definition);

        if !definition.has(PowerFlags::FIXED_MOVEMENT_DURATION)
            && definition.movement_speed_override > 0.0
        {
            payload
                .properties
                .set_real(PropertyKey::MovementSpeedOverride, definition.movement_speed_override);
        }

        tracing::trace!(
            power = %payload.power,
            owner = %payload.owner,
            ultimate_owner = %payload.ultimate_owner,
            rank,
            combat_level,
            "payload initialized"
        );
        Ok(payload)
    }

    /// Writes the definition's numbers into the snapshot.
    fn copy_definition_properties(&mut self, definition: &PowerDefinition) {
        let props = &mut self.properties;
        for damage in &definition.damage {
            let param = damage.damage_type.param();
            props.add_real(PropertyId::new(PropertyKey::DamageBase, param), damage.base);
            props.add_real(
                PropertyId::new(PropertyKey::DamageBasePerLevel, param),
                damage.per_level,
            );
            props.add_real(
                PropertyId::new(PropertyKey::DamageBaseUnmodified, param),
                damage.unmodified,
            );
            props.add_real(
                PropertyId::new(PropertyKey::DamageBaseUnmodifiedPerRank, param),
                damage.unmodified_per_rank,
            );
            props.add_real(
                PropertyId::new(PropertyKey::DamageBasePerSecondHeld, param),
                damage.per_second_held,
            );
        }
        props.set_real(PropertyKey::DamageVariance, definition.damage_variance);
        props.set_real(PropertyKey::DamageTuningScore, definition.tuning_score);

        props.set_real(PropertyKey::HealingBase, definition.healing.base);
        props.set_real(PropertyKey::HealingBasePct, definition.healing.max_health_pct);

        for change in &definition.endurance_change {
            props.add_real(
                PropertyId::new(PropertyKey::EnduranceChange, change.mana.param()),
                change.amount,
            );
        }
        props.set_real(
            PropertyKey::SecondaryResourceChange,
            definition.secondary_resource_change,
        );
        props.set(
            PropertyKey::CreatorPowerAsset,
            PropertyValue::Asset(u64::from(definition.id.0)),
        );
    }

    /// Seeds the bounce state when the power bounces. Instance overrides of
    /// the remaining count win over the definition.
    fn seed_bounce(&mut self, definition: &PowerDefinition) {
        let Some(bounce) = definition.bounce else {
            return;
        };
        let count = if self.properties.contains(PropertyKey::BounceCountRemaining) {
            self.properties.int(PropertyKey::BounceCountRemaining)
        } else {
            i64::from(bounce.count)
        };
        if count <= 0 {
            return;
        }
        let props = &mut self.properties;
        props.set_int(PropertyKey::BounceCountRemaining, count);
        props.set_real(PropertyKey::BounceRange, bounce.range);
        props.set_real(PropertyKey::BounceSpeed, bounce.speed);
        props.set_flag(PropertyKey::BounceIgnoreRangeCheck, bounce.ignore_range_check);
        if let Some(target) = self.target {
            props.set(PropertyKey::BounceFirstTarget, PropertyValue::Entity(target));
        }
    }

    /// Rating from `DamageRatingPerKeywordCooldown`, for each keyword of this
    /// power, times the ultimate owner's powers of that keyword on cooldown.
    fn snapshot_keyword_cooldowns(&self, env: &CombatEnv<'_>, definition: &PowerDefinition) -> f32 {
        let per_keyword: Vec<(KeywordId, f32)> = self
            .properties
            .params(PropertyKey::DamageRatingPerKeywordCooldown)
            .filter_map(|(param, value)| {
                let keyword = KeywordId(u8::try_from(param).ok()?);
                definition
                    .keywords
                    .contains(keyword)
                    .then_some((keyword, value.as_real()))
            })
            .collect();
        if per_keyword.is_empty() {
            return 0.0;
        }
        let (Ok(world), Ok(catalog)) = (env.world(), env.catalog()) else {
            return 0.0;
        };
        let Some(powers) = world
            .powers(self.ultimate_owner)
            .or_else(|| world.powers(self.owner))
        else {
            return 0.0;
        };
        per_keyword
            .into_iter()
            .map(|(keyword, rating)| {
                rating
                    * powers.count_on_cooldown_with_keyword(catalog, keyword, self.activation_time)
                        as f32
            })
            .sum()
    }

    // ========================================================================
    // Bounce chains
    // ========================================================================

    /// Retargets the payload for the next bounce, consuming one bounce.
    ///
    /// Every frozen calculation value is reused; only the target changes.
    pub fn begin_bounce(
        &mut self,
        next_target: EntityId,
        position: Vector3,
    ) -> Result<(), PayloadError> {
        let remaining = self.properties.int(PropertyKey::BounceCountRemaining);
        if remaining <= 0 {
            return Err(PayloadError::NoBouncesRemaining(self.power));
        }
        self.properties
            .set_int(PropertyKey::BounceCountRemaining, remaining - 1);
        self.target = Some(next_target);
        self.target_position = position;
        Ok(())
    }

    pub fn bounces_remaining(&self) -> u32 {
        u32::try_from(self.properties.int(PropertyKey::BounceCountRemaining)).unwrap_or(0)
    }

    pub fn bounce_range(&self) -> f32 {
        self.properties.real(PropertyKey::BounceRange)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn power(&self) -> PowerId {
        self.power
    }

    pub fn rank(&self) -> u32 {
        self.rank
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn ultimate_owner(&self) -> EntityId {
        self.ultimate_owner
    }

    pub fn owner_position(&self) -> Vector3 {
        self.owner_position
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn target_position(&self) -> Vector3 {
        self.target_position
    }

    pub fn combat_level(&self) -> u32 {
        self.combat_level
    }

    pub fn is_player_sourced(&self) -> bool {
        self.is_player_sourced
    }

    pub fn fx_seed(&self) -> u64 {
        self.fx_seed
    }

    pub fn properties(&self) -> &PropertyCollection {
        &self.properties
    }

    pub fn is_calculated(&self) -> bool {
        self.initial.is_some()
    }

    fn definition<'a>(&self, env: &CombatEnv<'a>) -> Result<&'a PowerDefinition, PayloadError> {
        Ok(env
            .catalog()?
            .power(self.power)
            .ok_or(OracleError::PowerNotFound(self.power))?)
    }

    fn config<'a>(&self, env: &CombatEnv<'a>) -> &'a CombatConfig {
        env.config()
    }
}

/// Follows owner links up to the controlling entity.
///
/// Stops at the first unresolvable link, at a cycle, or after
/// [`CombatConfig::MAX_OWNER_CHAIN`] hops.
fn resolve_ultimate_owner<'a>(
    env: &CombatEnv<'a>,
    owner: &'a dyn CombatEntity,
) -> &'a dyn CombatEntity {
    let Ok(world) = env.world() else {
        return owner;
    };
    let mut visited: ArrayVec<EntityId, { CombatConfig::MAX_OWNER_CHAIN }> = ArrayVec::new();
    let mut current = owner;
    while let Some(next_id) = current.owner() {
        if visited.contains(&next_id) || visited.try_push(current.id()).is_err() {
            tracing::warn!(entity = %owner.id(), "owner chain too long or cyclic");
            break;
        }
        match world.entity(next_id) {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{DefinitionCatalog, Env, PcgRng, SandboxEntity, SandboxWorld, StandardFormulas};
    use crate::formula::{CurveTable, Formula, PropertyFormula};
    use crate::power::{BounceProfile, DamageProfile, PowerInstance};
    use crate::property::DamageType;

    struct Fixture {
        catalog: DefinitionCatalog,
        curves: CurveTable,
        formulas: StandardFormulas,
        world: SandboxWorld,
        rng: PcgRng,
    }

    impl Fixture {
        fn new(definition: PowerDefinition) -> Self {
            let mut catalog = DefinitionCatalog::new();
            catalog.insert_power(definition).unwrap();
            let mut world = SandboxWorld::new();
            world.insert(SandboxEntity::new(EntityId(1), Vector3::ZERO).player());
            world.insert(SandboxEntity::new(EntityId(2), Vector3::new(5.0, 0.0, 0.0)));
            Self {
                catalog,
                curves: CurveTable::new(),
                formulas: StandardFormulas::default(),
                world,
                rng: PcgRng,
            }
        }

        fn init(&self, application: &PowerApplication) -> Result<PowerPayload, PayloadError> {
            let env = Env::with_all(
                &self.catalog,
                &self.curves,
                &self.formulas,
                &self.world,
                &self.rng,
            );
            PowerPayload::init(&env.as_combat_env(), application)
        }
    }

    fn bolt() -> PowerDefinition {
        PowerDefinition::new(PowerId(1), "bolt")
            .with_damage(DamageProfile::flat(DamageType::Energy, 40.0))
            .with_range(30.0)
    }

    #[test]
    fn snapshot_is_independent_of_live_owner() {
        let mut fixture = Fixture::new(bolt());
        fixture
            .world
            .get_mut(EntityId(1))
            .unwrap()
            .properties
            .set_real(PropertyKey::DamageRating, 200.0);
        let application = PowerApplication::new(PowerId(1), EntityId(1), TimeMs(0))
            .with_target(EntityId(2), Vector3::ZERO);
        let payload = fixture.init(&application).unwrap();

        fixture
            .world
            .get_mut(EntityId(1))
            .unwrap()
            .properties
            .set_real(PropertyKey::DamageRating, 0.0);
        assert_eq!(payload.properties().real(PropertyKey::DamageRating), 200.0);
        assert_eq!(
            payload
                .properties()
                .real(PropertyId::new(PropertyKey::DamageBase, DamageType::Energy.param())),
            40.0
        );
    }

    #[test]
    fn captures_current_target_position() {
        let fixture = Fixture::new(bolt());
        let application = PowerApplication::new(PowerId(1), EntityId(1), TimeMs(0))
            .with_target(EntityId(2), Vector3::new(99.0, 0.0, 0.0));
        let payload = fixture.init(&application).unwrap();
        assert_eq!(payload.target_position(), Vector3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn missing_owner_or_source_fails() {
        let fixture = Fixture::new(bolt());
        let application = PowerApplication::new(PowerId(1), EntityId(9), TimeMs(0));
        assert_eq!(
            fixture.init(&application).unwrap_err(),
            PayloadError::OwnerNotFound(EntityId(9))
        );

        let application = PowerApplication::new(PowerId(1), EntityId(1), TimeMs(0))
            .with_property_source(EntityId(44));
        assert!(matches!(
            fixture.init(&application).unwrap_err(),
            PayloadError::NoPropertySource { .. }
        ));
    }

    #[test]
    fn summons_resolve_their_controller() {
        let mut fixture = Fixture::new(bolt());
        fixture.world.insert(
            SandboxEntity::new(EntityId(3), Vector3::ZERO).with_owner(EntityId(1)),
        );
        fixture.world.insert(
            SandboxEntity::new(EntityId(4), Vector3::ZERO).with_owner(EntityId(3)),
        );
        let application = PowerApplication::new(PowerId(1), EntityId(4), TimeMs(0));
        let payload = fixture.init(&application).unwrap();
        assert_eq!(payload.owner(), EntityId(4));
        assert_eq!(payload.ultimate_owner(), EntityId(1));
        assert!(payload.is_player_sourced());
    }

    #[test]
    fn cyclic_owner_chain_terminates() {
        let mut fixture = Fixture::new(bolt());
        fixture.world.insert(
            SandboxEntity::new(EntityId(5), Vector3::ZERO).with_owner(EntityId(6)),
        );
        fixture.world.insert(
            SandboxEntity::new(EntityId(6), Vector3::ZERO).with_owner(EntityId(5)),
        );
        let application = PowerApplication::new(PowerId(1), EntityId(5), TimeMs(0));
        assert!(fixture.init(&application).is_ok());
    }

    #[test]
    fn bounce_state_is_seeded_and_consumed() {
        let definition = bolt().with_bounce(BounceProfile {
            count: 2,
            range: 12.0,
            speed: 30.0,
            ignore_range_check: false,
        });
        let fixture = Fixture::new(definition);
        let application = PowerApplication::new(PowerId(1), EntityId(1), TimeMs(0))
            .with_target(EntityId(2), Vector3::ZERO);
        let mut payload = fixture.init(&application).unwrap();
        assert_eq!(payload.bounces_remaining(), 2);
        assert_eq!(payload.bounce_range(), 12.0);
        assert_eq!(
            payload.properties().entity(PropertyKey::BounceFirstTarget),
            Some(EntityId(2))
        );

        payload.begin_bounce(EntityId(7), Vector3::new(1.0, 1.0, 0.0)).unwrap();
        payload.begin_bounce(EntityId(8), Vector3::new(2.0, 1.0, 0.0)).unwrap();
        assert_eq!(payload.target(), Some(EntityId(8)));
        assert_eq!(
            payload.begin_bounce(EntityId(9), Vector3::ZERO).unwrap_err(),
            PayloadError::NoBouncesRemaining(PowerId(1))
        );
    }

    #[test]
    fn fixed_duration_movement_skips_speed_override() {
        let definition = bolt()
            .with_knockback(10.0, 20.0)
            .with_flags(PowerFlags::FIXED_MOVEMENT_DURATION);
        let fixture = Fixture::new(definition);
        let payload = fixture
            .init(&PowerApplication::new(PowerId(1), EntityId(1), TimeMs(0)))
            .unwrap();
        assert!(!payload.properties().contains(PropertyKey::MovementSpeedOverride));

        let fixture = Fixture::new(bolt().with_knockback(10.0, 20.0));
        let payload = fixture
            .init(&PowerApplication::new(PowerId(1), EntityId(1), TimeMs(0)))
            .unwrap();
        assert_eq!(payload.properties().real(PropertyKey::MovementSpeedOverride), 20.0);
    }

    #[test]
    fn definition_formulas_and_instance_overrides_apply() {
        let definition = bolt().with_property(PropertyFormula::new(
            PropertyId::plain(PropertyKey::DamagePct),
            Formula::Product(vec![Formula::PowerRank, Formula::Constant(0.1)]),
        ));
        let mut fixture = Fixture::new(definition);
        let mut instance = PowerInstance::new(PowerId(1), 3);
        instance.overrides.set_real(PropertyKey::WeakenPct, 0.25);
        fixture
            .world
            .powers_mut(EntityId(1))
            .unwrap()
            .assign(instance)
            .unwrap();
        let payload = fixture
            .init(&PowerApplication::new(PowerId(1), EntityId(1), TimeMs(0)))
            .unwrap();
        assert_eq!(payload.rank(), 3);
        assert!((payload.properties().real(PropertyKey::DamagePct) - 0.3).abs() < 1e-6);
        assert_eq!(payload.properties().real(PropertyKey::WeakenPct), 0.25);
    }
}
