//! Sandbox arena shared by the integration tests.
#![allow(dead_code)]

use combat_core::condition::ApplyReport;
use combat_core::{
    AllianceId, CombatConfig, ConditionDefinition, CurveTable, DefinitionCatalog, EntityId, Env,
    PayloadError, PcgRng, PowerApplication, PowerDefinition, PowerId, PowerInstance,
    PowerPayload, PowerResults, SandboxEntity, SandboxWorld, StandardFormulas, TimeMs, Vector3,
};

pub const ATTACKER: EntityId = EntityId(1);
pub const DEFENDER: EntityId = EntityId(2);
pub const BYSTANDER: EntityId = EntityId(3);

pub struct Arena {
    pub catalog: DefinitionCatalog,
    pub curves: CurveTable,
    pub formulas: StandardFormulas,
    pub config: CombatConfig,
    pub world: SandboxWorld,
}

impl Arena {
    /// Attacker at the origin, hostile defender ten units east.
    pub fn new(config: CombatConfig) -> Self {
        let mut world = SandboxWorld::new();
        world.insert(SandboxEntity::new(ATTACKER, Vector3::ZERO).player());
        world.insert(
            SandboxEntity::new(DEFENDER, Vector3::new(10.0, 0.0, 0.0))
                .with_alliance(AllianceId(2)),
        );
        world.insert(
            SandboxEntity::new(BYSTANDER, Vector3::new(12.0, 0.0, 0.0))
                .with_alliance(AllianceId(2)),
        );
        Self {
            catalog: DefinitionCatalog::new(),
            curves: CurveTable::new(),
            formulas: StandardFormulas::new(config.clone()),
            config,
            world,
        }
    }

    /// Registers `definition` and assigns it to the attacker at `rank`.
    pub fn with_power(mut self, definition: PowerDefinition, rank: u32) -> Self {
        let power = definition.id;
        self.catalog
            .insert_power(definition)
            .expect("power should register");
        self.world
            .powers_mut(ATTACKER)
            .expect("attacker has a power collection")
            .assign(PowerInstance::new(power, rank))
            .expect("power should assign");
        self
    }

    pub fn with_condition(mut self, definition: ConditionDefinition) -> Self {
        self.catalog
            .insert_condition(definition)
            .expect("condition should register");
        self
    }

    pub fn entity_mut(&mut self, id: EntityId) -> &mut SandboxEntity {
        self.world.get_mut(id).expect("entity exists")
    }

    pub fn payload(&self, application: &PowerApplication) -> Result<PowerPayload, PayloadError> {
        let env = Env::with_all(
            &self.catalog,
            &self.curves,
            &self.formulas,
            &self.world,
            &PcgRng,
        )
        .with_config(&self.config);
        let env = env.as_combat_env();
        let mut payload = PowerPayload::init(&env, application)?;
        payload.calculate_initial_properties(&env)?;
        Ok(payload)
    }

    pub fn results(
        &self,
        payload: &PowerPayload,
        target: EntityId,
        now: TimeMs,
    ) -> Result<PowerResults, PayloadError> {
        let env = Env::with_all(
            &self.catalog,
            &self.curves,
            &self.formulas,
            &self.world,
            &PcgRng,
        )
        .with_config(&self.config);
        let env = env.as_combat_env();
        let entity = self.world.get(target).expect("target exists");
        payload.calculate_power_results(&env, entity, true, now)
    }

    pub fn batch(&self, payload: &PowerPayload, targets: &[EntityId], now: TimeMs) -> Vec<PowerResults> {
        let env = Env::with_all(
            &self.catalog,
            &self.curves,
            &self.formulas,
            &self.world,
            &PcgRng,
        )
        .with_config(&self.config);
        payload.calculate_results_for_targets(&env.as_combat_env(), targets, now)
    }

    /// Builds, calculates and applies one hit on the defender.
    pub fn hit(&mut self, power: PowerId, seed: u64, now: TimeMs) -> (PowerResults, ApplyReport) {
        let application = PowerApplication::new(power, ATTACKER, now)
            .with_target(DEFENDER, Vector3::new(10.0, 0.0, 0.0))
            .with_seeds(seed, seed ^ 0xff);
        let payload = self.payload(&application).expect("payload should build");
        let results = self
            .results(&payload, DEFENDER, now)
            .expect("results should calculate");
        let report = self.apply(&results, now);
        (results, report)
    }

    pub fn apply(&mut self, results: &PowerResults, now: TimeMs) -> ApplyReport {
        self.world
            .conditions_mut(results.target)
            .expect("target exists")
            .apply_results(results, now)
    }
}

pub fn application(power: PowerId, seed: u64) -> PowerApplication {
    PowerApplication::new(power, ATTACKER, TimeMs(0))
        .with_target(DEFENDER, Vector3::new(10.0, 0.0, 0.0))
        .with_seeds(seed, 0)
}
