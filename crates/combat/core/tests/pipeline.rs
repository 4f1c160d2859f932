//! End-to-end activation and damage scenarios against the sandbox world.

mod common;

use combat_core::power::{DamageProfile, HealingProfile};
use combat_core::{
    ActivationRequest, CombatConfig, DamageType, EntityId, InPositionResult, KeywordId,
    KeywordSet, PowerDefinition, PowerFlags, PowerId, PowerUseResult, PropertyId, PropertyKey,
    TargetingStyle, TimeMs, can_activate_power, is_in_position_for_power,
};
use combat_core::{CombatEntity, Env, PcgRng, Rank, ResultFlags, Vector3, WorldOracle};

use common::{ATTACKER, Arena, BYSTANDER, DEFENDER, application};

const STRIKE: PowerId = PowerId(1);
const SLASH: KeywordId = KeywordId(4);

fn strike() -> PowerDefinition {
    PowerDefinition::new(STRIKE, "strike")
        .with_targeting(TargetingStyle::SingleTarget)
        .with_range(20.0)
        .with_damage(DamageProfile::flat(DamageType::Physical, 100.0))
}

// ============================================================================
// Damage scenarios
// ============================================================================

#[test]
fn plain_hit_deals_exact_base_damage() {
    let arena = Arena::new(CombatConfig::default()).with_power(strike(), 1);
    let payload = arena.payload(&application(STRIKE, 7)).expect("payload");
    let results = arena.results(&payload, DEFENDER, TimeMs(0)).expect("results");

    assert_eq!(results.damage_of(DamageType::Physical), 100.0);
    assert_eq!(results.damage_of(DamageType::Energy), 0.0);
    assert_eq!(results.damage_of(DamageType::Mental), 0.0);
    assert!(!results.is_critical());
    assert!(results.is_hostile);
}

#[test]
fn guaranteed_crit_doubles_plain_hit() {
    let mut config = CombatConfig::default();
    config.crit_damage_multiplier = 2.0;
    config.super_crit_damage_multiplier = 2.0;
    let definition = strike()
        .with_keywords(KeywordSet::from_keywords([SLASH]))
        .with_flags(PowerFlags::CAN_CRIT);
    let mut arena = Arena::new(config).with_power(definition, 1);
    arena.entity_mut(ATTACKER).properties.set_flag(
        PropertyId::new(PropertyKey::CritAlwaysOnKeywordAttack, u32::from(SLASH.0)),
        true,
    );

    for seed in 0..16 {
        let payload = arena.payload(&application(STRIKE, seed)).expect("payload");
        let results = arena.results(&payload, DEFENDER, TimeMs(0)).expect("results");
        assert!(results.is_critical());
        assert_eq!(results.damage_of(DamageType::Physical), 200.0);
    }
}

#[test]
fn oversized_crit_level_override_saturates() {
    let mut config = CombatConfig::default();
    config.crit_damage_multiplier = 2.0;
    config.super_crit_damage_multiplier = 2.0;
    let definition = strike()
        .with_keywords(KeywordSet::from_keywords([SLASH]))
        .with_flags(PowerFlags::CAN_CRIT);
    let mut arena = Arena::new(config).with_power(definition, 1);
    let attacker = &mut arena.entity_mut(ATTACKER).properties;
    attacker.set_flag(
        PropertyId::new(PropertyKey::CritAlwaysOnKeywordAttack, u32::from(SLASH.0)),
        true,
    );
    // Worth +50% crit damage at level 0, nothing at the highest level.
    attacker.set_real(PropertyKey::CritDamageRating, 1000.0);
    attacker.set_int(PropertyKey::CritLevelOverride, 1_i64 << 32);

    let payload = arena.payload(&application(STRIKE, 12)).expect("payload");
    let results = arena.results(&payload, DEFENDER, TimeMs(0)).expect("results");
    assert!(results.is_critical());
    assert_eq!(results.damage_of(DamageType::Physical), 200.0);
}

#[test]
fn variance_stays_within_bounds() {
    let arena = Arena::new(CombatConfig::default()).with_power(strike().with_variance(0.2), 1);
    for seed in 0..64 {
        let payload = arena.payload(&application(STRIKE, seed)).expect("payload");
        let results = arena.results(&payload, DEFENDER, TimeMs(0)).expect("results");
        let damage = results.damage_of(DamageType::Physical);
        assert!((80.0..=120.0).contains(&damage), "seed {seed}: {damage}");
    }
}

#[test]
fn modifier_stacking_never_goes_negative() {
    let mut arena = Arena::new(CombatConfig::default()).with_power(strike(), 1);
    let attacker = &mut arena.entity_mut(ATTACKER).properties;
    attacker.set_real(PropertyId::new(PropertyKey::DamageMult, DamageType::ANY_PARAM), -3.0);
    attacker.set_real(PropertyId::new(PropertyKey::DamagePct, DamageType::ANY_PARAM), -5.0);
    attacker.set_real(PropertyKey::WeakenPct, 2.0);

    let payload = arena.payload(&application(STRIKE, 1)).expect("payload");
    let results = arena.results(&payload, DEFENDER, TimeMs(0)).expect("results");
    assert_eq!(results.damage_of(DamageType::Physical), 0.0);
}

#[test]
fn identical_snapshot_and_seed_are_deterministic() {
    let definition = strike()
        .with_variance(0.5)
        .with_flags(PowerFlags::CAN_CRIT);
    let mut arena = Arena::new(CombatConfig::default()).with_power(definition, 3);
    arena
        .entity_mut(ATTACKER)
        .properties
        .set_real(PropertyKey::CritRating, 800.0);

    let payload = arena.payload(&application(STRIKE, 0xdead_beef)).expect("payload");
    let first = arena.results(&payload, DEFENDER, TimeMs(0)).expect("results");
    let second = arena.results(&payload, DEFENDER, TimeMs(0)).expect("results");
    assert_eq!(first, second);

    let rebuilt = arena.payload(&application(STRIKE, 0xdead_beef)).expect("payload");
    assert_eq!(rebuilt, payload);
    assert_eq!(
        arena.results(&rebuilt, DEFENDER, TimeMs(0)).expect("results"),
        first
    );
}

#[test]
fn owner_changes_after_snapshot_do_not_leak_into_results() {
    let mut arena = Arena::new(CombatConfig::default()).with_power(strike(), 1);
    let payload = arena.payload(&application(STRIKE, 3)).expect("payload");
    let before = arena.results(&payload, DEFENDER, TimeMs(0)).expect("results");

    arena.entity_mut(ATTACKER).properties.set_real(
        PropertyId::new(PropertyKey::DamagePct, DamageType::ANY_PARAM),
        4.0,
    );
    let defender_position = arena.world.get(DEFENDER).expect("defender").position;
    arena.entity_mut(ATTACKER).position = defender_position;

    let after = arena.results(&payload, DEFENDER, TimeMs(50)).expect("results");
    assert_eq!(before.damage, after.damage);
}

#[test]
fn dodged_hit_deals_nothing() {
    let mut arena = Arena::new(CombatConfig::default()).with_power(strike(), 1);
    arena
        .entity_mut(DEFENDER)
        .properties
        .set_real(PropertyKey::DodgeChancePct, 1.0);
    let payload = arena.payload(&application(STRIKE, 9)).expect("payload");
    let results = arena.results(&payload, DEFENDER, TimeMs(0)).expect("results");
    assert!(results.flags.contains(ResultFlags::DODGED));
    assert_eq!(results.total_damage(), 0.0);
}

#[test]
fn batch_skips_missing_targets_without_aborting() {
    let arena = Arena::new(CombatConfig::default()).with_power(strike(), 1);
    let payload = arena.payload(&application(STRIKE, 5)).expect("payload");
    let results = arena.batch(&payload, &[DEFENDER, EntityId(99), BYSTANDER], TimeMs(0));

    let targets: Vec<EntityId> = results.iter().map(|r| r.target).collect();
    assert_eq!(targets, vec![DEFENDER, BYSTANDER]);
    assert!(results.iter().all(|r| r.damage_of(DamageType::Physical) == 100.0));
}

// ============================================================================
// Target scaling
// ============================================================================

#[test]
fn boss_resistance_mitigation_is_capped_but_vulnerability_is_not() {
    let mut arena = Arena::new(CombatConfig::default()).with_power(strike(), 1);
    arena
        .entity_mut(ATTACKER)
        .properties
        .set_real(PropertyKey::MetaGameBossPenetration, 0.25);

    for (resistance, expected) in [
        (0.75, 50.0),
        (2.0, 0.0),
        (0.1, 100.0),
        (-0.5, 150.0),
        (-3.0, 400.0),
    ] {
        arena
            .entity_mut(DEFENDER)
            .properties
            .set_real(PropertyKey::MetaGameBossResistance, resistance);
        let payload = arena.payload(&application(STRIKE, 2)).expect("payload");
        let results = arena.results(&payload, DEFENDER, TimeMs(0)).expect("results");
        assert_eq!(
            results.damage_of(DamageType::Physical),
            expected,
            "resistance {resistance}"
        );
    }
}

#[test]
fn dynamic_level_scaling_leaves_client_damage_unscaled() {
    let mut config = CombatConfig::default();
    config.health_per_level_factor = 0.5;
    let mut arena = Arena::new(config).with_power(strike(), 1);
    arena
        .entity_mut(ATTACKER)
        .properties
        .set_int(PropertyKey::CombatLevel, 6);
    let defender = &mut arena.entity_mut(DEFENDER).properties;
    defender.set_int(PropertyKey::CombatLevel, 2);
    defender.set_real(PropertyKey::HealthMax, 1000.0);

    // 1000 health at level 2 is 2000 at level 6, so damage halves.
    let payload = arena.payload(&application(STRIKE, 4)).expect("payload");
    let results = arena.results(&payload, DEFENDER, TimeMs(0)).expect("results");
    assert_eq!(results.damage_of(DamageType::Physical), 50.0);
    assert_eq!(results.damage_for_client[DamageType::Physical.index()], 100.0);

    // Player targets are never scaled.
    arena.entity_mut(DEFENDER).player = true;
    let results = arena.results(&payload, DEFENDER, TimeMs(0)).expect("results");
    assert_eq!(results.damage_of(DamageType::Physical), 100.0);
}

#[test]
fn boss_bonuses_apply_only_to_boss_ranks() {
    let mut arena = Arena::new(CombatConfig::default()).with_power(strike(), 1);
    let attacker = &mut arena.entity_mut(ATTACKER).properties;
    attacker.set_real(PropertyKey::DamagePctVsBoss, 0.5);
    // Rating equal to the rating scale converts to 50% at level 0.
    attacker.set_real(PropertyKey::DamageRatingVsBoss, 1000.0);
    arena.entity_mut(DEFENDER).rank = Rank::Boss;

    let payload = arena.payload(&application(STRIKE, 6)).expect("payload");
    let boss = arena.results(&payload, DEFENDER, TimeMs(0)).expect("results");
    let normal = arena.results(&payload, BYSTANDER, TimeMs(0)).expect("results");
    assert_eq!(boss.damage_of(DamageType::Physical), 200.0);
    assert_eq!(normal.damage_of(DamageType::Physical), 100.0);
}

#[test]
fn healing_adds_max_health_share_and_doubles_base_when_flagged() {
    const MEND: PowerId = PowerId(2);
    let mend = |flags: PowerFlags| {
        PowerDefinition::new(MEND, "mend")
            .with_range(20.0)
            .with_flags(flags)
            .with_healing(HealingProfile {
                base: 40.0,
                base_curve: None,
                max_health_pct: 0.25,
            })
    };
    for (flags, expected) in [
        (PowerFlags::empty(), 290.0),
        (PowerFlags::DOUBLE_BASE_HEALING, 330.0),
    ] {
        let mut arena = Arena::new(CombatConfig::default()).with_power(mend(flags), 1);
        arena
            .entity_mut(DEFENDER)
            .properties
            .set_real(PropertyKey::HealthMax, 1000.0);
        let payload = arena.payload(&application(MEND, 8)).expect("payload");
        let results = arena.results(&payload, DEFENDER, TimeMs(0)).expect("results");
        assert_eq!(results.healing, expected, "{flags:?}");
    }
}

#[test]
fn pass_through_properties_reach_target_and_user_results() {
    let mut arena = Arena::new(CombatConfig::default()).with_power(strike(), 1);
    let attacker = &mut arena.entity_mut(ATTACKER).properties;
    attacker.set_flag(PropertyKey::NoLootDrop, true);
    attacker.set_int(PropertyKey::RecursionDepth, 2);
    attacker.set_real(
        PropertyId::new(PropertyKey::DamagePct, DamageType::ANY_PARAM),
        0.5,
    );

    let payload = arena.payload(&application(STRIKE, 10)).expect("payload");
    let target = arena.results(&payload, DEFENDER, TimeMs(0)).expect("results");

    let env = Env::with_all(
        &arena.catalog,
        &arena.curves,
        &arena.formulas,
        &arena.world,
        &PcgRng,
    )
    .with_config(&arena.config);
    let user = payload
        .calculate_user_results(&env.as_combat_env(), TimeMs(0))
        .expect("user results");

    for results in [&target, &user] {
        assert!(results.properties.flag(PropertyKey::NoLootDrop));
        assert_eq!(results.properties.int(PropertyKey::RecursionDepth), 2);
        assert!(results.properties.contains(PropertyKey::CreatorPowerAsset));
        assert!(!results.properties.contains(PropertyId::new(
            PropertyKey::DamagePct,
            DamageType::ANY_PARAM
        )));
    }
}

// ============================================================================
// Activation scenarios
// ============================================================================

#[test]
fn out_of_range_target_is_rejected_before_any_payload() {
    let mut arena = Arena::new(CombatConfig::default()).with_power(strike(), 1);
    arena.entity_mut(DEFENDER).position = Vector3::new(100.0, 0.0, 0.0);

    let env = Env::with_all(
        &arena.catalog,
        &arena.curves,
        &arena.formulas,
        &arena.world,
        &PcgRng,
    )
    .with_config(&arena.config);
    let env = env.as_combat_env();

    let owner = arena.world.get(ATTACKER).expect("attacker");
    let target: &dyn CombatEntity = arena.world.get(DEFENDER).expect("defender");
    let definition = arena.catalog.powers().next().expect("strike");
    assert_eq!(
        is_in_position_for_power(&env, owner, definition, Some(target), target.position()),
        InPositionResult::OutOfRange
    );

    let mut powers = arena
        .world
        .powers(ATTACKER)
        .expect("attacker powers")
        .clone();
    let request = ActivationRequest::new(STRIKE, TimeMs(0)).at_target(DEFENDER);
    assert_eq!(
        can_activate_power(&env, ATTACKER, &mut powers, &request),
        PowerUseResult::OutOfPosition
    );
    assert_eq!(powers.get(STRIKE).and_then(|p| p.last_activation), None);
}

#[test]
fn in_range_activation_succeeds() {
    let arena = Arena::new(CombatConfig::default()).with_power(strike(), 1);
    let env = Env::with_all(
        &arena.catalog,
        &arena.curves,
        &arena.formulas,
        &arena.world,
        &PcgRng,
    );
    let mut powers = arena
        .world
        .powers(ATTACKER)
        .expect("attacker powers")
        .clone();
    let request = ActivationRequest::new(STRIKE, TimeMs(0)).at_target(DEFENDER);
    assert_eq!(
        can_activate_power(&env.as_combat_env(), ATTACKER, &mut powers, &request),
        PowerUseResult::Success
    );
}
