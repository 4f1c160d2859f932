//! Resolve one power against a sandbox target
//!
//! Builds a two-entity sandbox (a player attacker at the origin and a hostile
//! target along the x axis), runs activation validation, snapshots the power
//! payload and prints the per-target and user results as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;

use combat_core::{
    ActivationRequest, AllianceId, EntityId, Env, PcgRng, PowerApplication, PowerId,
    PowerInstance, PowerPayload, SandboxEntity, SandboxWorld, StandardFormulas, TimeMs, Vector3,
    WorldOracle, can_activate_power,
};

use crate::utils::load_content;

const ATTACKER: EntityId = EntityId(1);
const TARGET: EntityId = EntityId(2);

/// Resolve one power against a sandbox target and print the results
#[derive(Parser, Debug)]
pub struct Simulate {
    /// Power to activate
    #[arg(short, long, value_name = "ID")]
    power: u32,

    /// Rank the power is assigned at
    #[arg(short, long, default_value_t = 1)]
    rank: u32,

    /// Seed for every roll of the activation
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Distance between attacker and target
    #[arg(long, default_value_t = 5.0)]
    distance: f32,

    /// Combat level of both entities
    #[arg(long, default_value_t = 10)]
    level: i64,

    /// Content directory (defaults to the embedded content set)
    #[arg(short, long, value_name = "DIR")]
    data: Option<PathBuf>,
}

impl Simulate {
    pub fn execute(self) -> Result<()> {
        let content = load_content(self.data.as_deref())?;
        let power = PowerId(self.power);
        let target_position = Vector3::new(self.distance, 0.0, 0.0);

        let mut world = SandboxWorld::new();
        world.insert(
            SandboxEntity::new(ATTACKER, Vector3::ZERO)
                .player()
                .with_level(self.level, 1000.0),
        );
        world.insert(
            SandboxEntity::new(TARGET, target_position)
                .with_alliance(AllianceId(2))
                .with_level(self.level, 1000.0),
        );
        world
            .powers_mut(ATTACKER)
            .context("attacker has no power collection")?
            .assign(PowerInstance::new(power, self.rank))
            .with_context(|| format!("Failed to assign {power}"))?;

        let formulas = StandardFormulas::new(content.config.clone());
        let now = TimeMs(0);

        let (activation, target_results, user_results) = {
            let env = Env::with_all(&content.catalog, &content.curves, &formulas, &world, &PcgRng)
                .with_config(&content.config);
            let env = env.as_combat_env();

            let mut powers = world
                .powers(ATTACKER)
                .context("attacker has no power collection")?
                .clone();
            let request = ActivationRequest::new(power, now).at_target(TARGET);
            let activation = can_activate_power(&env, ATTACKER, &mut powers, &request);
            if !activation.is_success() {
                println!(
                    "{} Activation rejected: {}",
                    style("✗").red().bold(),
                    activation
                );
                return Ok(());
            }

            let application = PowerApplication::new(power, ATTACKER, now)
                .with_target(TARGET, target_position)
                .with_seeds(self.seed, self.seed);
            let mut payload = PowerPayload::init(&env, &application)?;
            payload.calculate_initial_properties(&env)?;

            let target_results = payload
                .calculate_results_for_targets(&env, &[TARGET], now)
                .into_iter()
                .next();
            let user_results = payload.calculate_user_results(&env, now)?;
            (activation, target_results, user_results)
        };

        let mut added = 0;
        if let Some(results) = &target_results {
            let report = world
                .conditions_mut(TARGET)
                .context("target has no condition collection")?
                .apply_results(results, now);
            added += report.added.len();
        }
        let report = world
            .conditions_mut(ATTACKER)
            .context("attacker has no condition collection")?
            .apply_results(&user_results, now);
        added += report.added.len();
        tracing::info!(%power, conditions_added = added, "simulation applied");

        let output = serde_json::json!({
            "activation": activation,
            "target": target_results,
            "user": user_results,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
