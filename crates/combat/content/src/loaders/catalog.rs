//! Power and condition catalog loader.

use std::path::Path;

use anyhow::Context;
use combat_core::{ConditionDefinition, DefinitionCatalog, PowerDefinition};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Power file structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerFile {
    pub powers: Vec<PowerDefinition>,
}

/// Condition file structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConditionFile {
    pub conditions: Vec<ConditionDefinition>,
}

/// Loader for [`DefinitionCatalog`]s.
pub struct CatalogLoader;

impl CatalogLoader {
    pub fn parse_powers(source: &str) -> LoadResult<Vec<PowerDefinition>> {
        let file: PowerFile = ron::from_str(source).context("failed to parse power RON")?;
        Ok(file.powers)
    }

    pub fn parse_conditions(source: &str) -> LoadResult<Vec<ConditionDefinition>> {
        let file: ConditionFile =
            ron::from_str(source).context("failed to parse condition RON")?;
        Ok(file.conditions)
    }

    /// Builds a catalog: shared conditions first, then powers with their
    /// inline conditions. Any duplicate id fails the whole build.
    pub fn build(
        conditions: Vec<ConditionDefinition>,
        powers: Vec<PowerDefinition>,
    ) -> LoadResult<DefinitionCatalog> {
        let mut catalog = DefinitionCatalog::new();
        for condition in conditions {
            let name = condition.name.clone();
            catalog
                .insert_condition(condition)
                .with_context(|| format!("condition \"{name}\""))?;
        }
        for power in powers {
            let name = power.name.clone();
            catalog
                .insert_power(power)
                .with_context(|| format!("power \"{name}\""))?;
        }
        tracing::debug!(
            powers = catalog.power_count(),
            conditions = catalog.condition_count(),
            "catalog built"
        );
        Ok(catalog)
    }

    /// Parses and builds a catalog from RON text.
    pub fn parse(powers: &str, conditions: &str) -> LoadResult<DefinitionCatalog> {
        Self::build(Self::parse_conditions(conditions)?, Self::parse_powers(powers)?)
    }

    /// Loads a catalog from a power file and a condition file.
    pub fn load(powers_path: &Path, conditions_path: &Path) -> LoadResult<DefinitionCatalog> {
        let conditions = Self::parse_conditions(&read_file(conditions_path)?)
            .with_context(|| format!("in {}", conditions_path.display()))?;
        let powers = Self::parse_powers(&read_file(powers_path)?)
            .with_context(|| format!("in {}", powers_path.display()))?;
        Self::build(conditions, powers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{
        ConditionDefId, DefinitionOracle, PowerFlags, PowerId, StackingStyle, TargetingStyle,
    };

    const POWERS: &str = r#"(
        powers: [
            (
                id: 7,
                name: "Jab",
                targeting: SingleTarget,
                range: 4.0,
                flags: "MELEE | CAN_CRIT",
                keywords: [1],
                damage: [(damage_type: Physical, base: 12.0)],
                conditions: [
                    Reference(20),
                    Mixin((id: 21, name: "Dazed", duration_ms: Constant(500.0))),
                ],
            ),
        ],
    )"#;

    const CONDITIONS: &str = r#"(
        conditions: [
            (
                id: 20,
                name: "Sore",
                flags: "NEGATIVE_STATUS",
                duration_ms: Constant(2000.0),
                stacking: (max_stacks: 3, style: MultiStackAddDuration),
            ),
        ],
    )"#;

    #[test]
    fn parses_powers_and_registers_mixins() {
        let catalog = CatalogLoader::parse(POWERS, CONDITIONS).expect("catalog should build");
        let jab = catalog.power(PowerId(7)).expect("jab");
        assert_eq!(jab.targeting, TargetingStyle::SingleTarget);
        assert!(jab.has(PowerFlags::MELEE | PowerFlags::CAN_CRIT));
        assert_eq!(jab.conditions.len(), 2);

        let sore = catalog.condition(ConditionDefId(20)).expect("sore");
        assert_eq!(sore.stacking.style, StackingStyle::MultiStackAddDuration);
        assert!(catalog.condition(ConditionDefId(21)).is_some());
    }

    #[test]
    fn duplicate_condition_ids_fail() {
        let conditions = r#"(conditions: [(id: 21, name: "Clash")])"#;
        let error = CatalogLoader::parse(POWERS, conditions).expect_err("mixin id collides");
        assert!(format!("{error:#}").contains("Jab"));
    }
}
