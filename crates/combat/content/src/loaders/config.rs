//! Combat configuration loader.

use std::path::Path;

use anyhow::Context;
use combat_core::CombatConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`CombatConfig`] overrides from RON files.
///
/// Fields missing from the file keep their defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn parse(source: &str) -> LoadResult<CombatConfig> {
        ron::from_str(source).context("failed to parse combat config RON")
    }

    /// Loads `path`.
    pub fn load(path: &Path) -> LoadResult<CombatConfig> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_keep_defaults() {
        let config = ConfigLoader::parse("(range_tolerance: 4.0, duplicate_damage_pct_bonus: false)")
            .expect("config should parse");
        assert_eq!(config.range_tolerance, 4.0);
        assert!(!config.duplicate_damage_pct_bonus);
        assert_eq!(
            config.min_finite_duration_ms,
            CombatConfig::DEFAULT_MIN_FINITE_DURATION_MS
        );
    }

    #[test]
    fn mistyped_field_is_an_error() {
        assert!(ConfigLoader::parse("(range_tolerance: \"far\")").is_err());
    }
}
