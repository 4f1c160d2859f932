use combat_core::{CombatConfig, CurveTable, DefinitionCatalog};

use crate::loaders::{CatalogLoader, ConfigLoader, CurveLoader, LoadResult};
use crate::validate::{CatalogError, validate_catalog};

const POWERS: &str = include_str!("../data/powers.ron");
const CONDITIONS: &str = include_str!("../data/conditions.ron");
const CURVES: &str = include_str!("../data/curves.ron");
const CONFIG: &str = include_str!("../data/config.ron");

/// Everything a world needs to resolve powers: definitions, curves and
/// configuration.
#[derive(Clone, Debug)]
pub struct Content {
    pub catalog: DefinitionCatalog,
    pub curves: CurveTable,
    pub config: CombatConfig,
}

impl Content {
    /// The content set compiled into this crate.
    pub fn embedded() -> LoadResult<Self> {
        Ok(Self {
            catalog: CatalogLoader::parse(POWERS, CONDITIONS)?,
            curves: CurveLoader::parse(CURVES)?,
            config: ConfigLoader::parse(CONFIG)?,
        })
    }

    pub fn validate(&self) -> Vec<CatalogError> {
        validate_catalog(&self.catalog, &self.curves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_content_loads_and_validates() {
        let content = Content::embedded().expect("embedded content should load");
        assert!(content.catalog.power_count() >= 5);
        assert!(!content.curves.is_empty());
        assert_eq!(content.validate(), Vec::new());
    }
}
