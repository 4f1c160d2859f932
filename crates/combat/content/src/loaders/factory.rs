//! Content factory for loading a whole data directory.

use std::path::{Path, PathBuf};

use combat_core::{CombatConfig, CurveTable, DefinitionCatalog};

use crate::content::Content;
use crate::loaders::{CatalogLoader, ConfigLoader, CurveLoader, LoadResult};

/// Loads combat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.ron      (optional)
/// ├── conditions.ron
/// ├── curves.ron
/// └── powers.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Loads `config.ron`, or the default configuration if the file is absent.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        let path = self.data_dir.join("config.ron");
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(CombatConfig::default());
        }
        ConfigLoader::load(&path)
    }

    pub fn load_curves(&self) -> LoadResult<CurveTable> {
        CurveLoader::load(&self.data_dir.join("curves.ron"))
    }

    pub fn load_catalog(&self) -> LoadResult<DefinitionCatalog> {
        CatalogLoader::load(
            &self.data_dir.join("powers.ron"),
            &self.data_dir.join("conditions.ron"),
        )
    }

    /// Loads every content file.
    pub fn load(&self) -> LoadResult<Content> {
        Ok(Content {
            catalog: self.load_catalog()?,
            curves: self.load_curves()?,
            config: self.load_config()?,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }
}
