//! Curve table loader.

use std::path::Path;

use anyhow::{Context, bail};
use combat_core::{Curve, CurveTable};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Curve file structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurveFile {
    pub curves: Vec<Curve>,
}

/// Loader for [`CurveTable`]s from RON files.
pub struct CurveLoader;

impl CurveLoader {
    /// Parses a curve file. Duplicate curve ids are rejected.
    pub fn parse(source: &str) -> LoadResult<CurveTable> {
        let file: CurveFile = ron::from_str(source).context("failed to parse curve RON")?;
        let mut table = CurveTable::new();
        for curve in file.curves {
            let id = curve.id;
            if table.insert(curve).is_some() {
                bail!("duplicate curve {id}");
            }
        }
        Ok(table)
    }

    pub fn load(path: &Path) -> LoadResult<CurveTable> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }
}
