//! Content loaders for reading combat data from files.
//!
//! Every loader has a `parse` entry point working on RON text, used for the
//! embedded content, and a `load` entry point reading a file.

pub mod catalog;
pub mod config;
pub mod curves;
pub mod factory;

pub use catalog::{CatalogLoader, ConditionFile, PowerFile};
pub use config::ConfigLoader;
pub use curves::{CurveFile, CurveLoader};
pub use factory::ContentFactory;

use std::path::Path;

use anyhow::Context;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Reads a whole data file.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
