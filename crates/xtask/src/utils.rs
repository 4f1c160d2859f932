//! Utility functions for xtask commands

use anyhow::{Context, Result};
use std::path::Path;

use combat_content::{Content, ContentFactory};

/// Loads content from `data_dir`, or the embedded content set if none is given.
pub fn load_content(data_dir: Option<&Path>) -> Result<Content> {
    match data_dir {
        Some(dir) => {
            if !dir.exists() {
                anyhow::bail!("Data directory does not exist: {}", dir.display());
            }
            ContentFactory::new(dir)
                .load()
                .with_context(|| format!("Failed to load content from {}", dir.display()))
        }
        None => Content::embedded().context("Failed to load embedded content"),
    }
}
