//! Load and validate a content directory
//!
//! Loading catches syntax errors and duplicate ids; validation then reports
//! every dangling condition, power or curve reference.

use anyhow::Result;
use clap::Parser;
use console::style;
use std::path::PathBuf;

use combat_core::CombatError;

use crate::utils::load_content;

/// Load and validate a content directory
#[derive(Parser, Debug)]
pub struct CheckCatalog {
    /// Content directory (defaults to the embedded content set)
    #[arg(short, long, value_name = "DIR")]
    data: Option<PathBuf>,
}

impl CheckCatalog {
    pub fn execute(self) -> Result<()> {
        let content = load_content(self.data.as_deref())?;
        tracing::info!(
            powers = content.catalog.power_count(),
            conditions = content.catalog.condition_count(),
            curves = content.curves.len(),
            "content loaded"
        );

        let errors = content.validate();
        if errors.is_empty() {
            println!("{} Catalog is consistent", style("✓").green().bold());
            return Ok(());
        }

        for error in &errors {
            println!(
                "{} [{}] {}",
                style("✗").red().bold(),
                style(error.error_code()).dim(),
                error
            );
        }
        anyhow::bail!("{} validation error(s)", errors.len())
    }
}
