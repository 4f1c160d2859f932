//! List the powers of a content set

use anyhow::Result;
use clap::Parser;
use console::style;
use std::path::PathBuf;

use crate::utils::load_content;

/// List the powers of a content set
#[derive(Parser, Debug)]
pub struct ListPowers {
    /// Content directory (defaults to the embedded content set)
    #[arg(short, long, value_name = "DIR")]
    data: Option<PathBuf>,
}

impl ListPowers {
    pub fn execute(self) -> Result<()> {
        let content = load_content(self.data.as_deref())?;

        let mut powers: Vec<_> = content.catalog.powers().collect();
        powers.sort_by_key(|power| power.id);

        for power in powers {
            println!(
                "{:>6}  {:<20} {:?}, range {}, {} condition(s)",
                style(power.id.0).cyan(),
                power.name,
                power.targeting,
                power.range,
                power.conditions.len()
            );
        }
        Ok(())
    }
}
