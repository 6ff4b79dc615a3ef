//! Validate command: check a configuration's attribute mapping

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use colored::*;

use super::load_config;
use crate::config::well_known_attributes;
use crate::mapping::{to_display_items, validate};

#[derive(Args)]
pub struct ValidateArgs {
    /// Configuration file to validate
    #[arg(short, long)]
    pub config: PathBuf,
}

pub fn handle(args: ValidateArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let report = validate(&config.header_mapping, &well_known_attributes());

    for item in to_display_items(&config.header_mapping) {
        let columns = if item.estimated_columns.is_empty() {
            "literal".dimmed().to_string()
        } else {
            item.estimated_columns.join(", ")
        };
        println!("{:<28} {:<40} {}", item.ad_attribute.cyan(), item.template, columns);
    }
    println!();

    for error in &report.errors {
        println!("{} {}", "error:".red().bold(), error);
    }
    for warning in &report.warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }

    if !report.is_valid {
        bail!("mapping for '{}' is invalid", config.name);
    }

    println!("{}", "mapping is valid".green());
    Ok(())
}
