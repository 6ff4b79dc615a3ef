//! Preview command: render the mapping against the first dataset row

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use colored::*;

use super::load_config;
use crate::config::well_known_attributes;
use crate::dataset::Dataset;
use crate::mapping::generate_previews;

#[derive(Args)]
pub struct PreviewArgs {
    /// Configuration file holding the mapping
    #[arg(short, long)]
    pub config: PathBuf,
    /// Spreadsheet to take the sample row from (CSV or Excel)
    #[arg(short, long)]
    pub file: PathBuf,
}

pub fn handle(args: PreviewArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let dataset = Dataset::load(&args.file)?;
    if dataset.is_empty() {
        bail!("{} contains no data rows", dataset.file_name);
    }

    let previews = generate_previews(
        &config.header_mapping,
        &dataset.sample_row(),
        &well_known_attributes(),
    );

    println!(
        "Previewing '{}' against the first of {} rows in {}\n",
        config.name,
        dataset.len(),
        dataset.file_name
    );

    let mut invalid = 0;
    for preview in &previews {
        let marker = if preview.is_valid {
            "ok".green()
        } else {
            invalid += 1;
            "!!".red()
        };
        println!(
            "{} {:<28} {:<24} {}",
            marker,
            preview.ad_attribute.cyan(),
            preview.sample_value.dimmed(),
            preview.transformed_value
        );
        if let Some(error) = &preview.error {
            println!("   {} {}", "error:".red(), error);
        }
        for warning in &preview.warnings {
            println!("   {} {}", "warning:".yellow(), warning);
        }
    }

    if invalid > 0 {
        bail!("{} of {} previews failed validation", invalid, previews.len());
    }
    Ok(())
}
