//! Command-line interface

pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::analyze::AnalyzeArgs;
use commands::export::ExportArgs;
use commands::import::ImportArgs;
use commands::preview::PreviewArgs;
use commands::validate::ValidateArgs;

#[derive(Parser)]
#[command(
    name = "provision-cli",
    about = "Provision directory objects from spreadsheet data",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a configuration's attribute mapping
    Validate(ValidateArgs),
    /// Preview mapped attribute values against the first dataset row
    Preview(PreviewArgs),
    /// Upload a dataset and review the detected actions
    Analyze(AnalyzeArgs),
    /// Analyze, confirm, and execute the detected actions
    Import(ImportArgs),
    /// Re-export a saved JSON run report as CSV, JSON, or text
    Export(ExportArgs),
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Validate(args) => commands::validate::handle(args),
        Commands::Preview(args) => commands::preview::handle(args),
        Commands::Analyze(args) => commands::analyze::handle(args).await,
        Commands::Import(args) => commands::import::handle(args).await,
        Commands::Export(args) => commands::export::handle(args),
    }
}
