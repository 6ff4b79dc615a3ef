//! Analyze command: upload a dataset and review the detected actions

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::*;

use super::{load_config, print_actions, run_analysis};
use crate::backend::{BackendSession, HttpDirectoryBackend, SessionConfig};
use crate::dataset::Dataset;
use crate::run::{ImportRun, ImportStatus};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Configuration file
    #[arg(short, long)]
    pub config: PathBuf,
    /// Spreadsheet to analyze (CSV or Excel)
    #[arg(short, long)]
    pub file: PathBuf,
    /// Only show actions of these types (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub types: Vec<String>,
    /// Suppress progress and log output
    #[arg(short, long)]
    pub quiet: bool,
}

pub async fn handle(args: AnalyzeArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let dataset = Dataset::load(&args.file)?;
    let raw_file = std::fs::read(&args.file)
        .with_context(|| format!("could not read {}", args.file.display()))?;

    let backend = Arc::new(HttpDirectoryBackend::new(&config.backend_url));
    let session = BackendSession::new(backend, SessionConfig::default());
    session.start();

    let mut run = ImportRun::new(&config.disabled_action_types);
    run_analysis(&session, &config, &dataset, &raw_file, &mut run, !args.quiet).await;
    session.stop();

    if run.status == ImportStatus::Error {
        bail!("analysis failed: {}", run.message);
    }

    if !args.types.is_empty() {
        run.set_type_filter(args.types.iter().map(String::as_str));
    }

    println!();
    print_actions(&run);
    println!();

    let disabled = run
        .detected_actions
        .iter()
        .filter(|i| run.is_disabled(i))
        .count();
    println!(
        "{} actions detected, {} selected, {} disabled by configuration",
        run.detected_actions.len().to_string().bold(),
        run.selected_count().to_string().green(),
        disabled.to_string().red()
    );

    if let Some(summary) = &run.analysis_summary {
        if !summary.reconciles(&[]) {
            println!(
                "{} summary counts do not add up to the reported total",
                "warning:".yellow().bold()
            );
        }
    }

    Ok(())
}
