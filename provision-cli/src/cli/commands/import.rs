//! Import command: analyze, confirm, execute, and report

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::*;
use dialoguer::Confirm;

use super::{drive_run, load_config, print_actions, run_analysis};
use crate::backend::{BackendSession, ExecuteRequest, HttpDirectoryBackend, SessionConfig};
use crate::dataset::Dataset;
use crate::export::{ExportFormat, RunReport};
use crate::run::{AggregatorConfig, ImportRun, ImportStatus, ProgressAggregator};

#[derive(Args)]
pub struct ImportArgs {
    /// Configuration file
    #[arg(short, long)]
    pub config: PathBuf,
    /// Spreadsheet to import (CSV or Excel)
    #[arg(short, long)]
    pub file: PathBuf,
    /// Only execute actions of these types (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub types: Vec<String>,
    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
    /// Write a run report to this path after execution
    #[arg(long)]
    pub report: Option<PathBuf>,
    /// Report format: csv, json, or text
    #[arg(long, default_value = "csv")]
    pub format: String,
    /// Suppress progress and log output
    #[arg(short, long)]
    pub quiet: bool,
}

pub async fn handle(args: ImportArgs) -> Result<()> {
    let format: ExportFormat = args
        .format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let config = load_config(&args.config)?;
    let dataset = Dataset::load(&args.file)?;
    let raw_file = std::fs::read(&args.file)
        .with_context(|| format!("could not read {}", args.file.display()))?;

    let backend = Arc::new(HttpDirectoryBackend::new(&config.backend_url));
    let session = BackendSession::new(backend, SessionConfig::default());
    session.start();

    let mut run = ImportRun::new(&config.disabled_action_types);
    run_analysis(&session, &config, &dataset, &raw_file, &mut run, !args.quiet).await;

    if run.status == ImportStatus::Error {
        session.stop();
        bail!("analysis failed: {}", run.message);
    }

    if !args.types.is_empty() {
        run.set_type_filter(args.types.iter().map(String::as_str));
    }

    println!();
    print_actions(&run);
    println!();

    let selected: Vec<_> = run.selected_actions().into_iter().cloned().collect();
    if selected.is_empty() {
        session.stop();
        println!("nothing selected, nothing to do");
        return Ok(());
    }

    if !args.yes {
        let proceed = Confirm::new()
            .with_prompt(format!("Execute {} actions against the directory?", selected.len()))
            .default(false)
            .interact()
            .context("confirmation prompt failed")?;
        if !proceed {
            session.stop();
            println!("aborted");
            return Ok(());
        }
    }

    let generation = run.begin_import();
    let push_rx = session.subscribe();
    let mut ui_rx = ProgressAggregator::new(AggregatorConfig::default()).spawn(push_rx);

    let request = ExecuteRequest {
        config_name: config.name.clone(),
        actions: selected,
    };
    if let Err(err) = session.execute(&request).await {
        session.stop();
        bail!("import failed to start: {:#}", err);
    }

    drive_run(
        &mut run,
        generation,
        &mut ui_rx,
        session.import_timeout(),
        |status| status.is_run_finished(),
        !args.quiet,
    )
    .await;
    session.release_subscriber();
    session.stop();

    print_result(&run);

    if let Some(report_path) = &args.report {
        let result = run.result.clone().unwrap_or_default();
        let report = RunReport::new(
            &config.name,
            &dataset.file_name,
            result.summary,
            result.details,
            run.logs.clone(),
        );
        report.write(report_path, format)?;
        println!("report written to {}", report_path.display());
    }

    if run.status == ImportStatus::Error {
        bail!("import failed: {}", run.message);
    }
    Ok(())
}

fn print_result(run: &ImportRun) {
    println!();
    let status = match run.status {
        ImportStatus::Completed => run.status.label().green().bold(),
        ImportStatus::CompletedWithErrors => run.status.label().yellow().bold(),
        _ => run.status.label().red().bold(),
    };
    println!("{}", status);

    let Some(result) = &run.result else { return };

    let errors = result.summary.effective_error_count(&result.details);
    let mut counts = Vec::new();
    for (label, value) in [
        ("created", result.summary.create_count),
        ("updated", result.summary.update_count),
        ("deleted", result.summary.delete_count),
        ("moved", result.summary.move_count),
    ] {
        if let Some(value) = value {
            counts.push(format!("{} {}", value, label));
        }
    }
    if !counts.is_empty() {
        println!("  {}", counts.join(", "));
    }
    if errors > 0 {
        println!("  {} {}", errors.to_string().red(), "failed");
        for detail in result.details.iter().filter(|d| !d.success) {
            println!(
                "    {} {}: {}",
                crate::actions::display(&detail.action_type).name,
                detail.object_name,
                detail.message.red()
            );
        }
    }

    if !result.summary.reconciles(&result.details) {
        println!(
            "{} summary counts do not add up to the reported total",
            "warning:".yellow().bold()
        );
    }
}
