//! Command handlers and the shared run-driving loop

pub mod analyze;
pub mod export;
pub mod import;
pub mod preview;
pub mod validate;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::*;
use tokio::sync::mpsc;

use crate::backend::{AnalysisRequest, BackendSession};
use crate::config::ImportConfig;
use crate::dataset::Dataset;
use crate::run::{
    AggregatorConfig, ImportRun, ImportStatus, LogEntry, LogLevel, ProgressAggregator,
    ProgressEvent, PushEvent, UiEvent,
};

pub(crate) fn load_config(path: &Path) -> Result<ImportConfig> {
    if !path.exists() && path.components().count() == 1 && path.extension().is_none() {
        // Bare names resolve to the platform config directory.
        let named = ImportConfig::default_path(&path.to_string_lossy())?;
        if named.exists() {
            return ImportConfig::load(&named);
        }
    }
    ImportConfig::load(path)
        .with_context(|| format!("could not load configuration from {}", path.display()))
}

/// Feed aggregated UI events into the run until `done` reports the current
/// status as final for this phase, the ceiling expires, or the channel closes.
/// Timeouts and channel loss resolve to a terminal error status so callers
/// never hang.
pub(crate) async fn drive_run(
    run: &mut ImportRun,
    generation: u64,
    ui_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    ceiling: Duration,
    done: impl Fn(ImportStatus) -> bool,
    show_progress: bool,
) {
    let deadline = tokio::time::sleep(ceiling);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => {
                run.apply_event(generation, &PushEvent::Error {
                    message: format!("operation timed out after {}s", ceiling.as_secs()),
                });
                break;
            }
            event = ui_rx.recv() => {
                let Some(event) = event else {
                    run.apply_event(generation, &PushEvent::Error {
                        message: "push channel closed before completion".to_string(),
                    });
                    break;
                };

                match event {
                    UiEvent::Progress(progress) => {
                        if show_progress {
                            print_progress(&progress);
                        }
                        run.apply_event(generation, &PushEvent::Progress(progress));
                    }
                    UiEvent::LogBatch(batch) => {
                        for entry in batch {
                            if show_progress {
                                print_log(&entry);
                            }
                            run.apply_event(generation, &PushEvent::Log(entry));
                        }
                    }
                    UiEvent::AnalysisComplete(payload) => {
                        run.apply_event(generation, &PushEvent::AnalysisComplete(payload));
                    }
                    UiEvent::ImportComplete(payload) => {
                        run.apply_event(generation, &PushEvent::ImportComplete(payload));
                    }
                    UiEvent::Error { message } => {
                        run.apply_event(generation, &PushEvent::Error { message });
                    }
                }

                if done(run.status) {
                    break;
                }
            }
        }
    }
}

/// Upload the dataset and run an analysis attempt to its terminal state.
/// Transport failures land in the run as a terminal error status; inspect
/// `run.status` afterwards.
pub(crate) async fn run_analysis(
    session: &BackendSession,
    config: &ImportConfig,
    dataset: &Dataset,
    raw_file: &[u8],
    run: &mut ImportRun,
    show_progress: bool,
) {
    let generation = run.begin_analysis();
    let push_rx = session.subscribe();
    let mut ui_rx = ProgressAggregator::new(AggregatorConfig::default()).spawn(push_rx);

    run.apply_event(
        generation,
        &PushEvent::Progress(ProgressEvent {
            status: "uploading".to_string(),
            progress: 0.0,
            message: format!("Uploading {}", dataset.file_name),
        }),
    );

    let receipt = match session.upload(&dataset.file_name, raw_file).await {
        Ok(receipt) => receipt,
        Err(err) => {
            run.apply_event(
                generation,
                &PushEvent::Error {
                    message: format!("{:#}", err),
                },
            );
            session.release_subscriber();
            return;
        }
    };

    let request = AnalysisRequest {
        config_name: config.name.clone(),
        upload_id: receipt.upload_id,
        header_mapping: config.header_mapping.clone(),
        disabled_action_types: config.disabled_action_types.clone(),
        account_max_length: config.account_max_length,
    };
    if let Err(err) = session.start_analysis(&request).await {
        run.apply_event(
            generation,
            &PushEvent::Error {
                message: format!("{:#}", err),
            },
        );
        session.release_subscriber();
        return;
    }

    drive_run(
        run,
        generation,
        &mut ui_rx,
        session.analysis_timeout(),
        |status| matches!(status, ImportStatus::Analyzed | ImportStatus::Error),
        show_progress,
    )
    .await;

    session.release_subscriber();
}

fn print_progress(progress: &ProgressEvent) {
    let status = ImportStatus::from_wire(&progress.status)
        .map(|s| s.label())
        .unwrap_or(progress.status.as_str());
    println!(
        "{} {:>5.1}%  {}",
        status.cyan(),
        progress.progress,
        progress.message.dimmed()
    );
}

fn print_log(entry: &LogEntry) {
    let level = match entry.level {
        LogLevel::Info => entry.level.label().normal(),
        LogLevel::Warning => entry.level.label().yellow(),
        LogLevel::Error => entry.level.label().red(),
        LogLevel::Success => entry.level.label().green(),
    };
    println!("  [{}] {}", level, entry.message);
}

/// Print the detected-action table with selection and disabled markers.
pub(crate) fn print_actions(run: &ImportRun) {
    for item in run.visible_actions() {
        let entry = crate::actions::display(&item.action_type);
        let marker = if run.is_disabled(item) {
            "x".red()
        } else if item.selected {
            "*".green()
        } else {
            " ".normal()
        };
        let name = entry.name.color(entry.color);
        println!(
            "[{}] {} {:<28} {:<24} {}",
            marker,
            entry.icon,
            name,
            item.object_name,
            item.path.dimmed()
        );
        if !item.message.is_empty() {
            println!("      {}", item.message.dimmed());
        }
    }
}
