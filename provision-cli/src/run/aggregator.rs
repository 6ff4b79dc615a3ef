//! Progress/log aggregation between the push channel and the UI
//!
//! The backend pushes progress ticks and log lines far faster than a UI wants
//! to repaint. This relay coalesces progress bursts to a bounded rate (latest
//! value wins, terminal statuses always delivered) and batches log lines on a
//! fixed timer, preserving arrival order. It performs no business branching.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, interval};

use super::events::{AnalysisPayload, ImportPayload, LogEntry, ProgressEvent, PushEvent};
use super::state::ImportStatus;

/// Timer settings for the aggregator.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Minimum interval between forwarded progress ticks (latest wins).
    pub progress_interval: Duration,
    /// Fixed interval at which buffered log lines are flushed.
    pub log_flush_interval: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            progress_interval: Duration::from_millis(200),
            log_flush_interval: Duration::from_millis(500),
        }
    }
}

/// Events republished to the UI at a bounded rate.
#[derive(Debug, Clone)]
pub enum UiEvent {
    Progress(ProgressEvent),
    LogBatch(Vec<LogEntry>),
    AnalysisComplete(AnalysisPayload),
    ImportComplete(ImportPayload),
    Error { message: String },
}

/// Rate-limiting relay between the raw push channel and UI consumers.
pub struct ProgressAggregator {
    config: AggregatorConfig,
}

impl ProgressAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    /// Spawn the relay task. The returned receiver yields the bounded stream;
    /// it closes once the input channel closes and all buffers are flushed.
    pub fn spawn(self, input: mpsc::UnboundedReceiver<PushEvent>) -> mpsc::UnboundedReceiver<UiEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(relay(self.config, input, tx));
        rx
    }
}

async fn relay(
    config: AggregatorConfig,
    mut input: mpsc::UnboundedReceiver<PushEvent>,
    output: mpsc::UnboundedSender<UiEvent>,
) {
    let mut pending_progress: Option<ProgressEvent> = None;
    let mut last_progress_emit: Option<Instant> = None;
    let mut log_buffer: Vec<LogEntry> = Vec::new();

    let mut progress_tick = interval(config.progress_interval);
    let mut log_tick = interval(config.log_flush_interval);

    loop {
        tokio::select! {
            event = input.recv() => {
                let Some(event) = event else { break };
                match event {
                    PushEvent::Log(entry) => log_buffer.push(entry),
                    PushEvent::Progress(progress) => {
                        let terminal = ImportStatus::from_wire(&progress.status)
                            .map(|s| s.is_terminal())
                            .unwrap_or(false);
                        if terminal {
                            // Terminal ticks bypass the limiter and supersede
                            // anything pending; flush logs so no line arrives
                            // after the final status.
                            pending_progress = None;
                            let _ = output.send(UiEvent::Progress(progress));
                            flush_logs(&mut log_buffer, &output);
                            last_progress_emit = Some(Instant::now());
                        } else if last_progress_emit
                            .map(|t| t.elapsed() >= config.progress_interval)
                            .unwrap_or(true)
                        {
                            let _ = output.send(UiEvent::Progress(progress));
                            last_progress_emit = Some(Instant::now());
                            pending_progress = None;
                        } else {
                            pending_progress = Some(progress);
                        }
                    }
                    PushEvent::AnalysisComplete(payload) => {
                        pending_progress = None;
                        flush_logs(&mut log_buffer, &output);
                        let _ = output.send(UiEvent::AnalysisComplete(payload));
                    }
                    PushEvent::ImportComplete(payload) => {
                        pending_progress = None;
                        flush_logs(&mut log_buffer, &output);
                        let _ = output.send(UiEvent::ImportComplete(payload));
                    }
                    PushEvent::Error { message } => {
                        pending_progress = None;
                        flush_logs(&mut log_buffer, &output);
                        let _ = output.send(UiEvent::Error { message });
                    }
                }
            }
            _ = progress_tick.tick() => {
                if let Some(progress) = pending_progress.take() {
                    let _ = output.send(UiEvent::Progress(progress));
                    last_progress_emit = Some(Instant::now());
                }
            }
            _ = log_tick.tick() => {
                flush_logs(&mut log_buffer, &output);
            }
        }
    }

    // Input closed: drain whatever is left.
    if let Some(progress) = pending_progress.take() {
        let _ = output.send(UiEvent::Progress(progress));
    }
    flush_logs(&mut log_buffer, &output);
}

fn flush_logs(buffer: &mut Vec<LogEntry>, output: &mpsc::UnboundedSender<UiEvent>) {
    if !buffer.is_empty() {
        let _ = output.send(UiEvent::LogBatch(std::mem::take(buffer)));
    }
}
