//! Run report export
//!
//! Local-only artifact summarizing a finished run: summary counts, per-action
//! outcomes, and the collected log lines, written as CSV, JSON, or plain text.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actions::display;
use crate::run::{ActionOutcome, LogEntry, RunSummary};

/// Output format of the report artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Text,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            other => Err(format!("unknown export format '{}'", other)),
        }
    }
}

/// Everything the artifact records about one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub config_name: String,
    pub file_name: String,
    pub timestamp: DateTime<Utc>,
    pub summary: RunSummary,
    pub details: Vec<ActionOutcome>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

impl RunReport {
    pub fn new(
        config_name: &str,
        file_name: &str,
        summary: RunSummary,
        details: Vec<ActionOutcome>,
        logs: Vec<LogEntry>,
    ) -> Self {
        Self {
            config_name: config_name.to_string(),
            file_name: file_name.to_string(),
            timestamp: Utc::now(),
            summary,
            details,
            logs,
        }
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read report: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse report: {}", path.display()))
    }

    /// Render the per-action table as CSV. Column order is fixed:
    /// type, object, path, status, message.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(["type", "object", "path", "status", "message"])
            .context("Failed to write CSV header")?;

        for detail in &self.details {
            let status = if detail.success { "success" } else { "error" };
            writer
                .write_record([
                    display(&detail.action_type).name.as_str(),
                    detail.object_name.as_str(),
                    detail.path.as_str(),
                    status,
                    detail.message.as_str(),
                ])
                .with_context(|| format!("Failed to write row for {}", detail.object_name))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e))?;
        String::from_utf8(bytes).context("CSV output was not valid UTF-8")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize report")
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Import report for {} ({})\n",
            self.config_name, self.file_name
        ));
        out.push_str(&format!("Generated: {}\n\n", self.timestamp.to_rfc3339()));

        let summary = &self.summary;
        let mut counts = Vec::new();
        for (label, value) in [
            ("total", summary.total_objects.or(summary.total_rows)),
            ("created", summary.create_count),
            ("updated", summary.update_count),
            ("deleted", summary.delete_count),
            ("moved", summary.move_count),
            ("errors", summary.error_count),
        ] {
            if let Some(value) = value {
                counts.push(format!("{} {}", value, label));
            }
        }
        if !counts.is_empty() {
            out.push_str(&format!("Summary: {}\n\n", counts.join(", ")));
        }

        for detail in &self.details {
            let status = if detail.success { "OK" } else { "FAILED" };
            out.push_str(&format!(
                "[{}] {} {} ({})",
                status,
                display(&detail.action_type).name,
                detail.object_name,
                detail.path
            ));
            if !detail.message.is_empty() {
                out.push_str(&format!(": {}", detail.message));
            }
            out.push('\n');
        }

        if !self.logs.is_empty() {
            out.push_str("\nLogs:\n");
            for entry in &self.logs {
                match entry.timestamp {
                    Some(ts) => out.push_str(&format!(
                        "{} [{}] {}\n",
                        ts.to_rfc3339(),
                        entry.level.label(),
                        entry.message
                    )),
                    None => {
                        out.push_str(&format!("[{}] {}\n", entry.level.label(), entry.message))
                    }
                }
            }
        }

        out
    }

    /// Write the artifact to disk in the requested format.
    pub fn write(&self, path: &Path, format: ExportFormat) -> Result<()> {
        let contents = match format {
            ExportFormat::Csv => self.to_csv()?,
            ExportFormat::Json => self.to_json()?,
            ExportFormat::Text => self.to_text(),
        };
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        log::info!("report exported to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::LogLevel;

    fn sample_report() -> RunReport {
        RunReport::new(
            "students",
            "students.csv",
            RunSummary {
                total_objects: Some(2),
                create_count: Some(1),
                update_count: Some(1),
                ..Default::default()
            },
            vec![
                ActionOutcome {
                    action_type: "CREATE_USER".to_string(),
                    object_name: "jdupont".to_string(),
                    path: "OU=Students,DC=school,DC=org".to_string(),
                    success: true,
                    message: String::new(),
                },
                ActionOutcome {
                    action_type: "UPDATE_USER".to_string(),
                    object_name: "mcurie".to_string(),
                    path: "OU=Students,DC=school,DC=org".to_string(),
                    success: false,
                    message: "attribute write denied".to_string(),
                },
            ],
            vec![LogEntry {
                timestamp: None,
                level: LogLevel::Info,
                message: "analysis started".to_string(),
            }],
        )
    }

    #[test]
    fn test_csv_column_order() {
        let csv_text = sample_report().to_csv().unwrap();
        let mut lines = csv_text.lines();
        assert_eq!(lines.next().unwrap(), "type,object,path,status,message");
        let first = lines.next().unwrap();
        assert!(first.starts_with("Create user,jdupont,"));
        assert!(first.contains(",success,"));
        let second = lines.next().unwrap();
        assert!(second.contains(",error,"));
        assert!(second.contains("attribute write denied"));
    }

    #[test]
    fn test_json_round_trip() {
        let report = sample_report();
        let json_text = report.to_json().unwrap();
        let parsed: RunReport = serde_json::from_str(&json_text).unwrap();
        assert_eq!(parsed.config_name, "students");
        assert_eq!(parsed.details.len(), 2);
        assert_eq!(parsed.logs.len(), 1);
    }

    #[test]
    fn test_text_includes_counts_and_failures() {
        let text = sample_report().to_text();
        assert!(text.contains("2 total"));
        assert!(text.contains("[FAILED] Update user mcurie"));
        assert!(text.contains("analysis started"));
    }
}
