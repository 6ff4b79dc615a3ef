//! Wire payloads pushed by the directory backend during analysis and import

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::actions::normalize_value;

/// Severity of a pushed log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl LogLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Error => "ERROR",
            Self::Success => "OK",
        }
    }
}

/// One log line pushed by the backend at any point during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub level: LogLevel,
    pub message: String,
}

/// Progress tick: a status string plus a percentage and user-facing message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub status: String,
    #[serde(default)]
    pub progress: f32,
    #[serde(default)]
    pub message: String,
}

/// One detected change as sent by the analysis.
///
/// `action_type` arrives as a string enum value, a numeric code, or a numeric
/// string depending on the backend generation; it is normalized on
/// deserialization so nothing downstream ever sees a raw representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedAction {
    #[serde(deserialize_with = "de_action_type")]
    pub action_type: String,
    #[serde(default)]
    pub object_name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub attributes: Value,
}

/// Aggregate counts reported with analysis and import results. Backends of
/// different vintages omit different fields, so everything is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    #[serde(default)]
    pub total_rows: Option<u64>,
    #[serde(default)]
    pub total_objects: Option<u64>,
    #[serde(default)]
    pub create_count: Option<u64>,
    #[serde(default)]
    pub update_count: Option<u64>,
    #[serde(default)]
    pub delete_count: Option<u64>,
    #[serde(default)]
    pub move_count: Option<u64>,
    #[serde(default)]
    pub success_count: Option<u64>,
    #[serde(default)]
    pub error_count: Option<u64>,
}

impl RunSummary {
    /// Per-category counts that were actually reported.
    fn category_counts(&self) -> Vec<u64> {
        [
            self.create_count,
            self.update_count,
            self.delete_count,
            self.move_count,
            self.error_count,
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Check that reported counts are internally consistent.
    ///
    /// When per-category counts and a total are both present, the categories
    /// must sum to the total. Backends that omit category detail are checked
    /// against counts derived from the details array instead; with nothing to
    /// compare, the summary passes.
    pub fn reconciles(&self, details: &[ActionOutcome]) -> bool {
        let categories = self.category_counts();
        if let Some(total) = self.total_objects {
            if !categories.is_empty() {
                return categories.iter().sum::<u64>() == total;
            }
        }

        if !details.is_empty() {
            let derived_errors = details.iter().filter(|d| !d.success).count() as u64;
            let derived_successes = details.len() as u64 - derived_errors;
            let errors_match = self.error_count.is_none_or(|n| n == derived_errors);
            let successes_match = self.success_count.is_none_or(|n| n == derived_successes);
            return errors_match && successes_match;
        }

        true
    }

    /// Error count, falling back to the details array when absent.
    pub fn effective_error_count(&self, details: &[ActionOutcome]) -> u64 {
        self.error_count
            .unwrap_or_else(|| details.iter().filter(|d| !d.success).count() as u64)
    }
}

/// Terminal analysis payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisPayload {
    #[serde(default)]
    pub actions: Vec<DetectedAction>,
    #[serde(default)]
    pub summary: RunSummary,
    #[serde(default)]
    pub csv_data: Vec<Value>,
}

/// Per-action outcome inside an import result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    #[serde(deserialize_with = "de_action_type")]
    pub action_type: String,
    #[serde(default)]
    pub object_name: String,
    #[serde(default)]
    pub path: String,
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Terminal import payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPayload {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub summary: RunSummary,
    #[serde(default)]
    pub details: Vec<ActionOutcome>,
}

/// Any event the push channel can deliver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PushEvent {
    Progress(ProgressEvent),
    AnalysisComplete(AnalysisPayload),
    ImportComplete(ImportPayload),
    Log(LogEntry),
    Error { message: String },
}

fn de_action_type<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(normalize_value(&value))
}
