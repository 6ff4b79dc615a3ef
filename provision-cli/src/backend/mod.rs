//! Directory backend interface
//!
//! The backend is the external collaborator that actually talks to the
//! directory: it accepts an uploaded dataset, runs analysis, executes a
//! selection of actions, and pushes progress/log events over a long-lived
//! channel. This crate only transforms data and manages run lifecycle.

mod http;
mod session;

pub use http::HttpDirectoryBackend;
pub use session::{BackendSession, SessionConfig};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::actions::ActionItem;
use crate::mapping::HeaderMapping;
use crate::run::PushEvent;

/// Acknowledgement returned by a dataset upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub upload_id: String,
    #[serde(default)]
    pub row_count: Option<u64>,
}

/// Request to analyze an uploaded dataset against the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub config_name: String,
    pub upload_id: String,
    pub header_mapping: HeaderMapping,
    pub disabled_action_types: Vec<String>,
    /// Length cap for synthesized account names.
    pub account_max_length: usize,
}

/// Request to execute a set of previously detected actions. An empty action
/// list means "use the backend's stored analysis".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub config_name: String,
    pub actions: Vec<ActionItem>,
}

/// Remote service performing the actual directory work.
#[async_trait]
pub trait DirectoryBackend: Send + Sync {
    async fn upload(&self, file_name: &str, contents: &[u8]) -> Result<UploadReceipt>;

    async fn start_analysis(&self, request: &AnalysisRequest) -> Result<()>;

    async fn execute(&self, request: &ExecuteRequest) -> Result<()>;

    /// Open the push channel and deliver events into `tx` until the
    /// connection closes or the receiver is dropped.
    async fn subscribe(&self, tx: mpsc::UnboundedSender<PushEvent>) -> Result<()>;

    /// Cheap connectivity probe for the periodic health check.
    async fn health(&self) -> Result<()>;
}
