//! HTTP implementation of the directory backend

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc;

use super::{AnalysisRequest, DirectoryBackend, ExecuteRequest, UploadReceipt};
use crate::run::PushEvent;

/// Client for a directory backend exposing the REST + push-event surface.
///
/// The push channel is a long-lived response streaming newline-delimited JSON
/// events; one connection per subscribe call.
pub struct HttpDirectoryBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDirectoryBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl DirectoryBackend for HttpDirectoryBackend {
    async fn upload(&self, file_name: &str, contents: &[u8]) -> Result<UploadReceipt> {
        let response = self
            .client
            .post(self.url("/api/upload"))
            .query(&[("fileName", file_name)])
            .body(contents.to_vec())
            .send()
            .await
            .context("upload request failed")?;

        if !response.status().is_success() {
            bail!("upload rejected with status {}", response.status());
        }

        response
            .json::<UploadReceipt>()
            .await
            .context("malformed upload acknowledgement")
    }

    async fn start_analysis(&self, request: &AnalysisRequest) -> Result<()> {
        let response = self
            .client
            .post(self.url("/api/analyze"))
            .json(request)
            .send()
            .await
            .context("analysis request failed")?;

        if !response.status().is_success() {
            bail!("analysis rejected with status {}", response.status());
        }
        Ok(())
    }

    async fn execute(&self, request: &ExecuteRequest) -> Result<()> {
        let response = self
            .client
            .post(self.url("/api/execute"))
            .json(request)
            .send()
            .await
            .context("execute request failed")?;

        if !response.status().is_success() {
            bail!("execute rejected with status {}", response.status());
        }
        Ok(())
    }

    async fn subscribe(&self, tx: mpsc::UnboundedSender<PushEvent>) -> Result<()> {
        let response = self
            .client
            .get(self.url("/api/events"))
            .send()
            .await
            .context("push channel connect failed")?;

        if !response.status().is_success() {
            bail!("push channel rejected with status {}", response.status());
        }

        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("push channel read failed")?;
            buffer.extend_from_slice(&chunk);

            while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=newline).collect();
                let line = String::from_utf8_lossy(&line);
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<PushEvent>(line) {
                    Ok(event) => {
                        if tx.send(event).is_err() {
                            // Receiver gone; the attempt was released.
                            return Ok(());
                        }
                    }
                    Err(err) => log::warn!("skipping malformed push event: {}", err),
                }
            }
        }

        Ok(())
    }

    async fn health(&self) -> Result<()> {
        let response = self
            .client
            .get(self.url("/api/health"))
            .send()
            .await
            .context("health check request failed")?;

        if !response.status().is_success() {
            bail!("health check returned status {}", response.status());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let backend = HttpDirectoryBackend::new("http://backend.local/");
        assert_eq!(backend.url("/api/health"), "http://backend.local/api/health");
    }
}
