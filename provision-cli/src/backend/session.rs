//! Backend session lifecycle
//!
//! A [`BackendSession`] owns the push channel to one backend: explicit
//! start/stop, automatic reconnection while the operator flag is on, a
//! periodic connectivity health check, and exactly one event subscriber per
//! attempt. Subscribing for a new attempt releases the previous attempt's
//! handler first, so a retried analysis can never receive events twice.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{AnalysisRequest, DirectoryBackend, ExecuteRequest, UploadReceipt};
use crate::run::PushEvent;

/// Connection and timeout settings for one backend session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Delay between reconnection attempts of the push channel.
    pub reconnect_delay: Duration,
    /// Interval of the connectivity health check.
    pub health_check_interval: Duration,
    /// Ceiling for a dataset upload.
    pub upload_timeout: Duration,
    /// Ceiling for an analysis run (trigger to terminal event).
    pub analysis_timeout: Duration,
    /// Ceiling for an import run (trigger to terminal event).
    pub import_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_secs(2),
            health_check_interval: Duration::from_secs(30),
            upload_timeout: Duration::from_secs(60),
            analysis_timeout: Duration::from_secs(300),
            import_timeout: Duration::from_secs(600),
        }
    }
}

struct SessionInner {
    backend: Arc<dyn DirectoryBackend>,
    config: SessionConfig,
    /// Operator-controlled flag: while true the channel loop keeps
    /// reconnecting; stop() clears it.
    connected: AtomicBool,
    /// The current attempt's event sink. Replaced wholesale on each new
    /// attempt so late events for a released attempt have nowhere to go.
    subscriber: Mutex<Option<mpsc::UnboundedSender<PushEvent>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// One session against one directory backend.
pub struct BackendSession {
    inner: Arc<SessionInner>,
}

impl BackendSession {
    pub fn new(backend: Arc<dyn DirectoryBackend>, config: SessionConfig) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                backend,
                config,
                connected: AtomicBool::new(false),
                subscriber: Mutex::new(None),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Open the push channel and start the health check. Idempotent: calling
    /// start on a running session does nothing.
    pub fn start(&self) {
        if self.inner.connected.swap(true, Ordering::SeqCst) {
            return;
        }
        let channel = tokio::spawn(channel_loop(self.inner.clone()));
        let health = tokio::spawn(health_loop(self.inner.clone()));
        self.inner.tasks.lock().unwrap().extend([channel, health]);
    }

    /// Tear the session down: stop reconnecting, abort the channel and health
    /// tasks, release the current subscriber.
    pub fn stop(&self) {
        self.inner.connected.store(false, Ordering::SeqCst);
        for task in self.inner.tasks.lock().unwrap().drain(..) {
            task.abort();
        }
        self.inner.subscriber.lock().unwrap().take();
    }

    /// Install the event subscriber for a new attempt, releasing the previous
    /// one. Events already in flight for the released attempt are dropped at
    /// the channel, not delivered twice.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<PushEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.inner.subscriber.lock().unwrap() = Some(tx);
        rx
    }

    /// Drop the current attempt's subscriber without installing a new one.
    pub fn release_subscriber(&self) {
        self.inner.subscriber.lock().unwrap().take();
    }

    /// Upload a dataset, bounded by the configured ceiling. Expiry resolves to
    /// an error result, never a hung future.
    pub async fn upload(&self, file_name: &str, contents: &[u8]) -> Result<UploadReceipt> {
        let ceiling = self.inner.config.upload_timeout;
        tokio::time::timeout(ceiling, self.inner.backend.upload(file_name, contents))
            .await
            .map_err(|_| anyhow!("upload of '{}' timed out after {:?}", file_name, ceiling))?
            .context("upload failed")
    }

    pub async fn start_analysis(&self, request: &AnalysisRequest) -> Result<()> {
        self.inner
            .backend
            .start_analysis(request)
            .await
            .context("failed to trigger analysis")
    }

    pub async fn execute(&self, request: &ExecuteRequest) -> Result<()> {
        self.inner
            .backend
            .execute(request)
            .await
            .context("failed to trigger import")
    }

    pub fn analysis_timeout(&self) -> Duration {
        self.inner.config.analysis_timeout
    }

    pub fn import_timeout(&self) -> Duration {
        self.inner.config.import_timeout
    }
}

/// Connect, forward events to the current subscriber, reconnect on failure
/// while the operator flag stays on.
async fn channel_loop(inner: Arc<SessionInner>) {
    while inner.connected.load(Ordering::SeqCst) {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let forward = {
            let inner = inner.clone();
            async move {
                while let Some(event) = rx.recv().await {
                    let subscriber = inner.subscriber.lock().unwrap().clone();
                    if let Some(subscriber) = subscriber {
                        let _ = subscriber.send(event);
                    }
                }
            }
        };

        let (result, ()) = tokio::join!(inner.backend.subscribe(tx), forward);
        if let Err(err) = result {
            log::warn!("push channel dropped: {:#}", err);
        }

        if inner.connected.load(Ordering::SeqCst) {
            tokio::time::sleep(inner.config.reconnect_delay).await;
        }
    }
}

async fn health_loop(inner: Arc<SessionInner>) {
    let mut tick = tokio::time::interval(inner.config.health_check_interval);
    tick.tick().await; // skip the immediate first tick
    while inner.connected.load(Ordering::SeqCst) {
        tick.tick().await;
        if let Err(err) = inner.backend.health().await {
            log::warn!("backend health check failed: {:#}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::ProgressEvent;
    use async_trait::async_trait;

    /// Backend double that plays a scripted event sequence on subscribe and
    /// sleeps on upload.
    struct ScriptedBackend {
        events: Vec<PushEvent>,
        upload_delay: Duration,
    }

    #[async_trait]
    impl DirectoryBackend for ScriptedBackend {
        async fn upload(&self, _file_name: &str, _contents: &[u8]) -> Result<UploadReceipt> {
            tokio::time::sleep(self.upload_delay).await;
            Ok(UploadReceipt {
                upload_id: "u-1".to_string(),
                row_count: Some(1),
            })
        }

        async fn start_analysis(&self, _request: &AnalysisRequest) -> Result<()> {
            Ok(())
        }

        async fn execute(&self, _request: &ExecuteRequest) -> Result<()> {
            Ok(())
        }

        async fn subscribe(&self, tx: mpsc::UnboundedSender<PushEvent>) -> Result<()> {
            for event in &self.events {
                let _ = tx.send(event.clone());
            }
            // Hold the connection open until the session is stopped.
            futures::future::pending::<()>().await;
            Ok(())
        }

        async fn health(&self) -> Result<()> {
            Ok(())
        }
    }

    fn progress(status: &str) -> PushEvent {
        PushEvent::Progress(ProgressEvent {
            status: status.to_string(),
            progress: 0.0,
            message: String::new(),
        })
    }

    fn session(events: Vec<PushEvent>, upload_delay: Duration) -> BackendSession {
        BackendSession::new(
            Arc::new(ScriptedBackend {
                events,
                upload_delay,
            }),
            SessionConfig {
                upload_timeout: Duration::from_millis(50),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_events_reach_current_subscriber() {
        let session = session(vec![progress("analyzing")], Duration::ZERO);
        let mut rx = session.subscribe();
        session.start();

        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("event should arrive")
            .unwrap();
        assert!(matches!(event, PushEvent::Progress(p) if p.status == "analyzing"));
        session.stop();
    }

    #[tokio::test]
    async fn test_new_attempt_releases_previous_subscriber() {
        let session = session(Vec::new(), Duration::ZERO);
        let mut first = session.subscribe();
        let _second = session.subscribe();

        // The first attempt's channel is closed once the second subscribes.
        assert!(first.recv().await.is_none());
        session.stop();
    }

    #[tokio::test]
    async fn test_upload_timeout_resolves_to_error() {
        let session = session(Vec::new(), Duration::from_secs(10));
        let err = session.upload("students.csv", b"data").await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let session = session(Vec::new(), Duration::ZERO);
        session.start();
        session.start();
        assert_eq!(session.inner.tasks.lock().unwrap().len(), 2);
        session.stop();
        assert!(session.inner.tasks.lock().unwrap().is_empty());
    }
}
