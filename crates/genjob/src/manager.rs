//! One-active-job manager for a single UI surface.
//!
//! [`JobManager`] owns at most one [`JobHandle`] at a time: a new
//! submission cancels and joins the previous poll loop before the
//! creation call goes out, so no stale tick can ever land on the new
//! job. Lifecycle events are broadcast via a
//! [`tokio::sync::broadcast`] channel; call [`JobManager::subscribe`]
//! to receive them.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use gencraft_core::error::CoreError;
use gencraft_core::job::{self, GenerationJob};

use crate::api::GenerateBackend;
use crate::events::JobEvent;
use crate::poller::{spawn_poll_loop, JobHandle, PollerConfig};

/// Broadcast channel capacity for job events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Manages the lifecycle of the current generation job.
///
/// Created once at application startup via [`JobManager::new`]. The
/// returned `Arc` can be cheaply cloned into request handlers.
pub struct JobManager {
    backend: Arc<dyn GenerateBackend>,
    config: PollerConfig,
    current: RwLock<Option<JobHandle>>,
    /// Params of the last submission, kept for manual retry.
    last_params: RwLock<serde_json::Value>,
    event_tx: broadcast::Sender<JobEvent>,
}

impl JobManager {
    /// Create a manager polling through the given backend.
    pub fn new(backend: Arc<dyn GenerateBackend>, config: PollerConfig) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            backend,
            config,
            current: RwLock::new(None),
            last_params: RwLock::new(serde_json::Value::Object(Default::default())),
            event_tx,
        })
    }

    /// Subscribe to job lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    /// Submit a prompt as a new generation job.
    ///
    /// An empty or whitespace-only prompt is rejected before anything
    /// else happens: no remote call is issued and the current job (and
    /// its loop, if running) is left untouched.
    ///
    /// Otherwise any previously running poll loop is cancelled and
    /// joined first, then the creation call goes out. A rejected
    /// creation becomes a settled `Failed` job (no polling starts); a
    /// successful one starts a fresh poll loop.
    ///
    /// Returns a snapshot of the new current job.
    pub async fn submit(
        &self,
        prompt: &str,
        params: serde_json::Value,
    ) -> Result<GenerationJob, JobManagerError> {
        job::validate_prompt(prompt)?;

        // Hold the slot for the whole supersede -> create -> store
        // sequence so two racing submissions cannot both pass the
        // supersede step and leave a second loop running.
        let mut current = self.current.write().await;
        if let Some(handle) = current.take() {
            if !handle.is_terminal() {
                let job_id = handle.id().to_string();
                tracing::info!(job_id = %job_id, "Superseding running generation job");
                handle.shutdown().await;
                let _ = self.event_tx.send(JobEvent::Cancelled { job_id });
            }
        }
        *self.last_params.write().await = params.clone();

        let handle = match self.backend.submit(prompt, &params).await {
            Ok(response) => {
                tracing::info!(job_id = %response.id, "Generation job submitted");
                let job = GenerationJob::submitted(response.id.clone(), prompt);
                let _ = self.event_tx.send(JobEvent::Submitted {
                    job_id: response.id,
                    prompt: prompt.to_string(),
                });
                spawn_poll_loop(
                    Arc::clone(&self.backend),
                    job,
                    &self.config,
                    self.event_tx.clone(),
                )
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(error = %message, "Job submission rejected");
                let job = GenerationJob::failed_submission(prompt, message.clone());
                let _ = self.event_tx.send(JobEvent::Failed {
                    job_id: job.id.clone(),
                    message,
                });
                JobHandle::settled(job)
            }
        };

        let snapshot = handle.snapshot();
        *current = Some(handle);
        Ok(snapshot)
    }

    /// Snapshot of the current job, if any was ever submitted.
    pub async fn current(&self) -> Option<GenerationJob> {
        self.current.read().await.as_ref().map(|h| h.snapshot())
    }

    /// Cancel the current poll loop, if one is running.
    ///
    /// Idempotent: cancelling a terminal job, or when nothing was
    /// submitted, is a no-op. A cancelled in-flight job is dropped
    /// from the surface entirely (it never reaches a terminal state).
    pub async fn cancel_current(&self) {
        let mut current = self.current.write().await;
        let Some(handle) = current.take() else {
            return;
        };

        if handle.is_terminal() {
            // Terminal jobs keep their record; nothing to stop.
            *current = Some(handle);
            return;
        }

        let job_id = handle.id().to_string();
        tracing::info!(job_id = %job_id, "Cancelling generation job");
        handle.shutdown().await;
        let _ = self.event_tx.send(JobEvent::Cancelled { job_id });
    }

    /// Manually retry the current job's prompt as a brand-new job.
    ///
    /// Never resumes the old job: the whole flow restarts from
    /// submission and the remote service assigns a fresh id.
    pub async fn retry(&self) -> Result<GenerationJob, JobManagerError> {
        let prompt = self
            .current()
            .await
            .map(|job| job.prompt)
            .ok_or(JobManagerError::NoJob)?;
        let params = self.last_params.read().await.clone();
        self.submit(&prompt, params).await
    }

    /// Gracefully stop the current poll loop during shutdown.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down job manager");
        let handle = self.current.write().await.take();
        if let Some(handle) = handle {
            handle.shutdown().await;
        }
        tracing::info!("Job manager shut down complete");
    }
}

/// Errors surfaced by the manager to its callers.
#[derive(Debug, thiserror::Error)]
pub enum JobManagerError {
    /// The prompt failed validation (no remote call was made).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// No job has been submitted on this surface yet.
    #[error("No job has been submitted")]
    NoJob,
}
