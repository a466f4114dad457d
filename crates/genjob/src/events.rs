//! Platform events emitted by the job manager and poll loops.
//!
//! High-level lifecycle changes the rest of the application cares
//! about, broadcast via a [`tokio::sync::broadcast`] channel. Call
//! [`crate::manager::JobManager::subscribe`] to receive them.

use gencraft_core::types::JobId;
use serde::Serialize;

/// A lifecycle event for one generation job.
#[derive(Debug, Clone, Serialize)]
pub enum JobEvent {
    /// The creation call succeeded and polling is starting.
    Submitted { job_id: JobId, prompt: String },

    /// The job completed with an artifact.
    Succeeded { job_id: JobId, result_url: String },

    /// The job reached a terminal failure (submission rejection,
    /// status-check failure, or completion without an artifact).
    Failed { job_id: JobId, message: String },

    /// The poll loop was cancelled before reaching a terminal state
    /// (teardown or a superseding submission).
    Cancelled { job_id: JobId },
}
