//! Generation-job record, status machine, and poll-outcome decision.
//!
//! A [`GenerationJob`] tracks one asynchronous image-generation request
//! against the remote job service. Status transitions are monotonic:
//! once a job reaches [`JobStatus::Succeeded`] or [`JobStatus::Failed`]
//! no further transition is accepted. All mutation goes through the
//! transition methods so illegal edges are rejected in one place.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{JobId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default seconds between status checks while a job is in flight.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 4;

/// Failure message for a job that completed without producing an artifact.
pub const MSG_NO_IMAGE: &str = "No image was generated";

// ---------------------------------------------------------------------------
// Status machine
// ---------------------------------------------------------------------------

/// Lifecycle status of a generation job.
///
/// Legal edges: `Submitted -> Polling`, `Submitted -> Failed`,
/// `Polling -> Succeeded`, `Polling -> Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// The creation call succeeded; polling has not started yet.
    Submitted,
    /// Status checks are running on a fixed interval.
    Polling,
    /// Terminal: the service produced at least one artifact.
    Succeeded,
    /// Terminal: submission or polling ended in an error.
    Failed,
}

impl JobStatus {
    /// Whether this status permits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// One asynchronous image-generation request tracked by the remote
/// service's own identifier.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationJob {
    /// Opaque token assigned by the remote service on submission.
    pub id: JobId,
    /// The submitted text. Immutable after creation.
    pub prompt: String,
    pub status: JobStatus,
    /// Reference to the generated artifact. `Some` only when `Succeeded`.
    pub result_url: Option<String>,
    /// Human-readable failure reason. `Some` only when `Failed`.
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    /// Set exactly once, on the terminal transition.
    pub finished_at: Option<Timestamp>,
}

impl GenerationJob {
    /// Create a job in `Submitted` with the id returned by the service.
    pub fn submitted(id: impl Into<JobId>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            status: JobStatus::Submitted,
            result_url: None,
            error_message: None,
            created_at: chrono::Utc::now(),
            finished_at: None,
        }
    }

    /// Create a job that failed before polling ever started (the
    /// creation call itself was rejected). The job has no server id.
    pub fn failed_submission(prompt: impl Into<String>, message: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: JobId::new(),
            prompt: prompt.into(),
            status: JobStatus::Failed,
            result_url: None,
            error_message: Some(message.into()),
            created_at: now,
            finished_at: Some(now),
        }
    }

    /// `Submitted -> Polling`.
    pub fn begin_polling(&mut self) -> Result<(), CoreError> {
        self.guard_not_terminal("begin_polling")?;
        if self.status != JobStatus::Submitted {
            return Err(CoreError::Conflict(format!(
                "Cannot begin polling from status {:?}",
                self.status
            )));
        }
        self.status = JobStatus::Polling;
        Ok(())
    }

    /// `Polling -> Succeeded`, recording the artifact reference.
    pub fn succeed(&mut self, result_url: impl Into<String>) -> Result<(), CoreError> {
        self.guard_not_terminal("succeed")?;
        self.status = JobStatus::Succeeded;
        self.result_url = Some(result_url.into());
        self.finished_at = Some(chrono::Utc::now());
        Ok(())
    }

    /// `Submitted | Polling -> Failed`, recording the failure reason.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), CoreError> {
        self.guard_not_terminal("fail")?;
        self.status = JobStatus::Failed;
        self.error_message = Some(message.into());
        self.finished_at = Some(chrono::Utc::now());
        Ok(())
    }

    fn guard_not_terminal(&self, op: &str) -> Result<(), CoreError> {
        if self.status.is_terminal() {
            return Err(CoreError::Conflict(format!(
                "Job {} is already {:?}; {op} rejected",
                self.id, self.status
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Poll decision
// ---------------------------------------------------------------------------

/// What one status observation means for the poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Not yet complete. Keep polling.
    Continue,
    /// Complete with an artifact. Terminal.
    Succeeded { result_url: String },
    /// Complete without an artifact, or the service reported an error.
    /// Terminal.
    Failed { message: String },
}

/// Decide the outcome of one poll tick from a status observation.
///
/// - `done` with an artifact -> `Succeeded` with its URL.
/// - `done` without an artifact -> `Failed` with [`MSG_NO_IMAGE`]
///   (the server `message`, when present, is preferred).
/// - not `done` -> `Continue`.
pub fn evaluate_poll(
    done: bool,
    first_artifact: Option<String>,
    message: Option<String>,
) -> PollOutcome {
    if !done {
        return PollOutcome::Continue;
    }
    match first_artifact {
        Some(result_url) => PollOutcome::Succeeded { result_url },
        None => PollOutcome::Failed {
            message: message.unwrap_or_else(|| MSG_NO_IMAGE.to_string()),
        },
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Validate a prompt before submission.
///
/// Empty or whitespace-only prompts are rejected; callers must not issue
/// a creation call in that case.
pub fn validate_prompt(prompt: &str) -> Result<(), CoreError> {
    if prompt.trim().is_empty() {
        return Err(CoreError::Validation(
            "Prompt must not be empty".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
