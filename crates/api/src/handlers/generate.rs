//! Handlers for the text-to-image generation surface.
//!
//! Routes:
//! - `POST /api/generate`          -- submit a prompt (supersedes any running job)
//! - `GET  /api/generate/current`  -- snapshot of the current job
//! - `POST /api/generate/cancel`   -- stop the current poll loop
//! - `POST /api/generate/retry`    -- resubmit the current prompt as a new job

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use gencraft_genjob::manager::JobManagerError;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    /// Provider-specific generation parameters, forwarded opaquely.
    #[serde(default = "default_params")]
    pub params: serde_json::Value,
}

fn default_params() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

/// POST /api/generate
///
/// Validates the prompt, supersedes any running job, submits a new one
/// and returns its snapshot. A rejected creation comes back as a
/// `Failed` snapshot rather than an HTTP error -- the caller renders
/// its `error_message` and may retry.
pub async fn submit(
    State(state): State<AppState>,
    Json(input): Json<GenerateRequest>,
) -> AppResult<impl IntoResponse> {
    let job = state.jobs.submit(&input.prompt, input.params).await?;
    Ok(Json(DataResponse { data: job }))
}

/// GET /api/generate/current
pub async fn current(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let job = state
        .jobs
        .current()
        .await
        .ok_or(JobManagerError::NoJob)?;
    Ok(Json(DataResponse { data: job }))
}

/// POST /api/generate/cancel
///
/// Idempotent: cancelling with no job, or a finished one, is a no-op.
pub async fn cancel(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    state.jobs.cancel_current().await;
    Ok(Json(DataResponse {
        data: CancelResponse { cancelled: true },
    }))
}

/// POST /api/generate/retry
///
/// Restarts the whole flow from submission with the current prompt;
/// the remote service assigns a brand-new job id.
pub async fn retry(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let job = state.jobs.retry().await?;
    Ok(Json(DataResponse { data: job }))
}
