use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Id of the job currently being polled, if any.
    pub active_job: Option<String>,
}

/// GET /health -- returns service status and the in-flight job, if any.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let active_job = state
        .jobs
        .current()
        .await
        .filter(|job| !job.status.is_terminal())
        .map(|job| job.id);

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        active_job,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
