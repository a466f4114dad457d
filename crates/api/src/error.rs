use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use gencraft_core::error::CoreError;
use gencraft_genjob::manager::JobManagerError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`JobManagerError`] for domain errors and
/// adds HTTP-specific variants. Implements [`IntoResponse`] to produce
/// consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `gencraft_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A job-manager error from `gencraft_genjob`.
    #[error(transparent)]
    Manager(#[from] JobManagerError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A missing or invalid server-side configuration value. The
    /// message is safe to surface (it names no secret).
    #[error("Configuration error: {0}")]
    Config(String),

    /// An upstream service failed; the status code and message are
    /// relayed as-is.
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),

            AppError::Manager(err) => match err {
                JobManagerError::Core(core) => classify_core_error(core),
                JobManagerError::NoJob => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    "No job has been submitted".to_string(),
                ),
            },

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),

            AppError::Config(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                msg.clone(),
            ),

            AppError::Upstream { status, message } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                "UPSTREAM_ERROR",
                message.clone(),
            ),

            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a domain error into an HTTP status, error code, and message.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
    }
}
