use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (upstream URLs, credentials, timeouts).
    pub config: Arc<ServerConfig>,
    /// Shared HTTP client for the relay handlers.
    pub http: reqwest::Client,
    /// Generation-job manager (one active job per surface).
    pub jobs: Arc<gencraft_genjob::manager::JobManager>,
}
