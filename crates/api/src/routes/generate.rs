//! Route definitions for the generation surface.
//!
//! ```text
//! POST /generate            submit
//! GET  /generate/current    current
//! POST /generate/cancel     cancel
//! POST /generate/retry      retry
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::generate;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate::submit))
        .route("/generate/current", get(generate::current))
        .route("/generate/cancel", post(generate::cancel))
        .route("/generate/retry", post(generate::retry))
}
