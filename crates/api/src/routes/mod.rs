pub mod chat;
pub mod generate;
pub mod health;
pub mod remove_bg;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /chat                 POST  chat relay
/// /remove-bg            POST  background-removal relay
///
/// /generate             POST  submit a generation job
/// /generate/current     GET   current job snapshot
/// /generate/cancel      POST  cancel the current job
/// /generate/retry       POST  retry the current prompt
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(chat::router())
        .merge(remove_bg::router())
        .merge(generate::router())
}
