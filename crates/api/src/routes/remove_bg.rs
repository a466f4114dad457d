//! Route definitions for the background-removal relay.
//!
//! ```text
//! POST /remove-bg    remove_bg
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::remove_bg;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/remove-bg", post(remove_bg::remove_bg))
}
