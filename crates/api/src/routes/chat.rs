//! Route definitions for the chat relay.
//!
//! ```text
//! POST /chat    chat
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::chat;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/chat", post(chat::chat))
}
