//! Handler for the chat relay endpoint.
//!
//! Forwards a user message to the upstream chat completion API
//! (Gemini `generateContent`) and relays the reply. Upstream failures
//! are logged with their body but surfaced as a generic 500 -- the
//! upstream error text is never forwarded verbatim.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Persona instructions sent as the system turn of every chat call.
const SYSTEM_PROMPT: &str = "You are GenCraft AI, the official assistant for the GenCraft \
    website. Always introduce yourself as GenCraft AI and explain that you help with \
    image-to-text, text-to-image, and background removal. Never say you are Google's AI model.";

/// Fallback reply when the upstream answer carries no text part.
const NO_REPLY_FALLBACK: &str = "No response from AI";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    Json(input): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    let api_key = state
        .config
        .gemini_api_key
        .as_ref()
        .ok_or_else(|| AppError::Config("API key not configured".to_string()))?;

    let body = serde_json::json!({
        "contents": [
            {
                "role": "system",
                "parts": [{ "text": SYSTEM_PROMPT }]
            },
            {
                "role": "user",
                "parts": [{ "text": input.message }]
            }
        ]
    });

    let response = state
        .http
        .post(format!("{}?key={}", state.config.chat_api_url, api_key))
        .json(&body)
        .send()
        .await
        .map_err(|e| AppError::InternalError(format!("Chat upstream request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let upstream_body = response.text().await.unwrap_or_default();
        tracing::error!(status, body = %upstream_body, "Chat upstream error");
        return Err(AppError::Upstream {
            status: 500,
            message: "Error from upstream chat API".to_string(),
        });
    }

    let data: serde_json::Value = response
        .json()
        .await
        .map_err(|e| AppError::InternalError(format!("Invalid chat upstream response: {e}")))?;

    let reply = data
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(|v| v.as_str())
        .unwrap_or(NO_REPLY_FALLBACK)
        .to_string();

    Ok(Json(ChatResponse { reply }))
}
