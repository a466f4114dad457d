//! Handler for the background-removal relay endpoint.
//!
//! Accepts a multipart upload, forwards the image bytes to the
//! background-removal model endpoint, and relays the processed image
//! back as `image/png`. Unlike the chat relay, upstream failures here
//! are relayed with their original status code and error text.

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/remove-bg
///
/// Multipart form with a single `image` field.
pub async fn remove_bg(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let mut image: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("image") {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read image field: {e}")))?;
            image = Some(data);
        }
    }

    let image = image.ok_or_else(|| AppError::BadRequest("No image provided".to_string()))?;

    let mut request = state
        .http
        .post(&state.config.remove_bg_api_url)
        .header(CONTENT_TYPE, "application/octet-stream")
        .body(image);
    if let Some(key) = &state.config.hf_api_key {
        request = request.bearer_auth(key);
    }

    let response = request
        .send()
        .await
        .map_err(|e| AppError::InternalError(format!("Remove-bg upstream request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %message, "Remove-bg upstream error");
        return Err(AppError::Upstream {
            status: status.as_u16(),
            message,
        });
    }

    let processed = response
        .bytes()
        .await
        .map_err(|e| AppError::InternalError(format!("Invalid remove-bg upstream response: {e}")))?;

    Ok((
        [(CONTENT_TYPE, "image/png"), (CACHE_CONTROL, "no-store")],
        processed,
    )
        .into_response())
}
