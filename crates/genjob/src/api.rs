//! REST client for the remote generation-job API.
//!
//! Wraps the two-call contract using [`reqwest`]:
//! `POST {base}/generate` to create a job and
//! `GET {base}/generate/status/{id}` to check on it.
//!
//! [`GenerateBackend`] is the async seam over those calls so the poller
//! and manager can run against a scripted backend in tests.

use async_trait::async_trait;
use serde::Deserialize;

/// HTTP client for one generation-job service.
pub struct GenerateApi {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

/// Response returned by `POST /generate` after successfully creating
/// a job.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Server-assigned identifier for the queued job.
    pub id: String,
}

/// Response returned by `GET /generate/status/{id}`.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    /// Whether the job has finished (successfully or not).
    pub done: bool,
    /// Generated artifacts. Absent or empty until the job completes,
    /// and possibly empty even then.
    #[serde(default)]
    pub generations: Vec<GenerationRef>,
    /// Optional server-provided detail (e.g. a failure reason).
    pub message: Option<String>,
}

/// One generated artifact reference.
#[derive(Debug, Deserialize)]
pub struct GenerationRef {
    /// URL of the generated image.
    pub img: String,
}

impl StatusResponse {
    /// URL of the first generated artifact, if any.
    pub fn first_image(&self) -> Option<String> {
        self.generations.first().map(|g| g.img.clone())
    }
}

/// Errors from the generation-job REST layer.
#[derive(Debug, thiserror::Error)]
pub enum GenerateApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, or a generic fallback.
        message: String,
    },
}

/// The two-call contract against the generation-job service.
///
/// Implemented by [`GenerateApi`] in production and by scripted
/// backends in tests.
#[async_trait]
pub trait GenerateBackend: Send + Sync {
    /// Create a job for `prompt`. Returns the server-assigned id.
    async fn submit(
        &self,
        prompt: &str,
        params: &serde_json::Value,
    ) -> Result<SubmitResponse, GenerateApiError>;

    /// Fetch the current status of a job.
    async fn status(&self, id: &str) -> Result<StatusResponse, GenerateApiError>;
}

impl GenerateApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://host:7860`.
    /// * `api_key` - Optional key sent as the `apikey` header.
    pub fn new(api_url: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling with the relay handlers).
    pub fn with_client(client: reqwest::Client, api_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            api_url,
            api_key,
        }
    }

    /// Attach the `apikey` header when a key is configured.
    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("apikey", key),
            None => req,
        }
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`GenerateApiError::Api`]
    /// carrying the body's `message` field (falling back to the raw
    /// body, then to a generic message) on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GenerateApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateApiError::Api {
                status: status.as_u16(),
                message: error_message_from_body(status.as_u16(), &body),
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GenerateApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl GenerateBackend for GenerateApi {
    async fn submit(
        &self,
        prompt: &str,
        params: &serde_json::Value,
    ) -> Result<SubmitResponse, GenerateApiError> {
        let body = serde_json::json!({
            "prompt": prompt,
            "params": params,
        });

        let response = self
            .authorize(self.client.post(format!("{}/generate", self.api_url)))
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn status(&self, id: &str) -> Result<StatusResponse, GenerateApiError> {
        let response = self
            .authorize(
                self.client
                    .get(format!("{}/generate/status/{}", self.api_url, id)),
            )
            .send()
            .await?;

        Self::parse_response(response).await
    }
}

/// Extract the human-readable message from an error response body.
///
/// Error bodies carry a JSON `message` field; responses that are not
/// JSON (or carry no message) fall back to the raw body text, and an
/// empty body falls back to the HTTP status.
fn error_message_from_body(status: u16, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.message {
            return message;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("Generation service returned HTTP {status}")
    } else {
        trimmed.to_string()
    }
}
