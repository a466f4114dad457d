#![allow(dead_code)] // each test binary uses a subset of these helpers

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use gencraft_api::config::ServerConfig;
use gencraft_api::router::build_app_router;
use gencraft_api::state::AppState;
use gencraft_genjob::api::GenerateApi;
use gencraft_genjob::manager::JobManager;
use gencraft_genjob::poller::PollerConfig;

/// Poll interval used by test apps; fast enough that multi-tick
/// scenarios settle within a test run.
pub const TEST_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Build a test `ServerConfig` with safe defaults.
///
/// Upstream URLs point at a discard port so an endpoint that is not
/// supposed to be reached fails fast; tests that need an upstream
/// override the relevant field with a mock server URL.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        generate_api_url: "http://127.0.0.1:9".to_string(),
        generate_api_key: None,
        generate_poll_secs: 4,
        chat_api_url: "http://127.0.0.1:9".to_string(),
        gemini_api_key: None,
        remove_bg_api_url: "http://127.0.0.1:9".to_string(),
        hf_api_key: None,
    }
}

/// Build the full application router with all middleware layers.
///
/// This mirrors the state construction in `main.rs` (real
/// [`GenerateApi`] backend, shared client) so integration tests
/// exercise the same stack that production uses, with a fast poll
/// interval.
pub fn build_test_app(config: ServerConfig) -> Router {
    let http = reqwest::Client::new();
    let backend = Arc::new(GenerateApi::with_client(
        http.clone(),
        config.generate_api_url.clone(),
        config.generate_api_key.clone(),
    ));
    let jobs = JobManager::new(
        backend,
        PollerConfig {
            interval: TEST_POLL_INTERVAL,
        },
    );

    let state = AppState {
        config: Arc::new(config.clone()),
        http,
        jobs,
    };
    build_app_router(state, &config)
}

/// Serve a mock upstream router on an ephemeral port.
///
/// Returns the base URL, e.g. `http://127.0.0.1:49152`.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
        .await
        .expect("Failed to bind mock upstream");
    let addr = listener.local_addr().expect("Mock upstream has no addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn post_empty(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("Response body is not valid JSON")
}
