//! Manager invariants: one active loop, supersede, cancel, retry.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;

use common::{ScriptedBackend, ScriptedStatus, ScriptedSubmit};
use gencraft_core::job::JobStatus;
use gencraft_genjob::events::JobEvent;
use gencraft_genjob::manager::{JobManager, JobManagerError};
use gencraft_genjob::poller::PollerConfig;

const FAST_POLL: Duration = Duration::from_millis(5);

fn make_manager(backend: Arc<ScriptedBackend>) -> Arc<JobManager> {
    JobManager::new(
        backend,
        PollerConfig {
            interval: FAST_POLL,
        },
    )
}

fn params() -> serde_json::Value {
    serde_json::json!({})
}

// ---------------------------------------------------------------------------
// Test: empty prompts never reach the backend
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_prompt_is_rejected_without_any_call() {
    let backend = Arc::new(ScriptedBackend::new(vec![], vec![]));
    let manager = make_manager(Arc::clone(&backend));

    for prompt in ["", "   ", "\n\t"] {
        let result = manager.submit(prompt, params()).await;
        assert_matches!(result, Err(JobManagerError::Core(_)));
    }

    assert_eq!(backend.submit_calls(), 0);
    assert!(manager.current().await.is_none());
}

#[tokio::test]
async fn empty_prompt_leaves_running_job_untouched() {
    let backend = Arc::new(ScriptedBackend::new(
        vec![ScriptedSubmit::Ok("job-1")],
        vec![],
    ));
    let manager = make_manager(Arc::clone(&backend));

    manager.submit("a red fox", params()).await.unwrap();
    let before = manager.current().await.unwrap();

    let result = manager.submit("   ", params()).await;
    assert_matches!(result, Err(JobManagerError::Core(_)));

    let after = manager.current().await.unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.status, JobStatus::Polling);
    assert_eq!(backend.submit_calls(), 1);
}

// ---------------------------------------------------------------------------
// Test: a rejected creation is terminal immediately, with zero polls
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rejected_submission_fails_without_polling() {
    let backend = Arc::new(ScriptedBackend::new(
        vec![ScriptedSubmit::Err {
            status: 500,
            message: "quota exceeded",
        }],
        vec![],
    ));
    let manager = make_manager(Arc::clone(&backend));

    let job = manager.submit("broken", params()).await.unwrap();

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error_message.as_deref(), Some("quota exceeded"));

    tokio::time::sleep(FAST_POLL * 4).await;
    assert_eq!(backend.status_calls(), 0);
}

// ---------------------------------------------------------------------------
// Test: a new submission supersedes the running loop
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_submission_cancels_previous_loop() {
    let backend = Arc::new(ScriptedBackend::new(
        vec![ScriptedSubmit::Ok("job-1"), ScriptedSubmit::Ok("job-2")],
        vec![],
    ));
    let manager = make_manager(Arc::clone(&backend));
    let mut events = manager.subscribe();

    manager.submit("a red fox", params()).await.unwrap();
    tokio::time::sleep(FAST_POLL * 3).await;

    let job = manager.submit("a blue fox", params()).await.unwrap();
    assert_eq!(job.id, "job-2");
    assert_eq!(job.status, JobStatus::Polling);

    // The first loop was joined before the second submission went out:
    // after it settles, only job-2 ticks remain.
    let calls_after_supersede = backend.status_calls();
    tokio::time::sleep(FAST_POLL * 4).await;
    assert!(backend.status_calls() > calls_after_supersede);

    assert_matches!(events.recv().await, Ok(JobEvent::Submitted { job_id, .. }) if job_id == "job-1");
    assert_matches!(events.recv().await, Ok(JobEvent::Cancelled { job_id }) if job_id == "job-1");
    assert_matches!(events.recv().await, Ok(JobEvent::Submitted { job_id, .. }) if job_id == "job-2");
}

#[tokio::test]
async fn terminal_job_is_replaced_without_cancel_event() {
    let backend = Arc::new(ScriptedBackend::new(
        vec![ScriptedSubmit::Ok("job-1"), ScriptedSubmit::Ok("job-2")],
        vec![ScriptedStatus::Done(vec!["https://x/y.png"])],
    ));
    let manager = make_manager(Arc::clone(&backend));
    let mut events = manager.subscribe();

    manager.submit("a red fox", params()).await.unwrap();
    // Let the first job reach Succeeded.
    tokio::time::sleep(FAST_POLL * 4).await;
    assert_eq!(
        manager.current().await.unwrap().status,
        JobStatus::Succeeded
    );

    manager.submit("a blue fox", params()).await.unwrap();

    assert_matches!(events.recv().await, Ok(JobEvent::Submitted { job_id, .. }) if job_id == "job-1");
    assert_matches!(events.recv().await, Ok(JobEvent::Succeeded { .. }));
    // No Cancelled event between the terminal job and the new one.
    assert_matches!(events.recv().await, Ok(JobEvent::Submitted { job_id, .. }) if job_id == "job-2");
}

// ---------------------------------------------------------------------------
// Test: cancel_current semantics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancel_current_drops_in_flight_job() {
    let backend = Arc::new(ScriptedBackend::new(
        vec![ScriptedSubmit::Ok("job-1")],
        vec![],
    ));
    let manager = make_manager(Arc::clone(&backend));

    manager.submit("a red fox", params()).await.unwrap();
    manager.cancel_current().await;

    assert!(manager.current().await.is_none());

    let calls_at_cancel = backend.status_calls();
    tokio::time::sleep(FAST_POLL * 4).await;
    assert_eq!(backend.status_calls(), calls_at_cancel);
}

#[tokio::test]
async fn cancel_current_is_a_noop_without_a_job_or_on_terminal() {
    let backend = Arc::new(ScriptedBackend::new(
        vec![ScriptedSubmit::Ok("job-1")],
        vec![ScriptedStatus::Done(vec!["https://x/y.png"])],
    ));
    let manager = make_manager(Arc::clone(&backend));

    // Nothing submitted yet.
    manager.cancel_current().await;
    assert!(manager.current().await.is_none());

    manager.submit("a red fox", params()).await.unwrap();
    tokio::time::sleep(FAST_POLL * 4).await;

    // Terminal jobs keep their record.
    manager.cancel_current().await;
    manager.cancel_current().await;
    let job = manager.current().await.unwrap();
    assert_eq!(job.status, JobStatus::Succeeded);
    assert_eq!(job.result_url.as_deref(), Some("https://x/y.png"));
}

// ---------------------------------------------------------------------------
// Test: manual retry restarts the whole flow with a fresh id
// ---------------------------------------------------------------------------

#[tokio::test]
async fn retry_resubmits_same_prompt_as_new_job() {
    let backend = Arc::new(ScriptedBackend::new(
        vec![
            ScriptedSubmit::Err {
                status: 500,
                message: "quota exceeded",
            },
            ScriptedSubmit::Ok("job-2"),
        ],
        vec![],
    ));
    let manager = make_manager(Arc::clone(&backend));

    let failed = manager.submit("a red fox", params()).await.unwrap();
    assert_eq!(failed.status, JobStatus::Failed);

    let retried = manager.retry().await.unwrap();
    assert_eq!(retried.id, "job-2");
    assert_eq!(retried.prompt, "a red fox");
    assert_eq!(retried.status, JobStatus::Polling);
    assert_eq!(backend.submit_calls(), 2);
}

#[tokio::test]
async fn retry_without_a_job_errors() {
    let backend = Arc::new(ScriptedBackend::new(vec![], vec![]));
    let manager = make_manager(backend);

    assert_matches!(manager.retry().await, Err(JobManagerError::NoJob));
}

// ---------------------------------------------------------------------------
// Test: shutdown joins the loop
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_stops_the_current_loop() {
    let backend = Arc::new(ScriptedBackend::new(
        vec![ScriptedSubmit::Ok("job-1")],
        vec![],
    ));
    let manager = make_manager(Arc::clone(&backend));

    manager.submit("a red fox", params()).await.unwrap();
    tokio::time::sleep(FAST_POLL * 2).await;
    manager.shutdown().await;

    let calls_at_shutdown = backend.status_calls();
    tokio::time::sleep(FAST_POLL * 4).await;
    assert_eq!(backend.status_calls(), calls_at_shutdown);
}
