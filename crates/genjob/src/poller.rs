//! Cancellable polling task for one generation job.
//!
//! [`spawn_poll_loop`] drives a [`GenerationJob`] from `Polling` to a
//! terminal state by checking the remote status endpoint on a fixed
//! interval. The returned [`JobHandle`] exposes state snapshots, an
//! awaitable terminal result, and idempotent cancellation -- there is
//! no free-running timer, so a cancelled loop can never write into a
//! torn-down view.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use gencraft_core::error::CoreError;
use gencraft_core::job::{self, GenerationJob, PollOutcome, DEFAULT_POLL_INTERVAL_SECS};
use gencraft_core::types::JobId;

use crate::api::GenerateBackend;
use crate::events::JobEvent;

/// Tunable parameters for the poll loop.
pub struct PollerConfig {
    /// Delay between status checks.
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

/// Handle to one job's poll loop.
///
/// Dropping the handle does not stop the loop; call [`cancel`]
/// (or [`shutdown`] to also join the task). Exactly one loop exists
/// per handle, and the loop is the only writer of the job state.
///
/// [`cancel`]: Self::cancel
/// [`shutdown`]: Self::shutdown
pub struct JobHandle {
    job_id: JobId,
    state_rx: watch::Receiver<GenerationJob>,
    cancel: CancellationToken,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl JobHandle {
    /// Server-assigned id of the tracked job.
    pub fn id(&self) -> &str {
        &self.job_id
    }

    /// Current snapshot of the job state.
    pub fn snapshot(&self) -> GenerationJob {
        self.state_rx.borrow().clone()
    }

    /// Whether the job has reached `Succeeded` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        self.state_rx.borrow().status.is_terminal()
    }

    /// Stop the poll loop. Idempotent; cancelling an already-cancelled
    /// or already-terminal job is a no-op. The loop applies no further
    /// transition after this returns (in-flight responses are
    /// discarded by the loop's post-call guard).
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the terminal snapshot.
    ///
    /// If the loop is cancelled before reaching a terminal state, the
    /// last observed snapshot is returned instead.
    pub async fn wait(&mut self) -> GenerationJob {
        loop {
            let snapshot = self.state_rx.borrow().clone();
            if snapshot.status.is_terminal() {
                return snapshot;
            }
            if self.state_rx.changed().await.is_err() {
                // The loop exited without a terminal transition.
                return self.state_rx.borrow().clone();
            }
        }
    }

    /// Cancel the loop and wait (bounded) for the task to exit.
    /// Returns the final snapshot.
    pub async fn shutdown(mut self) -> GenerationJob {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), task).await;
        }
        self.state_rx.borrow().clone()
    }

    /// Wrap a job that is already terminal (e.g. a rejected
    /// submission) in a handle with no running task.
    pub fn settled(job: GenerationJob) -> Self {
        let job_id = job.id.clone();
        let (_state_tx, state_rx) = watch::channel(job);
        Self {
            job_id,
            state_rx,
            cancel: CancellationToken::new(),
            task: None,
        }
    }
}

/// Spawn the poll loop for a freshly submitted job.
///
/// The job must be in `Submitted`; it transitions to `Polling` before
/// the first tick. Status checks are strictly sequential -- each tick
/// awaits its call before the next sleep begins -- and every result is
/// re-checked against the cancellation token before it is applied.
pub fn spawn_poll_loop(
    backend: Arc<dyn GenerateBackend>,
    mut job: GenerationJob,
    config: &PollerConfig,
    event_tx: broadcast::Sender<JobEvent>,
) -> JobHandle {
    if let Err(e) = job.begin_polling() {
        tracing::error!(job_id = %job.id, error = %e, "Refusing to poll a job that is not freshly submitted");
        return JobHandle::settled(job);
    }

    let job_id = job.id.clone();
    let interval = config.interval;
    let cancel = CancellationToken::new();
    let (state_tx, state_rx) = watch::channel(job);

    let loop_cancel = cancel.clone();
    let loop_job_id = job_id.clone();
    let task = tokio::spawn(async move {
        run_poll_loop(backend, loop_job_id, state_tx, event_tx, loop_cancel, interval).await;
    });

    JobHandle {
        job_id,
        state_rx,
        cancel,
        task: Some(task),
    }
}

/// Core loop: sleep -> one status check -> apply outcome, until a
/// terminal state or cancellation.
async fn run_poll_loop(
    backend: Arc<dyn GenerateBackend>,
    job_id: JobId,
    state_tx: watch::Sender<GenerationJob>,
    event_tx: broadcast::Sender<JobEvent>,
    cancel: CancellationToken,
    interval: Duration,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(job_id = %job_id, "Poll loop cancelled");
                return;
            }
            _ = tokio::time::sleep(interval) => {}
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => return,
            result = backend.status(&job_id) => result,
        };

        // A loop cancelled while the call was in flight must not apply
        // its result.
        if cancel.is_cancelled() {
            tracing::debug!(job_id = %job_id, "Discarding status response after cancellation");
            return;
        }

        match result {
            Ok(status) => {
                let outcome =
                    job::evaluate_poll(status.done, status.first_image(), status.message);
                match outcome {
                    PollOutcome::Continue => {
                        tracing::debug!(job_id = %job_id, "Job still in progress");
                    }
                    PollOutcome::Succeeded { result_url } => {
                        apply_transition(&state_tx, |j| j.succeed(result_url.clone()));
                        tracing::info!(job_id = %job_id, result_url = %result_url, "Generation job succeeded");
                        let _ = event_tx.send(JobEvent::Succeeded {
                            job_id,
                            result_url,
                        });
                        return;
                    }
                    PollOutcome::Failed { message } => {
                        apply_transition(&state_tx, |j| j.fail(message.clone()));
                        tracing::warn!(job_id = %job_id, message = %message, "Generation job failed");
                        let _ = event_tx.send(JobEvent::Failed { job_id, message });
                        return;
                    }
                }
            }
            Err(e) => {
                let message = e.to_string();
                apply_transition(&state_tx, |j| j.fail(message.clone()));
                tracing::warn!(job_id = %job_id, error = %message, "Status check failed");
                let _ = event_tx.send(JobEvent::Failed { job_id, message });
                return;
            }
        }
    }
}

/// Apply one transition through the watch channel.
///
/// The loop is the sole writer and exits after any terminal
/// transition, so a rejection here indicates a bug; it is logged
/// rather than propagated.
fn apply_transition(
    state_tx: &watch::Sender<GenerationJob>,
    f: impl FnOnce(&mut GenerationJob) -> Result<(), CoreError>,
) {
    state_tx.send_modify(|job| {
        if let Err(e) = f(job) {
            tracing::error!(job_id = %job.id, error = %e, "Rejected job transition");
        }
    });
}
