//! Scripted [`GenerateBackend`] for exercising the poller and manager
//! without a network.

#![allow(dead_code)] // each test binary uses a subset of these helpers

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use gencraft_genjob::api::{
    GenerateApiError, GenerateBackend, GenerationRef, StatusResponse, SubmitResponse,
};

/// One scripted reply for the submit call.
pub enum ScriptedSubmit {
    Ok(&'static str),
    Err { status: u16, message: &'static str },
}

/// One scripted reply for a status call.
pub enum ScriptedStatus {
    NotDone,
    Done(Vec<&'static str>),
    Err { status: u16, message: &'static str },
}

/// Returns pre-defined replies in order and counts every call.
///
/// Submit replies are consumed one per call (panics when exhausted so a
/// test cannot silently over-submit). Status replies are consumed one
/// per tick; once exhausted, further ticks observe `NotDone`.
pub struct ScriptedBackend {
    submits: Mutex<Vec<ScriptedSubmit>>,
    statuses: Mutex<Vec<ScriptedStatus>>,
    submit_calls: AtomicUsize,
    status_calls: AtomicUsize,
    /// Artificial latency applied to every status call.
    status_delay: Duration,
}

impl ScriptedBackend {
    pub fn new(submits: Vec<ScriptedSubmit>, statuses: Vec<ScriptedStatus>) -> Self {
        Self {
            submits: Mutex::new(submits),
            statuses: Mutex::new(statuses),
            submit_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            status_delay: Duration::ZERO,
        }
    }

    pub fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = delay;
        self
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerateBackend for ScriptedBackend {
    async fn submit(
        &self,
        _prompt: &str,
        _params: &serde_json::Value,
    ) -> Result<SubmitResponse, GenerateApiError> {
        let call = self.submit_calls.fetch_add(1, Ordering::SeqCst);
        let next = {
            let mut submits = self.submits.lock().unwrap();
            if submits.is_empty() {
                panic!("ScriptedBackend: unexpected submit call #{}", call + 1);
            }
            submits.remove(0)
        };
        match next {
            ScriptedSubmit::Ok(id) => Ok(SubmitResponse { id: id.to_string() }),
            ScriptedSubmit::Err { status, message } => Err(GenerateApiError::Api {
                status,
                message: message.to_string(),
            }),
        }
    }

    async fn status(&self, _id: &str) -> Result<StatusResponse, GenerateApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if !self.status_delay.is_zero() {
            tokio::time::sleep(self.status_delay).await;
        }
        let next = {
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.is_empty() {
                ScriptedStatus::NotDone
            } else {
                statuses.remove(0)
            }
        };
        match next {
            ScriptedStatus::NotDone => Ok(StatusResponse {
                done: false,
                generations: vec![],
                message: None,
            }),
            ScriptedStatus::Done(urls) => Ok(StatusResponse {
                done: true,
                generations: urls
                    .into_iter()
                    .map(|img| GenerationRef {
                        img: img.to_string(),
                    })
                    .collect(),
                message: None,
            }),
            ScriptedStatus::Err { status, message } => Err(GenerateApiError::Api {
                status,
                message: message.to_string(),
            }),
        }
    }
}
