//! Client and poller for the remote generation-job API.
//!
//! Provides the REST wrapper for the two-call contract (submit a job,
//! check its status), a cancellable polling task per job, the
//! one-active-job manager, and the event types the rest of the platform
//! subscribes to.

pub mod api;
pub mod events;
pub mod manager;
pub mod poller;
