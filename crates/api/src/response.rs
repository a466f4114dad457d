//! Shared response envelope types for API handlers.
//!
//! The generation surface wraps payloads in a `{ "data": ... }`
//! envelope. The relay endpoints (`/api/chat`, `/api/remove-bg`) keep
//! their original flat contracts and do not use this type.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
