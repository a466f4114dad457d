/// Remote job identifiers are opaque server-assigned tokens.
pub type JobId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
