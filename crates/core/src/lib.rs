//! Domain types and pure logic shared across the GenCraft backend.
//!
//! No I/O lives here: the generation-job record and its status machine,
//! prompt validation, and the poll-outcome decision are all plain
//! functions so they can be unit-tested without a runtime.

pub mod error;
pub mod job;
pub mod types;
