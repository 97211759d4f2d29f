//! Run identifiers and timestamps.

pub mod timestamps;

pub use timestamps::{format_timestamp, iso_timestamp, Timestamp};

use uuid::Uuid;

/// Generates a run identifier (UUID v4).
#[must_use]
pub fn generate_run_id() -> Uuid {
    Uuid::new_v4()
}
