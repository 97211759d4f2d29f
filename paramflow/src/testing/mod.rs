//! Testing utilities for pipelines and chains.
//!
//! This module provides:
//! - Assertions over pipeline results
//! - Recording operations, fallbacks and callbacks

mod assertions;
mod mocks;

pub use assertions::{
    assert_field_error, assert_interrupted, assert_ok, assert_ok_value, assert_status,
    assert_validation_errors,
};
pub use mocks::{CountingOperation, HookCall, RecordingCallback, RecordingFallback};
