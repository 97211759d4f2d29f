//! Recording doubles for pipeline hooks and operations.
//!
//! Each double is `Clone` and shares its records between clones, so a test
//! can hand one clone to a builder and inspect the other.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::pipeline::{Callback, Fallback, Halt, Operation, PipelineResult, ProcessContext, Reply};
use crate::value::ParamsMap;

/// One recorded hook invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct HookCall {
    /// The pipeline id.
    pub pipeline: String,
    /// The params the hook received.
    pub params: ParamsMap,
    /// The result the hook received.
    pub result: PipelineResult,
}

/// A fallback that records every call and returns a fixed replacement.
#[derive(Debug, Clone)]
pub struct RecordingFallback {
    replacement: Option<PipelineResult>,
    calls: Arc<Mutex<Vec<HookCall>>>,
}

impl RecordingFallback {
    /// Creates a fallback that echoes the error it receives.
    #[must_use]
    pub fn new() -> Self {
        Self {
            replacement: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a fallback that returns `replacement`.
    #[must_use]
    pub fn returning(replacement: PipelineResult) -> Self {
        Self {
            replacement: Some(replacement),
            ..Self::new()
        }
    }

    /// Returns the number of calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the recorded calls.
    #[must_use]
    pub fn calls(&self) -> Vec<HookCall> {
        self.calls.lock().clone()
    }
}

impl Default for RecordingFallback {
    fn default() -> Self {
        Self::new()
    }
}

impl Fallback for RecordingFallback {
    fn handle(&self, pipeline: &str, params: &ParamsMap, error: &PipelineResult) -> PipelineResult {
        self.calls.lock().push(HookCall {
            pipeline: pipeline.to_string(),
            params: params.clone(),
            result: error.clone(),
        });
        self.replacement.clone().unwrap_or_else(|| error.clone())
    }
}

/// A callback that records every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingCallback {
    calls: Arc<Mutex<Vec<(HookCall, ParamsMap)>>>,
}

impl RecordingCallback {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the recorded calls with the options each received.
    #[must_use]
    pub fn calls(&self) -> Vec<(HookCall, ParamsMap)> {
        self.calls.lock().clone()
    }
}

impl Callback for RecordingCallback {
    fn on_success(
        &self,
        pipeline: &str,
        params: &ParamsMap,
        result: &PipelineResult,
        options: &ParamsMap,
    ) {
        let call = HookCall {
            pipeline: pipeline.to_string(),
            params: params.clone(),
            result: result.clone(),
        };
        self.calls.lock().push((call, options.clone()));
    }
}

/// An operation that records its inputs and replies with them or with a
/// fixed reply.
#[derive(Debug, Clone)]
pub struct CountingOperation {
    reply: Option<Reply>,
    inputs: Arc<Mutex<Vec<ParamsMap>>>,
}

impl CountingOperation {
    /// Creates an operation that echoes its params.
    #[must_use]
    pub fn echo() -> Self {
        Self {
            reply: None,
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates an operation that always returns `reply`.
    #[must_use]
    pub fn replying(reply: Reply) -> Self {
        Self {
            reply: Some(reply),
            ..Self::echo()
        }
    }

    /// Returns the number of calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inputs.lock().len()
    }

    /// Returns the params of each call.
    #[must_use]
    pub fn inputs(&self) -> Vec<ParamsMap> {
        self.inputs.lock().clone()
    }
}

impl Operation for CountingOperation {
    fn process(&self, _ctx: &ProcessContext, params: ParamsMap) -> Result<Reply, Halt> {
        self.inputs.lock().push(params.clone());
        Ok(self.reply.clone().unwrap_or_else(|| params.into()))
    }
}
