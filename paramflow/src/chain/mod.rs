//! Sequential execution of pipelines.
//!
//! The successful output of one step becomes the input of the next. A step
//! can reshape its input, merge extra params and be skipped by a condition;
//! a skipped step passes the merged params on without validating them. The
//! first step that does not succeed ends the chain.

mod step;

pub use step::{AdditionalParam, ChainStep};

use crate::events::{emit_stamped, get_event_sink, types, EventSink};
use crate::pipeline::PipelineResult;
use crate::value::{IntoParams, Value};
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, debug_span};

/// Chain-wide options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Pair a failure with the id of the pipeline that produced it.
    pub name_in_error: bool,
}

/// Final outcome of a chain.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainOutcome {
    /// Every step succeeded or was skipped; carries the last value.
    Ok(Value),
    /// A step did not succeed.
    Failed {
        /// The failing pipeline id, when `name_in_error` is set and the
        /// result is not an opaque fallback value.
        step: Option<String>,
        /// The step's result, unchanged.
        result: PipelineResult,
    },
}

impl ChainOutcome {
    /// Returns true for `Ok`.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Returns the success value.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Failed { .. } => None,
        }
    }

    /// Returns the failing step's result.
    #[must_use]
    pub fn failure(&self) -> Option<&PipelineResult> {
        match self {
            Self::Ok(_) => None,
            Self::Failed { result, .. } => Some(result),
        }
    }

    /// Returns the failing pipeline id, if it was recorded.
    #[must_use]
    pub fn failed_step(&self) -> Option<&str> {
        match self {
            Self::Failed { step, .. } => step.as_deref(),
            Self::Ok(_) => None,
        }
    }
}

/// An ordered, immutable list of steps.
#[derive(Clone)]
pub struct Chain {
    name: String,
    steps: Vec<ChainStep>,
    config: ChainConfig,
    event_sink: Option<Arc<dyn EventSink>>,
}

impl Chain {
    /// Starts building a chain.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ChainBuilder {
        ChainBuilder::new(name)
    }

    /// Returns the chain name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the steps in order.
    #[must_use]
    pub fn steps(&self) -> &[ChainStep] {
        &self.steps
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> ChainConfig {
        self.config
    }

    fn sink(&self) -> Arc<dyn EventSink> {
        self.event_sink.clone().unwrap_or_else(get_event_sink)
    }

    /// Runs the chain.
    pub fn run(&self, input: impl IntoParams) -> ChainOutcome {
        let span = debug_span!("chain", chain = %self.name, steps = self.steps.len());
        let _guard = span.enter();

        let mut carried = Value::Map(input.into_params());

        for (index, step) in self.steps.iter().enumerate() {
            let input = step.prepare(carried);

            if !step.should_run(&input) {
                debug!(step = index, pipeline = step.pipeline.id(), "Skipping step");
                emit_stamped(
                    self.sink().as_ref(),
                    types::CHAIN_STEP_SKIPPED,
                    json!({ "chain": self.name, "step": index, "pipeline": step.pipeline.id() }),
                );
                carried = input;
                continue;
            }

            match step.pipeline.run(input) {
                PipelineResult::Ok(value) => carried = value,
                result => return self.abort(index, step, result),
            }
        }

        debug!("Chain completed");
        ChainOutcome::Ok(carried)
    }

    fn abort(&self, index: usize, step: &ChainStep, result: PipelineResult) -> ChainOutcome {
        let pipeline = step.pipeline.id();
        debug!(step = index, pipeline, status = %result.status(), "Chain aborted");
        emit_stamped(
            self.sink().as_ref(),
            types::CHAIN_ABORTED,
            json!({
                "chain": self.name,
                "step": index,
                "pipeline": pipeline,
                "status": result.status(),
            }),
        );

        let step = (self.config.name_in_error && !result.is_opaque()).then(|| pipeline.to_string());
        ChainOutcome::Failed { step, result }
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("name", &self.name)
            .field("steps", &self.steps)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Chain`].
#[derive(Clone)]
pub struct ChainBuilder {
    name: String,
    steps: Vec<ChainStep>,
    config: ChainConfig,
    event_sink: Option<Arc<dyn EventSink>>,
}

impl ChainBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            config: ChainConfig::default(),
            event_sink: None,
        }
    }

    /// Appends a step.
    #[must_use]
    pub fn step(mut self, step: ChainStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Pairs failures with the failing pipeline id.
    #[must_use]
    pub fn name_in_error(mut self, enabled: bool) -> Self {
        self.config.name_in_error = enabled;
        self
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn config(mut self, config: ChainConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the event sink; the process-wide sink is used otherwise.
    #[must_use]
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    /// Builds the chain.
    #[must_use]
    pub fn build(self) -> Chain {
        Chain {
            name: self.name,
            steps: self.steps,
            config: self.config,
            event_sink: self.event_sink,
        }
    }
}

impl fmt::Debug for ChainBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainBuilder")
            .field("name", &self.name)
            .field("steps", &self.steps.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
