//! Single-pipeline execution.
//!
//! One invocation runs, in order: normalize, alias, defaults, coercion,
//! validation, business logic, fallback (on anything but success) and
//! callback (on success). A pipeline is immutable once built and can be
//! shared across threads behind an `Arc`; every invocation owns its params.

mod builder;
mod hooks;
mod operation;
mod result;
mod stages;

#[cfg(test)]
mod integration_tests;

pub use builder::PipelineBuilder;
pub use hooks::{Callback, CallbackConfig, Fallback, FallbackConfig};
pub use operation::{Authorization, FnOperation, Halt, Operation, ProcessContext, Reply};
pub use result::{PipelineError, PipelineResult, ResultStatus};

#[cfg(test)]
pub(crate) use hooks::{MockCallback, MockFallback};
#[cfg(test)]
pub(crate) use operation::MockOperation;

use crate::contract::Contract;
use crate::errors::StrictError;
use crate::events::{emit_stamped, get_event_sink, types, EventSink};
use crate::observability::SpanTimer;
use crate::utils::generate_run_id;
use crate::validation::ValidationOutcome;
use crate::value::{IntoParams, ParamsMap};
use builder::{SharedCallback, SharedFallback, SharedOperation};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, debug_span};

/// A named, immutable execution unit around one contract and one piece of
/// business logic.
pub struct Pipeline {
    id: Arc<str>,
    contract: Arc<Contract>,
    operation: SharedOperation,
    auth: Arc<Authorization>,
    fallback: Option<(SharedFallback, FallbackConfig)>,
    callback: Option<(SharedCallback, CallbackConfig)>,
    event_sink: Option<Arc<dyn EventSink>>,
}

impl Pipeline {
    /// Starts building a pipeline.
    #[must_use]
    pub fn builder(id: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder::new(id)
    }

    /// Returns the pipeline id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the contract.
    #[must_use]
    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// Returns the authorization settings.
    #[must_use]
    pub fn authorization(&self) -> &Authorization {
        &self.auth
    }

    fn sink(&self) -> Arc<dyn EventSink> {
        self.event_sink.clone().unwrap_or_else(get_event_sink)
    }

    /// Runs one invocation and returns its result as data.
    pub fn run(&self, input: impl IntoParams) -> PipelineResult {
        let run_id = generate_run_id();
        let span = debug_span!("pipeline", pipeline = %self.id, %run_id);
        let _guard = span.enter();

        let sink = self.sink();
        let timer = SpanTimer::start(self.id());
        emit_stamped(
            sink.as_ref(),
            types::PIPELINE_STARTED,
            json!({ "pipeline": self.id(), "run_id": run_id.to_string() }),
        );

        let original = input.into_params();
        let received = stages::resolve_aliases(&self.contract, original.clone());
        let with_defaults = stages::apply_defaults(&self.contract, received.clone(), &received);

        let result = match stages::coerce(&self.contract, with_defaults, &received) {
            Ok(params) => {
                let ctx = ProcessContext::new(Arc::clone(&self.id), run_id, Arc::clone(&self.auth));
                self.execute(&ctx, &params, &original, sink.as_ref())
            }
            Err(payload) => {
                debug!(%payload, "Coercion failed");
                PipelineResult::process(payload)
            }
        };

        let event_type = match &result {
            PipelineResult::Ok(_) | PipelineResult::Opaque(_) => types::PIPELINE_COMPLETED,
            PipelineResult::Interrupt(_) => types::PIPELINE_INTERRUPTED,
            PipelineResult::Error(_) => types::PIPELINE_FAILED,
        };
        emit_stamped(
            sink.as_ref(),
            event_type,
            json!({
                "pipeline": self.id(),
                "run_id": run_id.to_string(),
                "status": result.status(),
                "duration_ms": timer.finish(),
            }),
        );
        debug!(status = %result.status(), "Pipeline finished");
        result
    }

    /// Runs one invocation, raising validation and process errors.
    ///
    /// # Errors
    ///
    /// Returns a [`StrictError`] for those two kinds. Auth errors,
    /// interrupts and opaque fallback values are returned as `Ok`.
    pub fn run_strict(&self, input: impl IntoParams) -> Result<PipelineResult, StrictError> {
        self.run(input).into_strict()
    }

    /// Validation, business logic, fallback and callback.
    ///
    /// `original` is the normalized input before alias resolution; the
    /// fallback receives it.
    fn execute(
        &self,
        ctx: &ProcessContext,
        params: &ParamsMap,
        original: &ParamsMap,
        sink: &dyn EventSink,
    ) -> PipelineResult {
        let result = match self.contract.validate(params) {
            ValidationOutcome::Error(errors) => {
                debug!(%errors, "Validation failed");
                PipelineResult::validation(errors)
            }
            ValidationOutcome::Ok => {
                let declared = stages::declared_only(&self.contract, params);
                match self.operation.process(ctx, declared) {
                    Ok(Reply::Ok(value)) => PipelineResult::Ok(value),
                    Ok(Reply::Error(payload)) => PipelineResult::process(payload),
                    Err(Halt::Interrupt(reason)) => PipelineResult::Interrupt(reason),
                    Err(Halt::Denied(reason)) => PipelineResult::auth(reason),
                }
            }
        };

        let result = match (&self.fallback, result) {
            (Some((fallback, config)), result) if !result.is_ok() => {
                let replacement = fallback.handle(self.id(), original, &result);
                emit_stamped(
                    sink,
                    types::PIPELINE_FALLBACK,
                    json!({
                        "pipeline": self.id(),
                        "run_id": ctx.run_id().to_string(),
                        "take_over": config.take_over,
                        "error": &result,
                    }),
                );
                if config.take_over {
                    replacement
                } else {
                    result
                }
            }
            (_, result) => result,
        };

        if let (true, Some((callback, config))) = (result.is_ok(), &self.callback) {
            callback.on_success(self.id(), params, &result, &config.options);
        }

        result
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("id", &self.id)
            .field("contract", &self.contract)
            .field("auth", &self.auth)
            .field("fallback", &self.fallback.as_ref().map(|(_, config)| config))
            .field("callback", &self.callback.as_ref().map(|(_, config)| config))
            .finish_non_exhaustive()
    }
}
