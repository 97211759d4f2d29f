//! Business logic and the context it runs in.
//!
//! Business logic returns `Result<Reply, Halt>`. `Halt` is how an interrupt
//! or an authorization denial leaves the logic early: [`ProcessContext`]
//! hands it out and `?` carries it to the pipeline, which converts it into a
//! result. Nothing past the pipeline boundary ever sees a `Halt`.

use crate::policy::PolicyRegistry;
use crate::value::{ParamsMap, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// What business logic produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A successful value.
    Ok(Value),
    /// An error-tagged payload, reported as a process error.
    Error(Value),
}

impl Reply {
    /// A successful reply.
    #[must_use]
    pub fn ok(value: impl Into<Value>) -> Self {
        Self::Ok(value.into())
    }

    /// An error reply.
    #[must_use]
    pub fn error(payload: impl Into<Value>) -> Self {
        Self::Error(payload.into())
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Self::Ok(value)
    }
}

impl From<ParamsMap> for Reply {
    fn from(params: ParamsMap) -> Self {
        Self::Ok(Value::Map(params))
    }
}

/// Early exit from business logic.
#[derive(Debug, Clone, PartialEq)]
pub enum Halt {
    /// `interrupt(reason)` was called.
    Interrupt(Value),
    /// Authorization was denied with a reason.
    Denied(Value),
}

/// Authorization settings attached to a pipeline.
#[derive(Debug, Clone, Default)]
pub struct Authorization {
    pub(crate) policy: Option<String>,
    pub(crate) action: Option<String>,
    pub(crate) registry: Option<Arc<PolicyRegistry>>,
}

impl Authorization {
    /// Creates settings without policy, action or registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the policy name.
    #[must_use]
    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = Some(policy.into());
        self
    }

    /// Sets the action name.
    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Sets the registry policies are resolved from.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<PolicyRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Returns the attached policy name.
    #[must_use]
    pub fn policy(&self) -> Option<&str> {
        self.policy.as_deref()
    }

    /// Returns the attached action name.
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    fn check(&self, context: &Value) -> Result<(), Value> {
        let Some(policy) = self.policy.as_deref() else {
            return Err(Value::atom("undefined_policy"));
        };
        let Some(action) = self.action.as_deref() else {
            return Err(Value::atom("undefined_action"));
        };

        let verdict = self
            .registry
            .as_ref()
            .and_then(|registry| registry.evaluate(policy, action, context));

        match verdict {
            None => Err(Value::atom("unknown_policy")),
            Some(Value::Bool(true)) => Ok(()),
            Some(Value::Bool(false)) => Err(Value::atom(action)),
            Some(reason) => Err(reason),
        }
    }
}

/// Per-invocation context handed to business logic.
#[derive(Debug, Clone)]
pub struct ProcessContext {
    pipeline: Arc<str>,
    run_id: Uuid,
    auth: Arc<Authorization>,
}

impl ProcessContext {
    pub(crate) fn new(pipeline: Arc<str>, run_id: Uuid, auth: Arc<Authorization>) -> Self {
        Self {
            pipeline,
            run_id,
            auth,
        }
    }

    /// Creates a context outside a pipeline, for unit-testing business
    /// logic.
    #[must_use]
    pub fn detached(pipeline: &str, auth: Authorization) -> Self {
        Self::new(Arc::from(pipeline), Uuid::new_v4(), Arc::new(auth))
    }

    /// Returns the pipeline id.
    #[must_use]
    pub fn pipeline_id(&self) -> &str {
        &self.pipeline
    }

    /// Returns the id of this invocation.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Stops the business logic; the pipeline returns `Interrupt(reason)`.
    ///
    /// ```
    /// # use paramflow::pipeline::{Halt, ProcessContext, Reply, Authorization};
    /// # use paramflow::value::Value;
    /// fn logic(ctx: &ProcessContext, ready: bool) -> Result<Reply, Halt> {
    ///     if !ready {
    ///         return ctx.interrupt(Value::atom("not_now"));
    ///     }
    ///     Ok(Reply::ok(1))
    /// }
    /// let ctx = ProcessContext::detached("p", Authorization::default());
    /// assert_eq!(logic(&ctx, false), Err(Halt::Interrupt(Value::atom("not_now"))));
    /// ```
    ///
    /// # Errors
    ///
    /// Always returns `Err(Halt::Interrupt(reason))`.
    pub fn interrupt<T>(&self, reason: impl Into<Value>) -> Result<T, Halt> {
        let reason = reason.into();
        debug!(pipeline = %self.pipeline, %reason, "Interrupt requested");
        Err(Halt::Interrupt(reason))
    }

    /// Checks the pipeline's policy action against `context`.
    ///
    /// # Errors
    ///
    /// Returns `Halt::Denied` with `undefined_policy`, `undefined_action`,
    /// `unknown_policy`, the action name (when the action answered `false`)
    /// or the custom reason the action answered.
    pub fn authorize(&self, context: &Value) -> Result<(), Halt> {
        self.auth.check(context).map_err(|reason| {
            debug!(pipeline = %self.pipeline, %reason, "Authorization denied");
            Halt::Denied(reason)
        })
    }
}

/// Business logic run by a pipeline.
///
/// Receives only the declared fields of the contract.
#[cfg_attr(test, mockall::automock)]
pub trait Operation {
    /// Processes validated params.
    ///
    /// # Errors
    ///
    /// Returns a [`Halt`] to interrupt or to propagate an authorization
    /// denial.
    fn process(&self, ctx: &ProcessContext, params: ParamsMap) -> Result<Reply, Halt>;
}

/// An operation backed by a closure.
pub struct FnOperation<F>
where
    F: Fn(&ProcessContext, ParamsMap) -> Result<Reply, Halt> + Send + Sync,
{
    func: F,
}

impl<F> FnOperation<F>
where
    F: Fn(&ProcessContext, ParamsMap) -> Result<Reply, Halt> + Send + Sync,
{
    /// Wraps a closure.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> fmt::Debug for FnOperation<F>
where
    F: Fn(&ProcessContext, ParamsMap) -> Result<Reply, Halt> + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnOperation").finish_non_exhaustive()
    }
}

impl<F> Operation for FnOperation<F>
where
    F: Fn(&ProcessContext, ParamsMap) -> Result<Reply, Halt> + Send + Sync,
{
    fn process(&self, ctx: &ProcessContext, params: ParamsMap) -> Result<Reply, Halt> {
        (self.func)(ctx, params)
    }
}
