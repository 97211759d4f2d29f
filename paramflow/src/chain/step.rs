//! One step of a chain.

use crate::pipeline::Pipeline;
use crate::value::{normalize, FieldName, ParamsMap, Value};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

type LazyFn = dyn Fn() -> Value + Send + Sync;
type ConditionFn = dyn Fn(&ParamsMap) -> bool + Send + Sync;
type CoerceFn = dyn Fn(ParamsMap) -> ParamsMap + Send + Sync;

/// An extra parameter merged into a step's input.
#[derive(Clone)]
pub enum AdditionalParam {
    /// A literal value.
    Value(Value),
    /// Computed each time the step runs.
    Lazy(Arc<LazyFn>),
}

impl AdditionalParam {
    /// Resolves the parameter.
    #[must_use]
    pub fn resolve(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Lazy(f) => f(),
        }
    }
}

impl fmt::Debug for AdditionalParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "Value({value})"),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// A pipeline plus the per-step input shaping around it.
#[derive(Clone)]
pub struct ChainStep {
    pub(crate) pipeline: Arc<Pipeline>,
    pub(crate) additional: IndexMap<FieldName, AdditionalParam>,
    pub(crate) condition: Option<Arc<ConditionFn>>,
    pub(crate) coerce: Option<Arc<CoerceFn>>,
}

impl ChainStep {
    /// Creates a step running `pipeline`.
    #[must_use]
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self {
            pipeline,
            additional: IndexMap::new(),
            condition: None,
            coerce: None,
        }
    }

    /// Merges a literal parameter into the step input. It wins over carried
    /// keys.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<FieldName>, value: impl Into<Value>) -> Self {
        self.additional
            .insert(name.into(), AdditionalParam::Value(value.into()));
        self
    }

    /// Merges a parameter computed when the step runs.
    #[must_use]
    pub fn with_lazy_param<F>(mut self, name: impl Into<FieldName>, f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.additional
            .insert(name.into(), AdditionalParam::Lazy(Arc::new(f)));
        self
    }

    /// Runs the step only when `condition` holds for the merged params.
    #[must_use]
    pub fn when<F>(mut self, condition: F) -> Self
    where
        F: Fn(&ParamsMap) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(condition));
        self
    }

    /// Transforms the carried params before merging.
    #[must_use]
    pub fn coerce_with<F>(mut self, f: F) -> Self
    where
        F: Fn(ParamsMap) -> ParamsMap + Send + Sync + 'static,
    {
        self.coerce = Some(Arc::new(f));
        self
    }

    /// Returns the step's pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Coerces and merges the step input.
    ///
    /// The carried value is normalized into a map only when the coercion or
    /// additional params need one; otherwise it is passed on as is.
    pub(crate) fn prepare(&self, carried: Value) -> Value {
        let carried = match &self.coerce {
            Some(coerce) => Value::Map(coerce(normalize(carried))),
            None => carried,
        };
        if self.additional.is_empty() {
            return carried;
        }

        let mut params = match carried {
            Value::Map(params) => params,
            other => normalize(other),
        };
        for (name, param) in &self.additional {
            params.insert(name.clone(), param.resolve());
        }
        Value::Map(params)
    }

    /// Returns false when the condition rejects the prepared input.
    ///
    /// Conditions see map and record fields; other values appear empty.
    pub(crate) fn should_run(&self, input: &Value) -> bool {
        self.condition.as_ref().map_or(true, |condition| {
            let empty = ParamsMap::new();
            condition(input.as_fields().unwrap_or(&empty))
        })
    }
}

impl fmt::Debug for ChainStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainStep")
            .field("pipeline", &self.pipeline.id())
            .field("additional", &self.additional)
            .field("conditional", &self.condition.is_some())
            .field("coerced", &self.coerce.is_some())
            .finish()
    }
}
