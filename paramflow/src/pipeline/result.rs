//! The uniform result of a pipeline invocation.

use crate::errors::StrictError;
use crate::validation::FieldErrors;
use crate::value::Value;
use serde::Serialize;
use std::fmt;

/// Coarse classification of a [`PipelineResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    /// Business logic succeeded.
    Ok,
    /// Parameters failed validation.
    ValidationError,
    /// Authorization was denied.
    AuthError,
    /// Business logic or a coercion reported an error.
    ProcessError,
    /// Business logic interrupted itself.
    Interrupt,
    /// A fallback replaced the result with an arbitrary value.
    Opaque,
}

impl ResultStatus {
    /// Returns the status name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::ValidationError => "validation_error",
            Self::AuthError => "auth_error",
            Self::ProcessError => "process_error",
            Self::Interrupt => "interrupt",
            Self::Opaque => "opaque",
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error kinds a pipeline reports as data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum PipelineError {
    /// Per-field validation messages.
    Validation(FieldErrors),
    /// The denial reason.
    Auth(Value),
    /// The user payload, passed through verbatim.
    Process(Value),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "validation error: {errors}"),
            Self::Auth(reason) => write!(f, "auth error: {reason}"),
            Self::Process(payload) => write!(f, "process error: {payload}"),
        }
    }
}

/// Outcome of one pipeline invocation.
///
/// Interrupts are never errors, and `Opaque` only appears when a fallback
/// takes over with a value that is not error-shaped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum PipelineResult {
    /// Success with the business-logic value.
    Ok(Value),
    /// One of the error kinds.
    Error(PipelineError),
    /// Business logic called `interrupt(reason)`.
    Interrupt(Value),
    /// A fallback's replacement value.
    Opaque(Value),
}

impl PipelineResult {
    /// Creates a success.
    #[must_use]
    pub fn ok(value: impl Into<Value>) -> Self {
        Self::Ok(value.into())
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(errors: FieldErrors) -> Self {
        Self::Error(PipelineError::Validation(errors))
    }

    /// Creates an authorization error.
    #[must_use]
    pub fn auth(reason: impl Into<Value>) -> Self {
        Self::Error(PipelineError::Auth(reason.into()))
    }

    /// Creates a process error.
    #[must_use]
    pub fn process(payload: impl Into<Value>) -> Self {
        Self::Error(PipelineError::Process(payload.into()))
    }

    /// Creates an interrupt.
    #[must_use]
    pub fn interrupt(reason: impl Into<Value>) -> Self {
        Self::Interrupt(reason.into())
    }

    /// Creates an opaque result.
    #[must_use]
    pub fn opaque(value: impl Into<Value>) -> Self {
        Self::Opaque(value.into())
    }

    /// Returns the status of this result.
    #[must_use]
    pub fn status(&self) -> ResultStatus {
        match self {
            Self::Ok(_) => ResultStatus::Ok,
            Self::Error(PipelineError::Validation(_)) => ResultStatus::ValidationError,
            Self::Error(PipelineError::Auth(_)) => ResultStatus::AuthError,
            Self::Error(PipelineError::Process(_)) => ResultStatus::ProcessError,
            Self::Interrupt(_) => ResultStatus::Interrupt,
            Self::Opaque(_) => ResultStatus::Opaque,
        }
    }

    /// Returns true for success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Returns true for any error kind.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns true for interrupts.
    #[must_use]
    pub fn is_interrupt(&self) -> bool {
        matches!(self, Self::Interrupt(_))
    }

    /// Returns true for opaque fallback values.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque(_))
    }

    /// Returns the success value.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Ok(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&PipelineError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Returns the validation errors, if this is a validation error.
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Error(PipelineError::Validation(errors)) => Some(errors),
            _ => None,
        }
    }

    /// Unwraps the payload regardless of kind.
    ///
    /// Validation errors become a map of `field => [messages]`.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Ok(value)
            | Self::Interrupt(value)
            | Self::Opaque(value)
            | Self::Error(PipelineError::Auth(value) | PipelineError::Process(value)) => value,
            Self::Error(PipelineError::Validation(errors)) => errors.to_value(),
        }
    }

    /// Lifts error kinds into a [`StrictError`].
    ///
    /// # Errors
    ///
    /// Returns `Err` for validation and process errors. Auth errors,
    /// interrupts and opaque values stay `Ok`.
    pub fn into_strict(self) -> Result<Self, StrictError> {
        match self {
            Self::Error(PipelineError::Validation(errors)) => Err(StrictError::Validation(errors)),
            Self::Error(PipelineError::Process(payload)) => Err(StrictError::Process(payload)),
            other => Ok(other),
        }
    }
}

impl fmt::Display for PipelineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok(value) => write!(f, "ok: {value}"),
            Self::Error(error) => write!(f, "{error}"),
            Self::Interrupt(reason) => write!(f, "interrupt: {reason}"),
            Self::Opaque(value) => write!(f, "opaque: {value}"),
        }
    }
}
